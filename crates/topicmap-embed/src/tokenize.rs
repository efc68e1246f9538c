use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

use crate::error::TierError;

/// Encode `texts` into `[B, T]` id and mask tensors, truncated to `max_len`
/// and right-padded to the longest sequence of the batch.
pub fn tokenize_batch(tokenizer: &Tokenizer, texts: &[&str], max_len: usize, device: &Device) -> Result<(Tensor, Tensor), TierError> {
    let encodings = tokenizer
        .encode_batch(texts.to_vec(), true)
        .map_err(|e| TierError::Tokenize(e.to_string()))?;
    let pad_id = tokenizer.token_to_id("[PAD]").unwrap_or(0);

    let width = encodings.iter().map(|e| e.get_ids().len().min(max_len)).max().unwrap_or(0).max(1);
    let mut ids = Vec::with_capacity(texts.len() * width);
    let mut mask = Vec::with_capacity(texts.len() * width);
    for enc in &encodings {
        let mut row_ids = enc.get_ids().to_vec();
        let mut row_mask = enc.get_attention_mask().to_vec();
        if row_ids.len() > width { row_ids.truncate(width); row_mask.truncate(width); }
        if row_ids.len() < width {
            let pad = width - row_ids.len();
            row_ids.extend(std::iter::repeat(pad_id).take(pad));
            row_mask.extend(std::iter::repeat(0).take(pad));
        }
        ids.extend(row_ids);
        mask.extend(row_mask);
    }
    let input_ids = Tensor::from_vec(ids, (texts.len(), width), device)?;
    let attention_mask = Tensor::from_vec(mask, (texts.len(), width), device)?;
    Ok((input_ids, attention_mask))
}
