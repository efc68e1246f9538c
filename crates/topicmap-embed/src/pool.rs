use candle_core::{DType, Result, Tensor};

/// Mean of the token states selected by `attention_mask`, L2-normalized per row.
///
/// `hidden` is `[B, T, H]`, `attention_mask` is `[B, T]` with 1 for real tokens.
/// Returns `[B, H]`.
pub fn masked_mean_l2(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let (batch, _time, hidden_dim) = hidden.dims3()?;

    let mask = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?;
    let mask_3d = mask.unsqueeze(2)?;
    let mask_broadcast = match mask_3d.broadcast_as(hidden.shape()) {
        Ok(m) => m,
        Err(_) => mask_3d.repeat((1, 1, hidden_dim))?,
    };
    let masked = (hidden * &mask_broadcast)?;
    let sum = masked.sum(1)?;
    let lengths = mask.sum(1)?.unsqueeze(1)?.to_dtype(sum.dtype())?;
    let mut mean = sum.broadcast_div(&lengths)?;
    let eps_val = match hidden.dtype() { DType::F16 => 1e-6f32, _ => 1e-12f32 };
    let eps = Tensor::new(&[eps_val], hidden.device())?.to_dtype(hidden.dtype())?.unsqueeze(0)?;
    let norm = mean.sqr()?.sum_keepdim(1)?.sqrt()?;
    let norm = norm.broadcast_add(&eps)?;
    mean = mean.broadcast_div(&norm)?;
    debug_assert_eq!(mean.dims(), &[batch, hidden_dim]);
    Ok(mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    #[test]
    fn masked_mean_l2_ignores_padding() {
        let dev = Device::Cpu;
        // Two tokens with hidden dim 4; second token is masked out.
        let h = Tensor::from_slice(&[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], (1, 2, 4), &dev).unwrap();
        let mask = Tensor::from_slice(&[1u32, 0u32], (1, 2), &dev).unwrap();
        let out = masked_mean_l2(&h, &mask).unwrap();
        let v: Vec<Vec<f32>> = out.to_vec2().unwrap();
        let norm: f32 = (1.0f32 + 4.0 + 9.0 + 16.0).sqrt();
        let expected = [1.0 / norm, 2.0 / norm, 3.0 / norm, 4.0 / norm];
        for (a, b) in v[0].iter().cloned().zip(expected) {
            assert!((a - b).abs() < 1e-5, "a={} b={}", a, b);
        }
    }

    #[test]
    fn masked_mean_l2_pools_each_row_independently() {
        let dev = Device::Cpu;
        let h = Tensor::from_slice(&[3.0f32, 0.0, 1.0, 1.0, 0.0, 2.0, 0.0, 4.0], (2, 2, 2), &dev).unwrap();
        let mask = Tensor::from_slice(&[1u32, 1, 1, 1], (2, 2), &dev).unwrap();
        let v: Vec<Vec<f32>> = masked_mean_l2(&h, &mask).unwrap().to_vec2().unwrap();
        // row 0 mean = [2.0, 0.5]; row 1 mean = [0.0, 3.0]
        let n0 = (4.0f32 + 0.25).sqrt();
        assert!((v[0][0] - 2.0 / n0).abs() < 1e-5);
        assert!((v[0][1] - 0.5 / n0).abs() < 1e-5);
        assert!((v[1][0]).abs() < 1e-6);
        assert!((v[1][1] - 1.0).abs() < 1e-5);
    }
}
