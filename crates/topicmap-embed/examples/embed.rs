use topicmap_core::config::EmbeddingConfig;
use topicmap_embed::EmbeddingProvider;

fn main() -> anyhow::Result<()> {
    let provider = EmbeddingProvider::new(&EmbeddingConfig::default());
    let texts = vec!["hello world".to_string(), "rust embeddings".to_string()];
    let runtime = tokio::runtime::Runtime::new()?;
    let embs = runtime.block_on(provider.embed(&texts, &|p| println!("progress {:.0}%", p * 100.0)))?;
    println!("B={} dim={} tier={}", embs.vectors.len(), embs.dim, embs.tier);
    Ok(())
}
