use std::{env, fs, path::{Path, PathBuf}};

use anyhow::{bail, Context};
use indicatif::{ProgressBar, ProgressStyle};
use topicmap_core::config::{ClusterMethod, Config, TopicMapConfig};
use topicmap_core::types::NOISE;
use topicmap_pipeline::{Stage, TopicMapper};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: topicmap <input.txt> [--config FILE] [--method kmeans|dbscan] [--k N] [--eps F] [--min-pts N] [--top-n N] [--lexical] [--output FILE]";

#[derive(Debug, Default)]
struct Args {
    input: Option<PathBuf>,
    config: Option<PathBuf>,
    method: Option<ClusterMethod>,
    k: Option<usize>,
    eps: Option<f32>,
    min_pts: Option<usize>,
    top_n: Option<usize>,
    lexical: bool,
    output: Option<PathBuf>,
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> anyhow::Result<&'a str> {
    args.get(i + 1).map(String::as_str).with_context(|| format!("{flag} requires a value\n{USAGE}"))
}

fn parse_args(args: &[String]) -> anyhow::Result<Args> {
    let mut parsed = Args::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => { parsed.config = Some(PathBuf::from(value(args, i, "--config")?)); i += 1; }
            "--method" | "-m" => { parsed.method = Some(value(args, i, "--method")?.parse()?); i += 1; }
            "--k" => { parsed.k = Some(value(args, i, "--k")?.parse().context("--k requires a number")?); i += 1; }
            "--eps" => { parsed.eps = Some(value(args, i, "--eps")?.parse().context("--eps requires a number")?); i += 1; }
            "--min-pts" => { parsed.min_pts = Some(value(args, i, "--min-pts")?.parse().context("--min-pts requires a number")?); i += 1; }
            "--top-n" => { parsed.top_n = Some(value(args, i, "--top-n")?.parse().context("--top-n requires a number")?); i += 1; }
            "--output" | "-o" => { parsed.output = Some(PathBuf::from(value(args, i, "--output")?)); i += 1; }
            "--lexical" | "-l" => parsed.lexical = true,
            "--help" | "-h" => bail!("{USAGE}"),
            other if !other.starts_with('-') => parsed.input = Some(PathBuf::from(other)),
            other => bail!("unknown flag {other}\n{USAGE}"),
        }
        i += 1;
    }
    Ok(parsed)
}

/// Command-line flags take precedence over file and environment settings.
fn apply_overrides(settings: &mut TopicMapConfig, args: &Args) {
    if let Some(method) = args.method { settings.clustering.method = method; }
    if let Some(k) = args.k {
        settings.clustering.k = Some(k);
        if args.method.is_none() { settings.clustering.method = ClusterMethod::KMeans; }
    }
    if let Some(eps) = args.eps { settings.clustering.eps = Some(eps); }
    if let Some(min_pts) = args.min_pts { settings.clustering.min_pts = min_pts; }
    if let Some(top_n) = args.top_n { settings.topics.top_n = top_n; }
    if args.lexical { settings.embedding.semantic = false; }
}

/// One document per non-blank line, trimmed.
fn read_documents(path: &Path) -> anyhow::Result<Vec<String>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(text.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string).collect())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = parse_args(&env::args().skip(1).collect::<Vec<_>>())?;
    let config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .map_err(|e| { eprintln!("Error loading config: {e}"); e })?;
    let mut settings = config.settings()?;
    apply_overrides(&mut settings, &args);
    settings.validate()?;
    tracing::debug!(?settings, "effective settings");

    let Some(input) = args.input.as_ref() else { bail!("{USAGE}") };
    let documents = read_documents(input)?;
    println!("Topic map\n=========");
    println!("Input: {} ({} documents)", input.display(), documents.len());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% {msg}")?
            .progress_chars("#>-"),
    );
    let on_progress = |stage: Stage, fraction: f32| {
        pb.set_message(stage.to_string());
        pb.set_position((fraction.clamp(0.0, 1.0) * 100.0) as u64);
    };

    let mapper = TopicMapper::new(settings);
    let map = tokio::runtime::Runtime::new()?.block_on(async { mapper.run(&documents, &on_progress).await })?;
    pb.finish_with_message("done");

    println!("\nEmbeddings: {} tier, {} dimensions", map.embedding_tier, map.embeddings.first().map(Vec::len).unwrap_or(0));
    println!("Topics: {}", map.topic_count());
    for topic in &map.topics {
        let marker = if topic.id == NOISE { "  " } else { "- " };
        println!("{marker}[{:>3}] {:<50} {} docs", topic.id, topic.label, topic.size);
        for doc in &topic.representative_docs {
            println!("        {doc}");
        }
    }

    if let Some(output) = &args.output {
        fs::write(output, serde_json::to_string_pretty(&map)?).with_context(|| format!("writing {}", output.display()))?;
        println!("\n✅ Wrote topic map to {}", output.display());
    }
    Ok(())
}
