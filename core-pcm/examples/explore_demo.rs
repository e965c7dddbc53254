//! Run the explorer over a raw dump and print what each candidate looks like.
//!
//! ```text
//! cargo run -p core-pcm --example explore_demo --features desktop-shims -- dump.raw [rate] [candidate]
//! ```
//!
//! When a candidate id is given, it is fully decoded and written next to the
//! input as a WAVE file.

use anyhow::{bail, Context};
use bytes::Bytes;
use core_pcm::Explorer;
use core_runtime::config::{CoreConfig, ExplorerSettings};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(LoggingConfig::default().with_format(LogFormat::Compact))?;

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: explore_demo <file> [assumed-sample-rate] [candidate-id]");
    };
    let rate = match args.next() {
        Some(rate) => rate.parse().context("sample rate must be a positive integer")?,
        None => 8000,
    };
    let export = args.next();

    let data = tokio::fs::read(&path)
        .await
        .with_context(|| format!("reading {}", path))?;

    let config = CoreConfig::builder()
        .settings(ExplorerSettings::default().with_assumed_sample_rate(rate))
        .build()?;
    let explorer = Explorer::new(config);

    explorer.load_file(&path, Bytes::from(data))?.wait().await;

    let snapshot = explorer.snapshot();
    println!("{:<18} {:<26} {:>10} {:>8}  status", "id", "format", "std-dev", "clip%");
    for verdict in &snapshot.verdicts {
        let (std_dev, clipped) = verdict
            .signals
            .map(|s| (s.stats.std_dev, s.stats.clipped_fraction * 100.0))
            .unwrap_or((0.0, 0.0));
        let status = verdict
            .hidden_reason
            .map(|reason| reason.to_string())
            .unwrap_or_else(|| "plausible".to_string());
        println!(
            "{:<18} {:<26} {:>10.5} {:>7.1}%  {}",
            verdict.candidate.id, verdict.candidate.label, std_dev, clipped, status
        );
    }

    if let Some(candidate) = export {
        let wav = explorer.export_wav(&candidate).await?;
        tokio::fs::write(&wav.file_name, &wav.data)
            .await
            .with_context(|| format!("writing {}", wav.file_name))?;
        println!("wrote {} ({} bytes)", wav.file_name, wav.data.len());
    }

    Ok(())
}
