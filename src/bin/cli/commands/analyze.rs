//! Extraction and clustering commands.

use std::path::Path;

use anyhow::Context;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

use jtbd_insight::{ClusterRequest, JtbdEngine};

use crate::cli::args::{ClusterArgs, ExtractArgs, RunArgs};
use crate::cli::config_builder::{k_range_override, load_configuration};
use crate::cli::output::{print_clustering, print_extraction, print_report};

/// Extract the interview matrix from notes
pub async fn extract_command(args: ExtractArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let engine = build_engine(config_path).await?;
    let text = read_input(args.input.as_deref()).await?;

    let output = engine.extract(&text);
    print_extraction(&output, args.format)?;
    Ok(())
}

/// Cluster a matrix or a full clustering request
pub async fn cluster_command(args: ClusterArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let engine = build_engine(config_path).await?;
    let payload = read_input(args.input.as_deref()).await?;
    let k_range = k_range_override(&args.clustering, &engine.config().clustering)?;

    let output = match ClusterRequest::from_json(&payload) {
        Ok(mut request) => {
            if let Some(range) = k_range {
                request.k_range = Some((range.min(), range.max()));
            }
            if !args.clustering.reference.is_empty() {
                request.reference = args.clustering.reference.clone();
            }
            engine.cluster_request(&request)
        }
        // Malformed payloads still produce a well-formed empty result
        Err(_) => engine.cluster_json(&payload),
    };

    print_clustering(&output, args.format, engine.config().describe.compact_top_dims)?;
    Ok(())
}

/// Extract then cluster
pub async fn run_command(args: RunArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let engine = build_engine(config_path).await?;
    let text = read_input(args.input.as_deref()).await?;
    let k_range = k_range_override(&args.clustering, &engine.config().clustering)?;

    let report = engine.run(&text, &args.clustering.reference, k_range);
    info!(
        "Run complete: {} interview(s), {} cluster(s)",
        report.extraction.matrix.len(),
        report.clustering.k_selected
    );
    print_report(&report, args.format, engine.config().describe.compact_top_dims)?;
    Ok(())
}

async fn build_engine(config_path: Option<&Path>) -> anyhow::Result<JtbdEngine> {
    let config = load_configuration(config_path).await?;
    Ok(JtbdEngine::new(config)?)
}

/// Read a file, or stdin when the path is `-` or absent.
async fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) if path != Path::new("-") => {
            debug!("Reading input from {}", path.display());
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read input file: {}", path.display()))
        }
        _ => {
            debug!("Reading input from stdin");
            let mut buffer = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buffer)
                .await
                .context("Failed to read stdin")?;
            Ok(buffer)
        }
    }
}
