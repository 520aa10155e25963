//! Output formatting and display functions.
//!
//! JSON goes to stdout unchanged so it can be piped; table output is meant for
//! people reading the terminal.

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{settings::Style as TableStyle, Table, Tabled};

use jtbd_insight::{ClusteringOutput, ExtractionOutput, InsightReport};

use crate::cli::args::OutputFormat;

#[derive(Tabled)]
struct InterviewRow {
    #[tabled(rename = "Interview")]
    id: String,
    #[tabled(rename = "Sentences")]
    sentences: usize,
    #[tabled(rename = "Themes")]
    themes: String,
    #[tabled(rename = "Facets")]
    facets: String,
}

#[derive(Tabled)]
struct ClusterRow {
    #[tabled(rename = "Cluster")]
    id: usize,
    #[tabled(rename = "Size")]
    size: usize,
    #[tabled(rename = "Top themes")]
    top_dims: String,
    #[tabled(rename = "Facets")]
    facets: String,
    #[tabled(rename = "Representatives")]
    representatives: String,
    #[tabled(rename = "PS match")]
    ps_match: String,
}

#[derive(Tabled)]
struct CandidateRow {
    #[tabled(rename = "k")]
    k: usize,
    #[tabled(rename = "Silhouette")]
    silhouette: String,
}

/// Print extraction output
pub fn print_extraction(output: &ExtractionOutput, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(output),
        OutputFormat::Table => {
            display_extraction(output);
            Ok(())
        }
    }
}

/// Print clustering output. Tables show `compact_dims` themes per cluster.
pub fn print_clustering(
    output: &ClusteringOutput,
    format: OutputFormat,
    compact_dims: usize,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(output),
        OutputFormat::Table => {
            display_clustering(output, compact_dims);
            Ok(())
        }
    }
}

/// Print a combined extraction and clustering report
pub fn print_report(
    report: &InsightReport,
    format: OutputFormat,
    compact_dims: usize,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table => {
            display_extraction(&report.extraction);
            println!();
            display_clustering(&report.clustering, compact_dims);
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn display_extraction(output: &ExtractionOutput) {
    println!(
        "{} {} interview(s), segmentation confidence: {}",
        "Extraction:".bright_blue().bold(),
        output.display.len(),
        format!("{:?}", output.confidence).to_lowercase()
    );

    if !output.display.is_empty() {
        let rows: Vec<InterviewRow> = output
            .display
            .iter()
            .map(|interview| InterviewRow {
                id: interview.id.clone(),
                sentences: interview.sentence_count,
                themes: if interview.no_clear_theme {
                    "no clear theme".to_string()
                } else {
                    interview
                        .themes
                        .iter()
                        .map(|badge| format!("{} ({})", badge.theme, badge.level))
                        .collect::<Vec<_>>()
                        .join(", ")
                },
                facets: interview
                    .facets
                    .iter()
                    .map(|(label, hits)| format!("{label} x{hits}"))
                    .collect::<Vec<_>>()
                    .join(", "),
            })
            .collect();

        let mut table = Table::new(rows);
        table.with(TableStyle::rounded());
        println!("{}", table);
    }

    print_warnings(&output.warnings);
}

fn display_clustering(output: &ClusteringOutput, compact_dims: usize) {
    println!(
        "{} k = {}, silhouette = {:.3}{}",
        "Clustering:".bright_blue().bold(),
        output.k_selected,
        output.validity.silhouette,
        if output.fallback { " (fallback)" } else { "" }
    );

    if !output.clusters.is_empty() {
        let mut table = Table::new(cluster_rows(output, compact_dims));
        table.with(TableStyle::rounded());
        println!("{}", table);
    }

    if !output.validity.alt.is_empty() {
        let rows: Vec<CandidateRow> = output
            .validity
            .alt
            .iter()
            .map(|candidate| CandidateRow {
                k: candidate.k,
                silhouette: candidate
                    .silhouette
                    .map_or_else(|| "skipped".to_string(), |s| format!("{s:.3}")),
            })
            .collect();

        let mut table = Table::new(rows);
        table.with(TableStyle::rounded());
        println!("{}", table);
    }

    if !output.excluded.is_empty() {
        println!(
            "{} {}",
            "Excluded:".yellow(),
            output.excluded.join(", ")
        );
    }

    if !output.note.is_empty() {
        println!("{} {}", "Note:".yellow().bold(), output.note);
    }
}

fn cluster_rows(output: &ClusteringOutput, compact_dims: usize) -> Vec<ClusterRow> {
    output
        .clusters
        .iter()
        .map(|cluster| ClusterRow {
            id: cluster.id,
            size: cluster.size,
            top_dims: join_display(&cluster.top_dims_n(compact_dims)),
            facets: cluster.top_facets.join(", "),
            representatives: cluster.representatives.join(", "),
            ps_match: format!("{:.2}", cluster.ps_match),
        })
        .collect()
}

fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        println!("{} {}", "warning:".yellow().bold(), warning);
    }
}

fn join_display<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
