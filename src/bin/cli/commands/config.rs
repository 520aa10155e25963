//! Configuration management commands.
//!
//! Initialization, validation, and printing defaults for jtbd configuration
//! files.

use owo_colors::OwoColorize;
use tabled::{settings::Style as TableStyle, Table, Tabled};

use jtbd_insight::JtbdConfig;

use crate::cli::args::{InitConfigArgs, ValidateConfigArgs};
use crate::cli::config_builder::load_configuration;

/// Row type for configuration tables.
#[derive(Tabled)]
struct SettingRow {
    setting: String,
    value: String,
}

fn row(setting: &str, value: impl ToString) -> SettingRow {
    SettingRow {
        setting: setting.to_string(),
        value: value.to_string(),
    }
}

/// Print default configuration in YAML format
pub async fn print_default_config() -> anyhow::Result<()> {
    println!("{}", "# Default jtbd configuration".dimmed());
    println!("{}", "# Save this to a file and customize as needed".dimmed());
    println!("{}", "# Usage: jtbd run --config your-config.yml notes.txt".dimmed());
    println!();

    let yaml_output = serde_yaml::to_string(&JtbdConfig::default())?;
    println!("{}", yaml_output);

    Ok(())
}

/// Initialize a configuration file with defaults
pub async fn init_config(args: InitConfigArgs) -> anyhow::Result<()> {
    if args.output.exists() && !args.force {
        return Err(anyhow::anyhow!(
            "Configuration file already exists: {}. Use --force to overwrite or choose a different name with --output",
            args.output.display()
        ));
    }

    JtbdConfig::default().to_yaml_file(&args.output)?;

    println!(
        "{} {}",
        "Configuration saved to:".bright_green().bold(),
        args.output.display().to_string().cyan()
    );
    println!();
    println!("{}", "Key settings you can customize:".bright_blue().bold());

    let rows = vec![
        row("extraction.max_interviews", "Interviews processed per run (default: 15)"),
        row("extraction.top_themes", "Themes kept per interview (default: 3)"),
        row("rules.gated_themes", "Themes that need explicit cues (default: risk, value, information, support)"),
        row("rules.suppression.cap", "Information cap under scheduling language (default: 1)"),
        row("clustering.k_min / k_max", "Candidate cluster counts (default: 2..5)"),
        row("clustering.min_extra_points", "Extra interviews required beyond k (default: 2)"),
    ];

    let mut table = Table::new(rows);
    table.with(TableStyle::rounded());
    println!("{}", table);

    Ok(())
}

/// Validate a jtbd configuration file
pub async fn validate_config(args: ValidateConfigArgs) -> anyhow::Result<()> {
    println!(
        "{} {}",
        "Validating configuration:".bright_blue().bold(),
        args.file.display().to_string().cyan()
    );
    println!();

    let config = match load_configuration(Some(args.file.as_path())).await {
        Ok(config) => {
            println!("{}", "Configuration file is valid!".bright_green().bold());
            println!();
            config
        }
        Err(e) => {
            eprintln!("{} {}", "Configuration validation failed:".red(), e);
            eprintln!(
                "{}",
                "Tip: use 'jtbd print-default-config' to see the valid format".dimmed()
            );
            return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
        }
    };

    let mut rows = vec![
        row("extraction.max_interviews", config.extraction.max_interviews),
        row("extraction.max_sentences", config.extraction.max_sentences),
        row("extraction.top_themes", config.extraction.top_themes),
        row(
            "clustering.k_range",
            format!("[{}, {}]", config.clustering.k_min, config.clustering.k_max),
        ),
        row("clustering.max_iterations", config.clustering.max_iterations),
    ];

    if args.details {
        let gated: Vec<&str> = config.rules.gated_themes.iter().map(|t| t.as_str()).collect();
        rows.push(row("rules.gated_themes", gated.join(", ")));
        rows.push(row(
            "rules.suppression",
            format!(
                "{} capped at {} (enabled: {})",
                config.rules.suppression.target,
                config.rules.suppression.cap,
                config.rules.suppression.enabled
            ),
        ));
        for rule in &config.rules.demotions {
            rows.push(row(
                "rules.demotions",
                format!("{} below {}", rule.demoted, rule.dominant),
            ));
        }
        rows.push(row("describe.top_dims", config.describe.top_dims));
        rows.push(row("describe.max_facets", config.describe.max_facets));
    }

    let mut table = Table::new(rows);
    table.with(TableStyle::rounded());
    println!("{}", table);

    Ok(())
}
