//! Configuration loading for CLI commands.

use std::path::Path;

use anyhow::Context;
use jtbd_insight::core::config::{ClusteringConfig, KRange};
use jtbd_insight::JtbdConfig;

use crate::cli::args::ClusteringArgs;

/// Load configuration from a YAML or JSON file, or defaults when no path is given.
pub async fn load_configuration(config_path: Option<&Path>) -> anyhow::Result<JtbdConfig> {
    let config = match config_path {
        Some(path) => JtbdConfig::from_file(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => JtbdConfig::default(),
    };

    config.validate()?;
    Ok(config)
}

/// Resolve the k range from CLI overrides, falling back to configuration.
///
/// Returns `None` when neither bound was overridden.
pub fn k_range_override(
    args: &ClusteringArgs,
    config: &ClusteringConfig,
) -> anyhow::Result<Option<KRange>> {
    if args.k_min.is_none() && args.k_max.is_none() {
        return Ok(None);
    }
    let range = KRange::new(
        args.k_min.unwrap_or(config.k_min),
        args.k_max.unwrap_or(config.k_max),
    )?;
    Ok(Some(range))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_override_keeps_config_range() {
        let args = ClusteringArgs::default();
        assert_eq!(k_range_override(&args, &ClusteringConfig::default()).unwrap(), None);
    }

    #[test]
    fn partial_override_fills_from_config() {
        let args = ClusteringArgs {
            k_max: Some(3),
            ..ClusteringArgs::default()
        };
        let range = k_range_override(&args, &ClusteringConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!((range.min(), range.max()), (2, 3));
    }

    #[test]
    fn inverted_override_is_rejected() {
        let args = ClusteringArgs {
            k_min: Some(4),
            k_max: Some(2),
            ..ClusteringArgs::default()
        };
        assert!(k_range_override(&args, &ClusteringConfig::default()).is_err());
    }

    #[tokio::test]
    async fn loads_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("config.yml");
        tokio::fs::write(&yaml, "clustering:\n  k_max: 3\n").await.unwrap();
        let config = load_configuration(Some(yaml.as_path())).await.unwrap();
        assert_eq!(config.clustering.k_max, 3);

        let json = dir.path().join("config.json");
        tokio::fs::write(&json, r#"{"extraction": {"max_interviews": 4}}"#)
            .await
            .unwrap();
        let config = load_configuration(Some(json.as_path())).await.unwrap();
        assert_eq!(config.extraction.max_interviews, 4);
    }

    #[tokio::test]
    async fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yml");
        tokio::fs::write(&path, "clustering:\n  k_min: 0\n").await.unwrap();
        assert!(load_configuration(Some(path.as_path())).await.is_err());
    }

    #[tokio::test]
    async fn missing_file_names_the_path() {
        let err = load_configuration(Some(Path::new("/definitely/not/here.yml")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.yml"));
    }
}
