//! CLI subcommands
//!
//! Every command receives a [`CliContext`] carrying the output format, the
//! loaded configuration, and the path it was loaded from.

pub mod agent_config;
pub mod completions;
pub mod config;
pub mod mounts;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use devsync_core::config::Config;
use devsync_core::domain::VolumePath;
use devsync_core::usecases::{parse_volume_paths, MountResolver, Resolution};
use devsync_sync::{load_bind_sources, FsPathClassifier};
use tracing::info;

use crate::output::{get_formatter, OutputFormat, OutputFormatter};

/// State shared by all commands
pub struct CliContext {
    pub format: OutputFormat,
    pub quiet: bool,
    pub config: Config,
    pub config_path: PathBuf,
}

impl CliContext {
    pub fn formatter(&self) -> Box<dyn OutputFormatter> {
        get_formatter(self.format, self.quiet)
    }
}

/// Where the volumes to resolve come from
///
/// Positional paths win; without them the compose file is read. Passing
/// `--compose` together with paths resolves both sets together.
#[derive(Debug, Args)]
pub struct VolumeArgs {
    /// Volume source paths; relative paths are taken from the current directory
    pub paths: Vec<String>,

    /// Read bind-mount sources from this compose file
    #[arg(long, value_name = "FILE")]
    pub compose: Option<PathBuf>,
}

impl VolumeArgs {
    /// Collects the requested volumes, reporting rejected entries as warnings
    pub fn collect(
        &self,
        config: &Config,
        formatter: &dyn OutputFormatter,
    ) -> Result<Vec<VolumePath>> {
        let mut volumes = Vec::new();

        if self.paths.is_empty() || self.compose.is_some() {
            let compose_file = self
                .compose
                .clone()
                .unwrap_or_else(|| config.sync.compose_file.clone());
            let compose = load_bind_sources(&compose_file)
                .with_context(|| format!("Failed to read volumes from {}", compose_file.display()))?;

            for rejected in &compose.rejected {
                formatter.warn(&rejected.to_string());
            }
            info!(
                compose_file = %compose_file.display(),
                sources = compose.sources.len(),
                "Loaded bind-mount sources"
            );
            volumes.extend(compose.paths());
        }

        if !self.paths.is_empty() {
            let cwd = std::env::current_dir().context("Failed to get current directory")?;
            let absolute = self.paths.iter().map(|raw| absolutize(&cwd, raw));
            let (parsed, rejected) = parse_volume_paths(absolute);
            for (raw, error) in &rejected {
                formatter.warn(&format!("ignoring {raw}: {error}"));
            }
            volumes.extend(parsed);
        }

        Ok(volumes)
    }
}

/// Resolves `volumes` against the real filesystem
///
/// Skipped volumes are reported as warnings, or fail the command when
/// `strict` is set.
pub fn resolve_volumes(
    volumes: &[VolumePath],
    strict: bool,
    formatter: &dyn OutputFormatter,
) -> Result<Resolution> {
    let resolver = MountResolver::new(Arc::new(FsPathClassifier::new()));
    let resolution = resolver.resolve(volumes);

    for skipped in &resolution.skipped {
        formatter.warn(&format!("skipped {}: {}", skipped.path, skipped.error));
    }
    if strict && !resolution.is_complete() {
        anyhow::bail!(
            "{} volume{} could not be classified (sync.strict is enabled)",
            resolution.skipped.len(),
            if resolution.skipped.len() == 1 { "" } else { "s" }
        );
    }

    Ok(resolution)
}

/// JSON view of a resolution, shared by the commands that print one
pub fn resolution_json(resolution: &Resolution) -> Result<serde_json::Value> {
    let skipped: Vec<serde_json::Value> = resolution
        .skipped
        .iter()
        .map(|skipped| {
            serde_json::json!({
                "path": skipped.path.to_string(),
                "error": skipped.error.to_string(),
            })
        })
        .collect();

    Ok(serde_json::json!({
        "mounts": serde_json::to_value(&resolution.mounts)
            .context("Failed to serialize mounts")?,
        "skipped": skipped,
    }))
}

fn absolutize(cwd: &Path, raw: &str) -> String {
    let path = Path::new(raw);
    if path.is_absolute() {
        raw.to_string()
    } else {
        cwd.join(path).to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::output::JsonFormatter;

    fn compose_with_data_volume(dir: &TempDir) -> PathBuf {
        std::fs::create_dir(dir.path().join("data")).unwrap();
        let compose = dir.path().join("docker-compose.yml");
        std::fs::write(
            &compose,
            "services:\n  web:\n    volumes:\n      - ./data:/data\n",
        )
        .unwrap();
        compose
    }

    #[test]
    fn test_collect_combines_compose_and_paths() {
        let dir = TempDir::new().unwrap();
        let args = VolumeArgs {
            paths: vec!["/srv/extra".to_string()],
            compose: Some(compose_with_data_volume(&dir)),
        };

        let volumes = args.collect(&Config::default(), &JsonFormatter).unwrap();

        assert_eq!(
            volumes,
            vec![
                VolumePath::new(dir.path().join("data")).unwrap(),
                "/srv/extra".parse().unwrap(),
            ]
        );
    }

    #[test]
    fn test_collect_paths_only_skips_compose() {
        let args = VolumeArgs {
            paths: vec!["/srv/app".to_string(), "/srv/app/".to_string()],
            compose: None,
        };
        let config = Config {
            sync: devsync_core::config::SyncConfig {
                compose_file: PathBuf::from("/nonexistent/docker-compose.yml"),
                strict: false,
            },
            ..Config::default()
        };

        let volumes = args.collect(&config, &JsonFormatter).unwrap();

        let expected: VolumePath = "/srv/app".parse().unwrap();
        assert_eq!(volumes, vec![expected.clone(), expected]);
    }

    #[test]
    fn test_collect_missing_compose_file_fails() {
        let args = VolumeArgs {
            paths: Vec::new(),
            compose: Some(PathBuf::from("/nonexistent/docker-compose.yml")),
        };
        assert!(args.collect(&Config::default(), &JsonFormatter).is_err());
    }

    #[test]
    fn test_resolve_volumes_strict_rejects_skipped() {
        let dir = TempDir::new().unwrap();
        let volumes = vec![
            VolumePath::new(dir.path().to_path_buf()).unwrap(),
            VolumePath::new(dir.path().join("missing")).unwrap(),
        ];

        let lenient = resolve_volumes(&volumes, false, &JsonFormatter).unwrap();
        assert_eq!(lenient.mounts.len(), 1);
        assert_eq!(lenient.skipped.len(), 1);

        assert!(resolve_volumes(&volumes, true, &JsonFormatter).is_err());
    }

    #[test]
    fn test_resolution_json_shape() {
        let dir = TempDir::new().unwrap();
        let volumes = vec![
            VolumePath::new(dir.path().to_path_buf()).unwrap(),
            VolumePath::new(dir.path().join("missing")).unwrap(),
        ];
        let resolution = resolve_volumes(&volumes, false, &JsonFormatter).unwrap();

        let json = resolution_json(&resolution).unwrap();

        assert_eq!(json["mounts"][0]["sync_all"], true);
        assert_eq!(
            json["skipped"][0]["path"],
            dir.path().join("missing").display().to_string()
        );
    }

    #[test]
    fn test_absolutize_keeps_absolute_paths() {
        assert_eq!(absolutize(Path::new("/work"), "/srv/app"), "/srv/app");
    }

    #[test]
    fn test_absolutize_joins_relative_paths() {
        assert_eq!(absolutize(Path::new("/work"), "app/src"), "/work/app/src");
    }
}
