//! Bind-mount sources from a compose file
//!
//! Walks `services.<name>.volumes` of a compose YAML document and collects
//! the host side of every bind mount, in document order. These are the
//! volume paths fed to the [`MountResolver`](devsync_core::usecases::MountResolver).
//!
//! Both volume syntaxes are understood:
//!
//! ```yaml
//! services:
//!   web:
//!     volumes:
//!       - ./src:/app/src            # short syntax, bind
//!       - node_modules:/app/node_modules   # named volume, ignored
//!       - type: bind                # long syntax
//!         source: ./package.json
//!         target: /app/package.json
//! ```
//!
//! `$VAR`, `${VAR}`, `${VAR:-default}` and `${VAR-default}` are substituted
//! from the process environment before an entry is looked at, as compose
//! itself does; `$$` is a literal `$`. An entry referencing an unset
//! variable without a default is rejected.
//!
//! Relative sources resolve against the compose file's directory and `~`
//! expands to the home directory. A source that is a symlink is replaced by
//! its target, since that is what the container runtime mounts; this keeps
//! aliases from reaching the resolver.

use std::io;
use std::path::{Path, PathBuf};

use devsync_core::domain::{DomainError, VolumePath};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Errors raised while reading bind sources from a compose file
#[derive(Debug, Error)]
pub enum ComposeError {
    /// The compose file could not be read
    #[error("Failed to read compose file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The compose file is not valid YAML or has an unexpected shape
    #[error("Failed to parse compose file: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A volume entry whose bind source cannot be turned into an absolute
    /// volume path
    #[error("Invalid bind source '{volume}' in service '{service}': {reason}")]
    InvalidSource {
        service: String,
        volume: String,
        reason: DomainError,
    },
}

/// The host side of one bind mount
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindSource {
    /// Service declaring the mount
    pub service: String,
    /// Absolute, symlink-resolved host path
    pub path: VolumePath,
}

/// Bind sources found in a compose file plus the entries that were rejected
#[derive(Debug, Default)]
pub struct ComposeVolumes {
    /// Valid bind sources in document order
    pub sources: Vec<BindSource>,
    /// Entries skipped because their source was invalid
    pub rejected: Vec<ComposeError>,
}

impl ComposeVolumes {
    /// The bind source paths, in document order
    #[must_use]
    pub fn paths(&self) -> Vec<VolumePath> {
        self.sources.iter().map(|s| s.path.clone()).collect()
    }
}

#[derive(Debug, Default, Deserialize)]
struct ComposeDocument {
    #[serde(default)]
    services: serde_yaml::Mapping,
}

#[derive(Debug, Default, Deserialize)]
struct Service {
    #[serde(default)]
    volumes: Vec<VolumeEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VolumeEntry {
    Short(String),
    Long(LongVolume),
}

#[derive(Debug, Deserialize)]
struct LongVolume {
    #[serde(rename = "type")]
    kind: Option<String>,
    source: Option<String>,
}

/// Environment lookup used for variable substitution
type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

impl VolumeEntry {
    /// The entry as written, for error reports
    fn raw(&self) -> &str {
        match self {
            VolumeEntry::Short(short) => short.as_str(),
            VolumeEntry::Long(long) => long.source.as_deref().unwrap_or_default(),
        }
    }

    /// The interpolated host-side source if this entry is a bind mount
    fn bind_source(&self, env: EnvLookup<'_>) -> Result<Option<String>, DomainError> {
        match self {
            VolumeEntry::Short(short) => {
                // "SRC:DST[:MODE]"; a lone path is an anonymous volume.
                let short = interpolate(short, env)?;
                Ok(short
                    .split_once(':')
                    .map(|(source, _)| source)
                    .filter(|source| is_host_path(source))
                    .map(str::to_owned))
            }
            VolumeEntry::Long(long) => match (long.kind.as_deref(), &long.source) {
                (Some("bind"), Some(source)) => interpolate(source, env).map(Some),
                _ => Ok(None),
            },
        }
    }
}

/// Named volumes are bare identifiers; host paths start with `/`, `.` or `~`
fn is_host_path(source: &str) -> bool {
    source.starts_with('/') || source.starts_with('.') || source.starts_with('~')
}

/// Substitutes environment variables in one volume entry
fn interpolate(raw: &str, env: EnvLookup<'_>) -> Result<String, DomainError> {
    let invalid = |what: &str| DomainError::ValidationFailed(format!("{what} in '{raw}'"));
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 1..];

        if let Some(after) = rest.strip_prefix('$') {
            out.push('$');
            rest = after;
            continue;
        }

        let (expr, after) = match rest.strip_prefix('{') {
            Some(braced) => {
                let end = braced
                    .find('}')
                    .ok_or_else(|| invalid("unterminated variable reference"))?;
                (&braced[..end], &braced[end + 1..])
            }
            None => {
                let end = rest
                    .find(|c: char| !is_name_char(c))
                    .unwrap_or(rest.len());
                rest.split_at(end)
            }
        };
        rest = after;

        let name_len = expr.find(|c: char| !is_name_char(c)).unwrap_or(expr.len());
        let (name, modifier) = expr.split_at(name_len);
        if name.is_empty() {
            return Err(invalid("invalid variable reference"));
        }

        let value = env(name);
        let value = if let Some(default) = modifier.strip_prefix(":-") {
            value
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        } else if let Some(default) = modifier.strip_prefix('-') {
            value.unwrap_or_else(|| default.to_string())
        } else if modifier.is_empty() {
            value.ok_or_else(|| invalid(&format!("variable {name} is not set")))?
        } else {
            return Err(invalid(&format!("unsupported substitution '${{{expr}}}'")));
        };
        out.push_str(&value);
    }

    out.push_str(rest);
    Ok(out)
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Reads a compose file and returns its bind-mount sources
///
/// # Errors
/// Returns `ComposeError::Read` if the file cannot be read and
/// `ComposeError::Parse` if it is not a valid compose document. Individual
/// invalid sources do not fail the call; they are listed in
/// [`ComposeVolumes::rejected`].
#[instrument(fields(compose_file = %compose_file.display()))]
pub fn load_bind_sources(compose_file: &Path) -> Result<ComposeVolumes, ComposeError> {
    let read_error = |source| ComposeError::Read {
        path: compose_file.to_path_buf(),
        source,
    };

    let compose_file = if compose_file.is_absolute() {
        compose_file.to_path_buf()
    } else {
        std::env::current_dir().map_err(read_error)?.join(compose_file)
    };
    let content = std::fs::read_to_string(&compose_file).map_err(read_error)?;

    let base_dir = compose_file.parent().unwrap_or(Path::new("/"));
    parse_bind_sources(&content, base_dir)
}

/// Extracts bind-mount sources from compose YAML text
///
/// `base_dir` must be absolute; relative sources are joined to it.
///
/// # Errors
/// Returns `ComposeError::Parse` if the text is not a valid compose document
pub fn parse_bind_sources(content: &str, base_dir: &Path) -> Result<ComposeVolumes, ComposeError> {
    collect_bind_sources(content, base_dir, &|name: &str| std::env::var(name).ok())
}

fn collect_bind_sources(
    content: &str,
    base_dir: &Path,
    env: EnvLookup<'_>,
) -> Result<ComposeVolumes, ComposeError> {
    let document: ComposeDocument = serde_yaml::from_str(content)?;
    let mut volumes = ComposeVolumes::default();

    for (name, value) in document.services {
        let service_name = name.as_str().unwrap_or_default().to_string();
        if value.is_null() {
            continue;
        }
        let service: Service = serde_yaml::from_value(value)?;

        for entry in &service.volumes {
            let path = match entry.bind_source(env) {
                Ok(None) => {
                    debug!(service = %service_name, ?entry, "Ignoring non-bind volume");
                    continue;
                }
                Ok(Some(source)) => host_path(&source, base_dir),
                Err(reason) => Err(reason),
            };

            match path {
                Ok(path) => volumes.sources.push(BindSource {
                    service: service_name.clone(),
                    path: resolve_symlink(path),
                }),
                Err(reason) => {
                    let error = ComposeError::InvalidSource {
                        service: service_name.clone(),
                        volume: entry.raw().to_string(),
                        reason,
                    };
                    warn!(%error, "Skipping bind volume");
                    volumes.rejected.push(error);
                }
            }
        }
    }

    debug!(
        sources = volumes.sources.len(),
        rejected = volumes.rejected.len(),
        "Collected bind sources"
    );
    Ok(volumes)
}

/// Turns a raw bind source into an absolute volume path
fn host_path(raw: &str, base_dir: &Path) -> Result<VolumePath, DomainError> {
    let path = if raw == "~" || raw.starts_with("~/") {
        let home = dirs::home_dir().ok_or_else(|| {
            DomainError::InvalidPath("cannot expand '~': no home directory".to_string())
        })?;
        home.join(raw.trim_start_matches('~').trim_start_matches('/'))
    } else if raw.starts_with('~') {
        return Err(DomainError::ValidationFailed(format!(
            "'{raw}': only '~' and '~/' are expanded"
        )));
    } else {
        base_dir.join(raw)
    };
    VolumePath::new(path)
}

/// Replaces a symlinked source with its target
///
/// Failures leave the path unchanged: the classifier will report the
/// problem later if the path is unusable.
fn resolve_symlink(path: VolumePath) -> VolumePath {
    let metadata = match std::fs::symlink_metadata(path.as_path()) {
        Ok(metadata) => metadata,
        Err(error) => {
            warn!(path = %path, %error, "Failed to stat volume");
            return path;
        }
    };
    if !metadata.file_type().is_symlink() {
        return path;
    }

    let link = match std::fs::read_link(path.as_path()) {
        Ok(link) => link,
        Err(error) => {
            warn!(path = %path, %error, "Failed to get symlink target for volume");
            return path;
        }
    };

    let target = match path.parent() {
        Some(parent) if link.is_relative() => parent.as_path().join(link),
        _ => link,
    };
    match VolumePath::new(target) {
        Ok(resolved) => {
            debug!(from = %path, to = %resolved, "Resolved symlinked volume");
            resolved
        }
        Err(error) => {
            warn!(path = %path, %error, "Ignoring unusable symlink target");
            path
        }
    }
}
