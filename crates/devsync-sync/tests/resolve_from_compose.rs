//! End-to-end resolution: compose file on disk -> bind sources -> mounts

use std::fs;
use std::sync::Arc;

use devsync_core::config::AgentConfig;
use devsync_core::domain::{Mount, VolumePath};
use devsync_core::usecases::MountResolver;
use devsync_sync::{load_bind_sources, AgentFolders, FsPathClassifier};
use tempfile::TempDir;

fn vp(path: std::path::PathBuf) -> VolumePath {
    VolumePath::new(path).unwrap()
}

/// Lays out a small project:
///
/// ```text
/// app/
///   src/            (dir)
///   src/index.js
///   package.json
///   yarn.lock
/// config/
///   settings.toml
/// ```
fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("app/src")).unwrap();
    fs::write(root.join("app/src/index.js"), b"console.log(1)").unwrap();
    fs::write(root.join("app/package.json"), b"{}").unwrap();
    fs::write(root.join("app/yarn.lock"), b"").unwrap();
    fs::create_dir_all(root.join("config")).unwrap();
    fs::write(root.join("config/settings.toml"), b"").unwrap();
    dir
}

fn resolver() -> MountResolver {
    MountResolver::new(Arc::new(FsPathClassifier::new()))
}

#[test]
fn sibling_files_collapse_and_nested_dir_is_included() {
    let dir = project();
    let compose = dir.path().join("docker-compose.yml");
    fs::write(
        &compose,
        r#"
services:
  web:
    volumes:
      - ./app/package.json:/app/package.json
      - ./app/yarn.lock:/app/yarn.lock
      - ./app/src:/app/src
      - cache:/root/.cache
  worker:
    volumes:
      - type: bind
        source: ./config/settings.toml
        target: /etc/settings.toml
"#,
    )
    .unwrap();

    let volumes = load_bind_sources(&compose).unwrap();
    let resolution = resolver().resolve(&volumes.paths());

    assert!(resolution.is_complete());
    assert_eq!(
        resolution.mounts,
        vec![
            Mount::with_includes(
                vp(dir.path().join("app")),
                ["package.json", "yarn.lock", "src"]
            ),
            Mount::with_includes(vp(dir.path().join("config")), ["settings.toml"]),
        ]
    );
}

#[test]
fn whole_directory_request_dominates_and_missing_path_is_skipped() {
    let dir = project();
    let compose = dir.path().join("docker-compose.yml");
    fs::write(
        &compose,
        r#"
services:
  web:
    volumes:
      - ./app/package.json:/app/package.json
      - ./app/src/index.js:/app/src/index.js
      - ./app:/app
      - ./typo:/typo
"#,
    )
    .unwrap();

    let volumes = load_bind_sources(&compose).unwrap();
    let resolution = resolver().resolve(&volumes.paths());

    assert_eq!(resolution.mounts, vec![Mount::sync_all(vp(dir.path().join("app")))]);
    assert_eq!(resolution.skipped.len(), 1);
    assert_eq!(resolution.skipped[0].path, vp(dir.path().join("typo")));
}

#[test]
fn agent_folders_written_for_resolved_mounts() {
    let dir = project();
    let volumes = vec![
        vp(dir.path().join("app/package.json")),
        vp(dir.path().join("config")),
    ];
    let resolution = resolver().resolve(&volumes);

    let settings = AgentConfig {
        config_dir: dir.path().join("agent"),
        ..AgentConfig::default()
    };
    let folders = AgentFolders::from_mounts(&resolution.mounts, &settings);
    let written = folders.write_to(&settings.config_dir).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(written).unwrap()).unwrap();
    let entries = json["folders"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["ignore"], serde_json::json!(["!/package.json", "*"]));
    assert_eq!(entries[1]["ignore"], serde_json::json!([]));
}
