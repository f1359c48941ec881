//! Unit tests for CLI commands.

use super::*;

use std::collections::HashMap;
use std::fs;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lockview_core::types::{OutdatedLevel, PackageMetadata, TreeNode};
use lockview_registry::LatestVersions;

use crate::output::colors::ColorSupport;
use crate::CacheAction;

/// Create a test command context in a temporary project
fn create_test_context(temp_dir: &TempDir, registry_url: &str) -> CommandContext {
    let cwd = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    let settings = Settings {
        registry_url: registry_url.to_string(),
        cache_file: cwd.join(".cache").join("registry-cache.json"),
        ..Settings::default()
    };

    CommandContext {
        cwd,
        settings,
        json: false,
        output: OutputHandler::plain(),
    }
}

async fn mock_latest(server: &MockServer, name: &str, version: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/{}/latest", name)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": name, "version": version })))
        .mount(server)
        .await;
}

fn write_project(dir: &TempDir) {
    fs::write(
        dir.path().join("package.json"),
        json!({
            "name": "app",
            "version": "1.0.0",
            "dependencies": { "debug": "^4.3.0", "express": "^4.19.0" },
            "devDependencies": { "typescript": "^5.4.0" }
        })
        .to_string(),
    )
    .unwrap();

    fs::create_dir(dir.path().join("node_modules")).unwrap();
    fs::write(
        dir.path().join("package-lock.json"),
        json!({
            "name": "app",
            "lockfileVersion": 3,
            "packages": {
                "": {
                    "name": "app",
                    "dependencies": { "debug": "^4.3.0", "express": "^4.19.0" },
                    "devDependencies": { "typescript": "^5.4.0" }
                },
                "node_modules/debug": { "version": "4.3.7", "dependencies": { "ms": "^2.1.3" } },
                "node_modules/ms": { "version": "2.1.3" },
                "node_modules/express": { "version": "4.19.2", "dependencies": { "debug": "2.6.9" } },
                "node_modules/express/node_modules/debug": { "version": "2.6.9" }
            }
        })
        .to_string(),
    )
    .unwrap();
}

#[tokio::test]
async fn test_latest_skips_unknown_packages() {
    let server = MockServer::start().await;
    mock_latest(&server, "lodash", "4.17.21").await;
    Mock::given(method("GET"))
        .and(path("/no-such-package/latest"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let temp_dir = tempfile::tempdir().unwrap();
    let ctx = create_test_context(&temp_dir, &server.uri());

    let names = vec!["lodash".to_string(), "no-such-package".to_string()];
    let latest = latest::collect(&names, &ctx).await.unwrap();

    assert_eq!(latest.len(), 1);
    assert_eq!(latest["lodash"].version(), "4.17.21");
    assert!(ctx.settings.cache_file.exists());
}

#[tokio::test]
async fn test_outdated_uses_installed_versions() {
    let server = MockServer::start().await;
    mock_latest(&server, "debug", "4.3.7").await;
    mock_latest(&server, "express", "5.0.1").await;
    mock_latest(&server, "typescript", "5.6.3").await;

    let temp_dir = tempfile::tempdir().unwrap();
    write_project(&temp_dir);
    let ctx = create_test_context(&temp_dir, &server.uri());

    let report = outdated::collect(false, &ctx).await.unwrap();

    // debug is current; typescript is not installed and compares by its range
    assert_eq!(report.len(), 2);
    assert_eq!(report[0].name, "express");
    assert_eq!(report[0].current, "4.19.2");
    assert_eq!(report[0].level, OutdatedLevel::Major);
    assert_eq!(report[1].name, "typescript");
    assert_eq!(report[1].current, "^5.4.0");
    assert_eq!(report[1].level, OutdatedLevel::Minor);

    let all = outdated::collect(true, &ctx).await.unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn test_outdated_without_manifest() {
    let temp_dir = tempfile::tempdir().unwrap();
    let ctx = create_test_context(&temp_dir, "http://127.0.0.1:9");

    let err = outdated::collect(false, &ctx).await.unwrap_err();
    assert!(matches!(err, LockviewError::ManifestNotFound { .. }));
}

#[test]
fn test_build_report_skips_names_without_metadata() {
    let manifest: lockview_config::PackageJson = serde_json::from_value(json!({
        "dependencies": { "left-pad": "^1.1.0", "gone": "1.0.0" }
    }))
    .unwrap();
    let mut latest = LatestVersions::new();
    latest.insert("left-pad".to_string(), PackageMetadata::new("left-pad", "1.3.0"));

    let report = outdated::build_report(&manifest, &HashMap::new(), &latest, true);

    assert_eq!(report.len(), 1);
    assert_eq!(report[0].level, OutdatedLevel::Minor);
}

#[test]
fn test_render_report() {
    let report = vec![lockview_core::types::OutdatedEntry::new("express", "4.19.2", "5.0.1")];
    let text = outdated::render_report(&report, &ColorSupport::disabled());

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Package  Current  Latest  Update");
    assert_eq!(lines[1], "express  4.19.2   5.0.1   major");
}

#[tokio::test]
async fn test_tree_of_installed_project() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_project(&temp_dir);
    let ctx = create_test_context(&temp_dir, "http://127.0.0.1:9");

    let forest = tree::collect(None, &ctx).await;

    // typescript is declared but not installed
    assert_eq!(forest.len(), 2);
    assert_eq!(forest[0], TreeNode::with_children("debug", "4.3.7", vec![TreeNode::leaf("ms", "2.1.3")]));
    assert_eq!(forest[1].children, vec![TreeNode::leaf("debug", "2.6.9")]);

    let shallow = tree::collect(Some(1), &ctx).await;
    assert!(shallow.iter().all(TreeNode::is_leaf));
}

#[tokio::test]
async fn test_tree_from_nested_directory() {
    let temp_dir = tempfile::tempdir().unwrap();
    write_project(&temp_dir);
    let nested = temp_dir.path().join("src");
    fs::create_dir(&nested).unwrap();

    let mut ctx = create_test_context(&temp_dir, "http://127.0.0.1:9");
    ctx.cwd = Utf8PathBuf::try_from(nested).unwrap();

    assert_eq!(tree::collect(None, &ctx).await.len(), 2);
}

#[tokio::test]
async fn test_tree_without_node_modules_is_empty() {
    let temp_dir = tempfile::tempdir().unwrap();
    let ctx = create_test_context(&temp_dir, "http://127.0.0.1:9");

    assert!(tree::collect(None, &ctx).await.is_empty());
}

#[test]
fn test_render_forest() {
    let forest = vec![
        TreeNode::with_children(
            "a",
            "1.0.0",
            vec![TreeNode::with_children("b", "1.0.0", vec![TreeNode::leaf("a", "1.0.0")])],
        ),
        TreeNode::leaf("c", "2.0.0"),
    ];

    let text = tree::render_forest(&forest, &ColorSupport::disabled());

    let expected = "\
├── a@1.0.0
│   └── b@1.0.0
│       └── a@1.0.0
└── c@2.0.0";
    assert_eq!(text, expected);
}

#[tokio::test]
async fn test_cache_actions() {
    let server = MockServer::start().await;
    mock_latest(&server, "lodash", "4.17.21").await;

    let temp_dir = tempfile::tempdir().unwrap();
    let ctx = create_test_context(&temp_dir, &server.uri());
    latest::collect(&["lodash".to_string()], &ctx).await.unwrap();

    let stats = cache::collect(CacheAction::Stats, &ctx).await.unwrap();
    assert_eq!(stats.stats.unwrap().fresh_entries, 1);
    assert_eq!(stats.path, ctx.settings.cache_file);

    let pruned = cache::collect(CacheAction::Prune, &ctx).await.unwrap();
    assert_eq!(pruned.removed, Some(0));

    let cleared = cache::collect(CacheAction::Clear, &ctx).await.unwrap();
    assert_eq!(cleared.removed, Some(1));

    let stats = cache::collect(CacheAction::Stats, &ctx).await.unwrap();
    assert_eq!(stats.stats.unwrap().total_entries, 0);
}

#[test]
fn test_cache_report_json_shape() {
    let report = cache::CacheReport {
        path: Utf8PathBuf::from("/tmp/registry-cache.json"),
        ttl_secs: 60,
        stats: None,
        removed: Some(2),
    };

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value, json!({ "path": "/tmp/registry-cache.json", "ttlSecs": 60, "removed": 2 }));
}
