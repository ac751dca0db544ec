//! Unit tests for CLI commands.

use super::*;
use std::cmp::Ordering;
use std::fs;
use std::time::Duration;

use camino::Utf8Path;
use tempfile::TempDir;

const REGISTRY_FIXTURE: &str = include_str!("../../../sprig-resolver/fixtures/registry.json");

fn utf8_dir(temp_dir: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).expect("temp dir is not UTF-8")
}

/// Create a test command context in a directory
fn create_test_context(cwd: &Utf8Path) -> CommandContext {
    CommandContext {
        cwd: cwd.to_path_buf(),
        output: OutputHandler::with_colors(ColorSupport::disabled()),
    }
}

/// Registry flags pointing at the fixture, written into `dir`
fn offline_args(dir: &Utf8Path) -> RegistryArgs {
    let path = dir.join("registry.json");
    fs::write(&path, REGISTRY_FIXTURE).unwrap();
    RegistryArgs {
        registry: None,
        offline_fixtures: Some(path),
    }
}

#[tokio::test]
async fn test_tree_against_offline_fixtures() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = utf8_dir(&temp_dir);
    let ctx = create_test_context(&root);
    let args = offline_args(&root);

    let builder = tree_builder(&ctx, &args).await.unwrap();
    let tree = tree::resolve(&builder, "react", "16.13.0").await.unwrap();
    assert_eq!(tree.node_count(), 8);

    let text = tree::format_tree(&tree, false, &ctx).unwrap();
    assert!(text.starts_with("react@16.13.0\n"));
    assert!(text.contains("├── loose-envify@1.4.0 (^1.1.0)"));
    assert!(text.contains("└── prop-types@15.7.2 (^15.6.2)"));

    let json: serde_json::Value = serde_json::from_str(&tree::format_tree(&tree, true, &ctx).unwrap()).unwrap();
    assert_eq!(json["name"], "react");
    assert_eq!(json["dependencies"]["object-assign"]["version"], "4.1.1");

    // react > prop-types > loose-envify > js-tokens
    assert_eq!(
        tree::summary(&tree, Duration::from_millis(250)),
        "8 packages, 3 levels deep, resolved in 0.25s"
    );
    assert!(builder.registry().cache_stats().is_none());
}

#[tokio::test]
async fn test_tree_unknown_version() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = utf8_dir(&temp_dir);
    let ctx = create_test_context(&root);

    let builder = tree_builder(&ctx, &offline_args(&root)).await.unwrap();
    let result = tree::resolve(&builder, "react", "15.0.0").await;
    assert!(matches!(result, Err(SprigError::VersionNotFound { .. })));
}

#[tokio::test]
async fn test_missing_offline_fixture_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = utf8_dir(&temp_dir);
    let ctx = create_test_context(&root);
    let args = RegistryArgs {
        registry: None,
        offline_fixtures: Some(root.join("missing.json")),
    };

    assert!(matches!(tree_builder(&ctx, &args).await, Err(SprigError::Io { .. })));
}

#[tokio::test]
async fn test_deps_from_package_json() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = utf8_dir(&temp_dir);
    fs::write(
        root.join("package.json"),
        r#"{
            "name": "app",
            "version": "0.1.0",
            "dependencies": { "object-assign": "^4.1.0" },
            "devDependencies": { "js-tokens": "^3.0.0" }
        }"#,
    )
    .unwrap();

    let nested = root.join("src");
    fs::create_dir_all(&nested).unwrap();
    let ctx = create_test_context(&nested);

    let path = ctx.config_loader().find_package_json().unwrap();
    assert_eq!(path, root.join("package.json"));
    let package = sprig_config::json::load_from_file(&path).await.unwrap();

    let builder = tree_builder(&ctx, &offline_args(&root)).await.unwrap();

    let runtime = deps::resolve(&builder, &package, false).await.unwrap();
    assert_eq!(runtime.len(), 1);
    assert_eq!(runtime["object-assign"].version(), "4.1.1");

    let all = deps::resolve(&builder, &package, true).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all["js-tokens"].version(), "3.0.2");
}

#[tokio::test]
async fn test_registry_selection() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = utf8_dir(&temp_dir);

    let settings = Settings::default();
    let registry = Registry::open(&settings, &RegistryArgs::default()).await.unwrap();
    assert!(matches!(registry, Registry::Cached(_)));
    assert_eq!(registry.cache_stats().map(|stats| stats.total_entries), Some(0));

    let uncached = Settings {
        cache_enabled: false,
        ..Settings::default()
    };
    let registry = Registry::open(&uncached, &RegistryArgs::default()).await.unwrap();
    assert!(matches!(registry, Registry::Remote(_)));

    let registry = Registry::open(&settings, &offline_args(&root)).await.unwrap();
    assert!(matches!(registry, Registry::Offline(_)));
}

#[test]
fn test_client_options_from_settings() {
    let options = client_options(&Settings::default());
    assert_eq!(options.base_url, "https://registry.npmjs.org");
    assert!(options.auth.is_none());
    assert_eq!(options.retry.max_retries, 3);

    let settings = Settings {
        registry_url: "https://npm.example.com".to_string(),
        timeout: Duration::from_secs(5),
        token: Some("secret".to_string()),
        ..Settings::default()
    };
    let options = client_options(&settings);
    assert_eq!(options.timeout, Duration::from_secs(5));
    assert_eq!(options.auth.unwrap().token.as_deref(), Some("secret"));
}

#[test]
fn test_resolve_options_from_settings() {
    let settings = Settings {
        max_concurrent_fetches: 2,
        prerelease_order: vec!["beta".to_string(), "rc".to_string()],
        ..Settings::default()
    };
    let options = resolve_options(&settings);
    assert_eq!(options.max_concurrent_fetches, 2);
    assert_eq!(options.ranking.identifiers(), ["beta", "rc"]);
}

#[test]
fn test_satisfies() {
    assert!(version::satisfies("^16.4.0 || 17.x", "17.0.2").unwrap());
    assert!(version::satisfies("~1.2.0", "1.2.9").unwrap());
    assert!(!version::satisfies("~1.2.0", "1.3.0").unwrap());
    assert!(!version::satisfies("^1.0.0", "2.0.0-alpha.1").unwrap());
    assert!(matches!(
        version::satisfies(">=1.0.0", "1.0.0"),
        Err(SprigError::MalformedRange { .. })
    ));
    assert!(matches!(
        version::satisfies("^1.0.0", "one"),
        Err(SprigError::MalformedVersion { .. })
    ));
}

#[test]
fn test_compare() {
    let ranking = PrereleaseRanking::default();
    assert_eq!(version::compare("1.0.0-alpha.1", "1.0.0-beta.1", &ranking).unwrap(), Ordering::Less);
    assert_eq!(version::compare("1.0.0", "1.0.0-rc.1", &ranking).unwrap(), Ordering::Greater);
    assert_eq!(version::compare("2.1.0", "2.1.0", &ranking).unwrap(), Ordering::Equal);

    let reversed = PrereleaseRanking::new(["rc", "beta", "alpha"]);
    assert_eq!(version::compare("1.0.0-alpha.1", "1.0.0-beta.1", &reversed).unwrap(), Ordering::Greater);

    assert_eq!(version::ordering_symbol(Ordering::Less), "<");
    assert_eq!(version::ordering_symbol(Ordering::Equal), "=");
    assert_eq!(version::ordering_symbol(Ordering::Greater), ">");
}
