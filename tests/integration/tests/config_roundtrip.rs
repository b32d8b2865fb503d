//! Config file integration tests: a saved descriptor opens the same store.

use nodekeys_core::config::EXTRA_PATH;
use nodekeys_core::{BackendKind, SecretsConfig};
use nodekeys_integration_tests::node_dir;
use nodekeys_secrets::{BackendParams, BackendRegistry, SecretStore};
use tempfile::TempDir;

#[tokio::test]
async fn test_saved_local_config_opens_store() {
    let root = TempDir::new().unwrap();
    let config_path = root.path().join("secrets.json5");

    let config = SecretsConfig::local(node_dir(root.path()));
    config.validate().unwrap();
    config.save(&config_path).unwrap();

    let loaded = SecretsConfig::load(&config_path).unwrap();
    assert_eq!(loaded.backend, BackendKind::Local);
    assert_eq!(
        loaded.extra_str(EXTRA_PATH).unwrap(),
        config.extra_str(EXTRA_PATH).unwrap()
    );

    let store = BackendRegistry::with_defaults()
        .open(&loaded, &BackendParams::default())
        .await
        .unwrap();
    store.set("validator-key", b"from-config").await.unwrap();
    assert!(node_dir(root.path())
        .join("consensus")
        .join("validator.key")
        .is_file());
}

#[test]
fn test_handwritten_json5_config() {
    let config = SecretsConfig::parse(
        r#"{
            type: "gcp-ssm",
            name: "node1",
            extra: {
                "project-id": "validators-prod",
            },
        }"#,
    )
    .unwrap();
    assert_eq!(config.backend, BackendKind::GcpSsm);
    config.validate().unwrap();

    let json = serde_json::to_value(&config).unwrap();
    assert_eq!(json["type"], "gcp-ssm");
    assert!(json.get("token").is_none());
}
