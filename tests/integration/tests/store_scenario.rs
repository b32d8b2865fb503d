//! End-to-end behaviour of the local secrets store through the backend registry.

use std::sync::Arc;

use nodekeys_core::SecretsConfig;
use nodekeys_integration_tests::{entries, node_dir};
use nodekeys_secrets::{BackendParams, BackendRegistry, SecretError, SecretStore};
use tempfile::TempDir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("nodekeys=debug")
        .with_test_writer()
        .try_init();
}

async fn open_node(root: &TempDir) -> Arc<dyn SecretStore> {
    init_tracing();
    let params = BackendParams::with_span(tracing::info_span!("node1"));
    BackendRegistry::with_defaults()
        .open(&SecretsConfig::local(node_dir(root.path())), &params)
        .await
        .expect("open local store")
}

#[tokio::test]
async fn test_node_key_scenario() {
    let root = TempDir::new().unwrap();
    let store = open_node(&root).await;
    let base = node_dir(root.path());

    assert_eq!(entries(&base), vec!["consensus", "libp2p"]);

    store.set("validator-key", &[0x01, 0x02]).await.unwrap();
    let key_file = base.join("consensus").join("validator.key");
    assert_eq!(std::fs::read(&key_file).unwrap(), vec![0x01, 0x02]);
    #[cfg(unix)]
    assert_eq!(nodekeys_integration_tests::mode_of(&key_file), 0o400);

    let result = store.set("validator-key", &[0x03]).await;
    assert!(matches!(result, Err(SecretError::AlreadyExists { .. })));
    assert_eq!(std::fs::read(&key_file).unwrap(), vec![0x01, 0x02]);

    assert!(matches!(
        store.get("unknown-name").await,
        Err(SecretError::NotFound(_))
    ));
}

#[cfg(unix)]
#[tokio::test]
async fn test_directories_are_owner_only() {
    use nodekeys_integration_tests::mode_of;

    let root = TempDir::new().unwrap();
    let _store = open_node(&root).await;
    let base = node_dir(root.path());

    assert_eq!(mode_of(&base), 0o700);
    assert_eq!(mode_of(&base.join("consensus")), 0o700);
    assert_eq!(mode_of(&base.join("libp2p")), 0o700);
}

#[tokio::test]
async fn test_reopen_keeps_secrets() {
    let root = TempDir::new().unwrap();
    {
        let store = open_node(&root).await;
        store.set("network-key", b"identity").await.unwrap();
    }

    let store = open_node(&root).await;
    assert!(store.has("network-key").await);
    assert_eq!(store.get("network-key").await.unwrap(), b"identity".to_vec());
    assert!(matches!(
        store.set("network-key", b"other").await,
        Err(SecretError::AlreadyExists { .. })
    ));
}

#[tokio::test]
async fn test_rotate_by_remove_then_set() {
    let root = TempDir::new().unwrap();
    let store = open_node(&root).await;

    store.set("network-key", b"old").await.unwrap();
    store.remove("network-key").await.unwrap();
    assert!(!store.has("network-key").await);
    assert_eq!(entries(&node_dir(root.path()).join("libp2p")), Vec::<String>::new());

    store.set("network-key", b"new").await.unwrap();
    assert_eq!(store.get("network-key").await.unwrap(), b"new".to_vec());
}

#[tokio::test]
async fn test_has_matches_get_for_every_name() {
    let root = TempDir::new().unwrap();
    let store = open_node(&root).await;
    store.set("validator-key", b"v").await.unwrap();

    for name in ["validator-key", "network-key", "unknown-name", ""] {
        assert_eq!(
            store.has(name).await,
            store.get(name).await.is_ok(),
            "has/get disagree for {name:?}"
        );
    }
}
