// Storage backend tests
// Backends behind the ObjectStore trait object, built from configuration

use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tsubame::config::{FilesystemStorageConfig, StorageBackend, StorageConfig};
use tsubame::storage::{build_store, InMemoryStore, ObjectStore, StorageError};

fn filesystem_config(root: PathBuf) -> StorageConfig {
    StorageConfig {
        backend: StorageBackend::Filesystem,
        s3: None,
        filesystem: Some(FilesystemStorageConfig { root }),
    }
}

#[tokio::test]
async fn test_configured_filesystem_store_reads_nested_keys() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("2024/05")).unwrap();
    std::fs::write(dir.path().join("2024/05/cat.png"), b"cat").unwrap();

    let store = build_store(&filesystem_config(dir.path().to_path_buf()))
        .await
        .unwrap();

    assert_eq!(&store.fetch("2024/05/cat.png").await.unwrap()[..], b"cat");
    assert!(store.fetch("2024/05/dog.png").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_filesystem_store_rejects_escaping_keys() {
    let dir = TempDir::new().unwrap();
    let store = build_store(&filesystem_config(dir.path().to_path_buf()))
        .await
        .unwrap();

    let err = store.fetch("../../etc/hostname").await.unwrap_err();
    assert!(matches!(err, StorageError::InvalidKey { .. }));
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn test_missing_root_reports_not_found() {
    let store = build_store(&filesystem_config(PathBuf::from(
        "/nonexistent/tsubame/images",
    )))
    .await
    .unwrap();

    assert!(store.fetch("a.png").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_in_memory_store_as_trait_object() {
    let store: Arc<dyn ObjectStore> = Arc::new(
        InMemoryStore::new()
            .with_object("a.png", b"a".to_vec())
            .with_object("dir/b.png", b"b".to_vec()),
    );

    assert_eq!(store.backend_name(), "memory");
    assert_eq!(&store.fetch("dir/b.png").await.unwrap()[..], b"b");
    assert!(store.fetch("dir").await.unwrap_err().is_not_found());
}
