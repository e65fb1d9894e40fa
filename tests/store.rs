use chrono::{Local, TimeZone};
use receiptgen::{ArtifactKind, ArtifactStore, Error, RenderedArtifact};

fn at(second: u32) -> chrono::DateTime<Local> {
    Local.with_ymd_and_hms(2025, 9, 21, 21, 42, second).single().unwrap()
}

#[test]
fn write_uses_room_and_timestamp() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path().join("out"), None);
    let artifact = RenderedArtifact::new(ArtifactKind::Pdf, b"%PDF-1.7".to_vec());
    let path = store.write(&artifact, "101", &at(2)).unwrap();
    assert_eq!(path, dir.path().join("out/receipt_101_20250921_214202.pdf"));
    assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7");
}

#[test]
fn backups_listed_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path().join("out"), Some(dir.path().join("backup")));
    let first = store
        .backup(&RenderedArtifact::new(ArtifactKind::Pdf, vec![1; 10]), "NO101202509", &at(1))
        .unwrap();
    std::thread::sleep(std::time::Duration::from_millis(20));
    store
        .backup(&RenderedArtifact::new(ArtifactKind::Png, vec![2; 20]), "NO102202509", &at(3))
        .unwrap();
    assert!(first.ends_with("receipt_NO101202509_20250921_214201.pdf"));

    let entries = store.list_backups().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].file_name, "receipt_NO102202509_20250921_214203.png");
    assert_eq!(entries[0].size, 20);
    assert_eq!(entries[1].size, 10);

    let bytes = store.read_backup(&entries[1].file_name).unwrap();
    assert_eq!(bytes, vec![1; 10]);
}

#[test]
fn backup_failure_is_swallowed() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();
    let store = ArtifactStore::new(dir.path().join("out"), Some(blocker.join("backup")));
    let artifact = RenderedArtifact::new(ArtifactKind::Pdf, vec![0]);
    assert!(store.backup(&artifact, "NO1", &at(0)).is_none());
}

#[test]
fn missing_backup_dir_lists_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path(), Some(dir.path().join("never-created")));
    assert!(store.list_backups().unwrap().is_empty());
    assert!(ArtifactStore::new(dir.path(), None).list_backups().unwrap().is_empty());
}

#[test]
fn read_backup_rejects_paths() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path(), Some(dir.path().join("backup")));
    for name in ["../secret", "a/b.pdf", "a\\b.pdf", ""] {
        assert!(matches!(store.read_backup(name), Err(Error::InvalidRequest(_))), "{}", name);
    }
    assert!(matches!(store.read_backup("absent.pdf"), Err(Error::StorageError(_))));
}
