use padstore::dispatcher::Dispatcher;
use padstore::discovery;
use padstore::model::{NoteKey, Scope};
use padstore::store::backend::{BackendProvider, StorageBackend};
use padstore::store::fs_backend::{FsBackend, FsProvider, CONTENT_DIR, INDEX_FILE};
use padstore::store::{IndexFile, ListFilter, NoteStore};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn setup() -> (TempDir, FsBackend) {
    let dir = TempDir::new().unwrap();
    let backend = FsBackend::new(dir.path().join("proj"));
    (dir, backend)
}

fn assert_no_tmp_files(dir: &Path) {
    if !dir.exists() {
        return;
    }
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(!name.ends_with(".tmp"), "Found leftover tmp file: {}", name);
    }
}

#[test]
fn blob_round_trip_and_delete() {
    let (_dir, backend) = setup();
    let key = NoteKey::new();

    backend.write_blob(&key, b"Hello World").unwrap();
    assert_eq!(backend.read_blob(&key).unwrap(), Some(b"Hello World".to_vec()));

    backend.delete_blob(&key).unwrap();
    assert_eq!(backend.read_blob(&key).unwrap(), None);
    // Deleting again is fine.
    backend.delete_blob(&key).unwrap();
}

#[test]
fn atomic_writes_leave_no_artifacts() {
    let (_dir, backend) = setup();
    let store = NoteStore::new(Scope::Project("proj".to_string()), backend);
    let note = store.create(b"Atomic", "A").unwrap();

    let root = store.content_path(&note.key);
    let content_dir = root.parent().unwrap();
    assert_eq!(fs::read(&root).unwrap(), b"Atomic");
    assert!(content_dir.parent().unwrap().join(INDEX_FILE).exists());

    assert_no_tmp_files(content_dir);
    assert_no_tmp_files(content_dir.parent().unwrap());
}

#[test]
fn index_file_layout() {
    let (dir, backend) = setup();
    let store = NoteStore::new(Scope::Project("proj".to_string()), backend);
    let note = store.create(b"Buy milk\nand eggs", "").unwrap();

    let raw = fs::read_to_string(dir.path().join("proj").join(INDEX_FILE)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["version"], 1);
    let entry = &json["notes"][note.key.to_string()];
    assert_eq!(entry["title"], "Buy milk");
    assert_eq!(entry["size"], 17);

    let blob = dir.path().join("proj").join(CONTENT_DIR).join(note.key.to_string());
    assert_eq!(fs::read(blob).unwrap().len(), 17);
}

#[test]
fn missing_index_loads_empty() {
    let (_dir, backend) = setup();
    let index: IndexFile = backend.load_index().unwrap();
    assert!(index.notes.is_empty());
    assert!(backend.list_blob_keys().unwrap().is_empty());
}

#[test]
fn binary_content_survives_the_disk() {
    let (_dir, backend) = setup();
    let store = NoteStore::new(Scope::Global, backend);
    let bytes: Vec<u8> = (0..=255u8).collect();

    let note = store.create(&bytes, "bytes").unwrap();
    assert_eq!(store.get(&note.key).unwrap().1, bytes);
}

#[test]
fn stray_files_are_not_blob_keys() {
    let (dir, backend) = setup();
    let key = NoteKey::new();
    backend.write_blob(&key, b"x").unwrap();
    let content_dir = dir.path().join("proj").join(CONTENT_DIR);
    fs::write(content_dir.join("notes.txt"), "not a note").unwrap();
    fs::write(content_dir.join(".blob-leftover.tmp"), "partial").unwrap();

    assert_eq!(backend.list_blob_keys().unwrap(), vec![key]);
    assert_eq!(backend.sweep_temp_files().unwrap(), 1);
    assert_no_tmp_files(&content_dir);
}

#[test]
fn orphaned_blob_is_recovered_from_disk() {
    let (_dir, backend) = setup();
    let key = NoteKey::new();
    backend.write_blob(&key, b"\n  Lost shopping list\nmilk").unwrap();
    let store = NoteStore::new(Scope::Project("proj".to_string()), backend);

    let report = discovery::discover(&store).unwrap();
    assert_eq!(report.recovered, vec![key]);
    assert_eq!(store.note(&key).unwrap().title, "Lost shopping list");

    let again = discovery::discover(&store).unwrap();
    assert!(again.recovered.is_empty());
}

#[test]
fn provider_knows_scopes_with_state() {
    let dir = TempDir::new().unwrap();
    let provider = FsProvider::new(dir.path().to_path_buf());
    assert!(provider.known_scopes().unwrap().is_empty());

    let mut d = Dispatcher::new(provider.clone());
    d.create_in(&Scope::Global, b"g", "G").unwrap();
    d.create_in(&Scope::Project("web-app".to_string()), b"w", "W").unwrap();
    fs::create_dir(dir.path().join("empty")).unwrap();
    fs::create_dir_all(dir.path().join(".hidden").join(CONTENT_DIR)).unwrap();

    let scopes = provider.known_scopes().unwrap();
    assert_eq!(
        scopes,
        vec![Scope::Global, Scope::Project("web-app".to_string())]
    );
}

#[test]
fn corrupt_index_only_breaks_its_own_scope() {
    let dir = TempDir::new().unwrap();
    let provider = FsProvider::new(dir.path().to_path_buf());
    let mut d = Dispatcher::new(provider.clone());
    d.create_in(&Scope::Project("good".to_string()), b"ok", "Fine").unwrap();

    let bad = dir.path().join("bad");
    fs::create_dir_all(&bad).unwrap();
    fs::write(bad.join(INDEX_FILE), "{ not json").unwrap();

    let mut d = Dispatcher::new(provider);
    let listing = d.list_all_scopes(ListFilter::Active).unwrap();
    assert_eq!(listing.results.len(), 1);
    assert_eq!(listing.errors.len(), 1);
    assert_eq!(listing.errors[0].scope, Scope::Project("bad".to_string()));
    assert!(listing.errors[0].error.is_storage());
}
