use super::*;
use crate::error::DocfillError;
use std::sync::{Arc, Barrier};
use std::thread;
use docfill_testkit::temp_dir_in_workspace;

fn new_template(name: &str, court: &str) -> NewTemplate {
    NewTemplate {
        name: name.to_string(),
        file_name: format!("{}.docx", name),
        description: Some("Modelo base".to_string()),
        kind: "demanda".to_string(),
        court: court.to_string(),
    }
}

fn uploader() -> Uploader {
    Uploader {
        id: "u-7".to_string(),
        name: "Ana Gómez".to_string(),
    }
}

#[test]
fn test_add_stores_file_and_index() {
    let temp = temp_dir_in_workspace();
    let store = CatalogStore::open(temp.path().join(".docfill"));

    let record = store
        .add(new_template("Demanda Ejecutiva", "Civil 3"), &uploader(), b"PK docx")
        .unwrap();

    assert_eq!(record.size_bytes, 7);
    assert_eq!(record.sha256, crate::files::sha256_hex(b"PK docx"));
    assert_eq!(record.uploaded_by_name, "Ana Gómez");
    assert!(store.index_path().exists());

    let stored = store.root().join(&record.storage_path);
    assert_eq!(std::fs::read(&stored).unwrap(), b"PK docx");
    assert_eq!(store.load_bytes(&record).unwrap(), b"PK docx");

    let index: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.index_path()).unwrap()).unwrap();
    assert_eq!(index["schema_version"], SCHEMA_VERSION);
    assert_eq!(index["templates"][0]["id"], record.id.as_str());
}

#[test]
fn test_get_and_list() {
    let temp = temp_dir_in_workspace();
    let store = CatalogStore::open(temp.path());

    assert!(store.list().unwrap().is_empty());

    let first = store.add(new_template("Uno", "Civil 3"), &uploader(), b"1").unwrap();
    let second = store.add(new_template("Dos", "Laboral 1"), &uploader(), b"2").unwrap();

    assert_eq!(store.get(&first.id).unwrap(), first);
    assert_eq!(store.list().unwrap().len(), 2);

    let civil = store
        .filter(&TemplateFilter {
            court: Some("CIVIL 3".to_string()),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(civil, vec![first]);
    assert_eq!(store.check().unwrap(), 2);
    assert_ne!(second.id, civil[0].id);
}

#[test]
fn test_unknown_id_is_not_found() {
    let temp = temp_dir_in_workspace();
    let store = CatalogStore::open(temp.path());

    assert!(matches!(
        store.get("missing"),
        Err(DocfillError::TemplateNotFound(ref id)) if id == "missing"
    ));
    assert!(matches!(
        store.remove("missing"),
        Err(DocfillError::TemplateNotFound(_))
    ));
}

#[test]
fn test_remove_deletes_file_and_entry() {
    let temp = temp_dir_in_workspace();
    let store = CatalogStore::open(temp.path());
    let record = store.add(new_template("Oficio", "Civil 3"), &uploader(), b"x").unwrap();
    let stored = store.root().join(&record.storage_path);

    let removed = store.remove(&record.id).unwrap();
    assert_eq!(removed.id, record.id);
    assert!(!stored.exists());
    assert!(!stored.parent().unwrap().exists());
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn test_invalid_template_writes_nothing() {
    let temp = temp_dir_in_workspace();
    let store = CatalogStore::open(temp.path().join("catalog"));

    let err = store.add(new_template(" ", "Civil 3"), &uploader(), b"x").unwrap_err();
    assert!(err.is_validation());
    assert!(!store.root().exists());
}

#[test]
fn test_unknown_schema_is_rejected() {
    let temp = temp_dir_in_workspace();
    let store = CatalogStore::open(temp.path());
    std::fs::write(
        store.index_path(),
        r#"{"schema_version": "9.9", "templates": []}"#,
    )
    .unwrap();

    assert!(matches!(
        store.list(),
        Err(DocfillError::CatalogInvalidSchema(ref v)) if v == "9.9"
    ));
}

#[test]
fn test_corrupt_index_is_read_error() {
    let temp = temp_dir_in_workspace();
    let store = CatalogStore::open(temp.path());
    std::fs::write(store.index_path(), "{not json").unwrap();

    assert!(matches!(store.check(), Err(DocfillError::CatalogRead(_))));
}

#[test]
fn test_load_bytes_refuses_escaping_paths() {
    let temp = temp_dir_in_workspace();
    let store = CatalogStore::open(temp.path());
    let mut record = store.add(new_template("Uno", "Civil 3"), &uploader(), b"1").unwrap();

    record.storage_path = "../outside.docx".to_string();
    assert!(matches!(
        store.load_bytes(&record),
        Err(DocfillError::CatalogRead(_))
    ));
    record.storage_path = "/etc/passwd".to_string();
    assert!(store.load_bytes(&record).is_err());
}

#[test]
fn test_concurrent_adds_are_all_indexed() {
    let temp = temp_dir_in_workspace();
    let store = Arc::new(CatalogStore::open(temp.path()));
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                store
                    .add(
                        new_template(&format!("Plantilla {}", i), "Civil 3"),
                        &uploader(),
                        format!("contenido {}", i).as_bytes(),
                    )
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(store.list().unwrap().len(), 4);
}
