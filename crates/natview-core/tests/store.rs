//! Tests for definition stores

use std::fs;

use natview_core::{DefinitionStore, FileStore, MemoryStore, VisualizerRegistry};

const WIDGET: &str = r#"<AutoVisualizer><Type Name="Widget"><DisplayString>w</DisplayString></Type></AutoVisualizer>"#;

#[test]
fn test_file_store_reads_in_order()
{
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.natvis");
    let second = dir.path().join("second.natvis");
    fs::write(&first, WIDGET).unwrap();
    fs::write(&second, "<AutoVisualizer/>").unwrap();

    let store = FileStore::new([&first, &second]);
    let documents = store.documents();
    assert_eq!(documents.len(), 2);
    assert!(documents[0].origin.ends_with("first.natvis"));
    assert_eq!(documents[0].contents.as_deref().unwrap(), WIDGET);
}

#[test]
fn test_file_store_reports_unreadable_files()
{
    let dir = tempfile::tempdir().unwrap();
    let present = dir.path().join("present.natvis");
    fs::write(&present, WIDGET).unwrap();
    let missing = dir.path().join("missing.natvis");

    let store = FileStore::new([&missing, &present]);
    let documents = store.documents();
    assert!(documents[0].contents.is_err());

    let registry = VisualizerRegistry::new();
    assert_eq!(registry.load_store(&store), 1);
    assert!(registry.files()[0].origin.ends_with("present.natvis"));
}

#[test]
fn test_memory_store_documents()
{
    let store = MemoryStore::new()
        .with_document("a", WIDGET)
        .with_document("b", "<AutoVisualizer/>");
    let origins: Vec<_> = store.documents().into_iter().map(|document| document.origin).collect();
    assert_eq!(origins, ["a", "b"]);
}
