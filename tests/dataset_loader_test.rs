//! Tests for DatasetLoader

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use roster::application::services::DatasetLoader;
use roster::application::ApplicationError;
use roster::domain::{Dataset, DomainError};
use roster::infrastructure::traits::{FileSystem, RealFileSystem};

/// Helper to create a temp dataset file for testing
fn create_dataset_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write dataset file");
    path
}

fn loader() -> DatasetLoader {
    DatasetLoader::new(Arc::new(RealFileSystem))
}

#[test]
fn given_no_path_when_loading_then_returns_mock_dataset() {
    let dataset = loader().load(None).unwrap();
    assert_eq!(dataset, Dataset::mock().unwrap());
}

#[test]
fn given_valid_file_when_loading_then_copies_structure() {
    let temp = TempDir::new().unwrap();
    let path = create_dataset_file(
        &temp,
        "school.json",
        r#"{"colleges": [{"id": 5, "name": "Tiny College", "departments": [
            {"id": 50, "name": "Only Dept", "classes": [
                {"id": 500, "name": "Only Class", "students": [
                    {"id": 1, "name": "Solo", "age": 30, "gender": "female", "grade": 100}
                ]}
            ]}
        ]}]}"#,
    );

    let dataset = loader().load(Some(path.as_path())).unwrap();

    assert_eq!(dataset.colleges.len(), 1);
    let (_, _, class, student) = dataset.students().next().unwrap();
    assert_eq!(class.name, "Only Class");
    assert_eq!(student.grade, 100);
}

#[test]
fn given_missing_file_when_loading_then_operation_failed_with_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("missing.json");

    let result = loader().load(Some(path.as_path()));

    match result {
        Err(ApplicationError::OperationFailed { context, .. }) => {
            assert!(context.contains("missing.json"), "context: {context}")
        }
        other => panic!("expected OperationFailed, got {other:?}"),
    }
}

#[test]
fn given_malformed_json_when_loading_then_invalid_dataset() {
    let temp = TempDir::new().unwrap();
    let path = create_dataset_file(&temp, "broken.json", r#"{"colleges": [ {"id": 1, "#);

    let result = loader().load(Some(path.as_path()));

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::InvalidDataset { .. }))
    ));
}

#[test]
fn given_export_when_loading_exported_file_then_equals_mock() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("mock.json");
    let loader = loader();

    loader.export_mock(&path).unwrap();
    let dataset = loader.load(Some(path.as_path())).unwrap();

    assert_eq!(dataset, Dataset::mock().unwrap());
}

/// Filesystem whose reads always fail, to check error propagation.
struct UnreadableFileSystem;

impl FileSystem for UnreadableFileSystem {
    fn read_to_string(&self, _path: &Path) -> io::Result<String> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
    }
    fn write(&self, _path: &Path, _content: &str) -> io::Result<()> {
        Ok(())
    }
    fn exists(&self, _path: &Path) -> bool {
        true
    }
    fn is_file(&self, _path: &Path) -> bool {
        true
    }
    fn ensure_parent(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn given_unreadable_file_when_loading_then_read_error_has_context() {
    let loader = DatasetLoader::new(Arc::new(UnreadableFileSystem));

    let err = loader.load(Some(Path::new("/school.json"))).unwrap_err();

    assert!(err.to_string().contains("read dataset /school.json"));
}
