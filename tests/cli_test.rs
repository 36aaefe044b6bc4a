//! Tests for command dispatch and exit codes

use std::path::{Path, PathBuf};

use clap::Parser;
use tempfile::TempDir;

use roster::cli::commands::{college_tree, execute_command};
use roster::cli::{Cli, CliError};
use roster::config::Settings;
use roster::domain::Dataset;
use roster::exitcode;
use roster::infrastructure::di::ServiceContainer;

/// Helper to create a temp dataset file for testing
fn create_dataset_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write dataset file");
    path
}

fn run(project: &Path, args: &[&str]) -> Result<(), CliError> {
    let project = project.to_string_lossy().into_owned();
    let mut argv = vec!["roster", "-C", project.as_str()];
    argv.extend_from_slice(args);
    execute_command(&Cli::parse_from(argv))
}

#[test]
fn given_mock_dataset_when_running_queries_then_succeeds() {
    let project = TempDir::new().unwrap();

    for args in [
        vec!["colleges"],
        vec!["college", "1"],
        vec!["departments", "--college", "2"],
        vec!["department", "101"],
        vec!["classes"],
        vec!["class", "3002"],
        vec!["students", "--class", "1001"],
        vec!["student", "7"],
        vec!["search", "zhang", "--level", "student"],
        vec!["search", "ZHANG", "--ignore-case"],
        vec!["tree"],
        vec!["stats", "--format", "json"],
        vec!["check"],
    ] {
        let result = run(project.path(), &args);
        assert!(result.is_ok(), "{:?} failed: {:?}", args, result.err());
    }
}

#[test]
fn given_unknown_student_when_showing_then_exit_noinput() {
    let project = TempDir::new().unwrap();

    let err = run(project.path(), &["student", "999"]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::NOINPUT);
    assert_eq!(err.to_string(), "student not found: 999");
}

#[test]
fn given_blank_search_when_running_then_exit_usage() {
    let project = TempDir::new().unwrap();

    let err = run(project.path(), &["search", " "]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::USAGE);
}

#[test]
fn given_dataset_with_duplicate_ids_when_check_then_exit_dataerr() {
    let project = TempDir::new().unwrap();
    let dataset = create_dataset_file(
        &project,
        "dups.json",
        r#"{"colleges": [{"id": 1, "name": "A"}, {"id": 1, "name": "B"}]}"#,
    );

    let err = run(
        project.path(),
        &["--dataset", dataset.to_str().unwrap(), "check"],
    )
    .unwrap_err();

    assert!(matches!(err, CliError::DuplicateIds(1)));
    assert_eq!(err.exit_code(), exitcode::DATAERR);
}

#[test]
fn given_malformed_dataset_when_querying_then_exit_dataerr() {
    let project = TempDir::new().unwrap();
    let dataset = create_dataset_file(&project, "bad.json", "[1, 2, 3]");

    let err = run(
        project.path(),
        &["--dataset", dataset.to_str().unwrap(), "colleges"],
    )
    .unwrap_err();

    assert_eq!(err.exit_code(), exitcode::DATAERR);
}

#[test]
fn given_existing_target_when_exporting_without_force_then_usage_error() {
    let project = TempDir::new().unwrap();
    let target = create_dataset_file(&project, "mock.json", "{}");
    let target = target.to_str().unwrap();

    let err = run(project.path(), &["dataset", "export", target]).unwrap_err();
    assert_eq!(err.exit_code(), exitcode::USAGE);

    run(project.path(), &["dataset", "export", target, "--force"]).unwrap();
    let exported = std::fs::read_to_string(target).unwrap();
    assert_eq!(Dataset::from_json(&exported).unwrap(), Dataset::mock().unwrap());
}

#[test]
fn given_project_dir_when_config_init_then_writes_local_template() {
    let project = TempDir::new().unwrap();

    run(project.path(), &["config", "init"]).unwrap();

    let written = std::fs::read_to_string(project.path().join(".roster.toml")).unwrap();
    assert_eq!(written, Settings::template());
    let err = run(project.path(), &["config", "init"]).unwrap_err();
    assert_eq!(err.exit_code(), exitcode::USAGE);
}

#[test]
fn given_college_when_rendering_tree_then_nests_all_levels() {
    let dataset = Dataset::mock().unwrap();

    let rendered = college_tree(&dataset.colleges[2]).to_string();

    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines[0], "College of Science [3]");
    assert!(rendered.contains("Mathematics [301]"));
    assert!(rendered.contains("Math 2023-1 [3001]"));
    assert!(rendered.contains("Noah Gao [15]"));
    assert!(rendered.contains("Physics 2023-1 [3002]"));
    // college + 2 departments + 2 classes + 2 students
    assert_eq!(lines.len(), 7);
}

#[test]
fn given_settings_without_dataset_when_building_container_then_serves_mock() {
    let container = ServiceContainer::new(Settings::default()).unwrap();
    assert_eq!(container.school.colleges().len(), 3);
}
