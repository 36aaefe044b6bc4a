//! Command dispatch: one handler per subcommand

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::CommandFactory;
use clap_complete::generate;
use serde::Serialize;
use termtree::Tree;
use tracing::{debug, instrument};

use crate::application::services::{DatasetLoader, SchoolService, SearchOptions, StudentStats};
use crate::cli::args::{Cli, Commands, ConfigCommands, DatasetCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, OutputFormat, Settings};
use crate::domain::{Class, ClassView, College, Id, Level, StudentView};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Some(Commands::Config { command }) => execute_config(cli, command),
        Some(Commands::Dataset { command }) => execute_dataset(command),
        Some(command) => {
            let container = build_container(cli)?;
            let view = View {
                school: &container.school,
                format: container.settings.format,
            };
            execute_query(&view, &container.settings, command)
        }
        None => Ok(()),
    }
}

fn project_dir(cli: &Cli) -> Option<PathBuf> {
    cli.project_dir
        .clone()
        .or_else(|| std::env::current_dir().ok())
}

/// Load settings and apply command line overrides on top.
pub fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(project_dir(cli).as_deref())?;
    if let Some(dataset) = &cli.dataset {
        settings.dataset = Some(dataset.clone());
    }
    if let Some(format) = cli.format {
        settings.format = format;
    }
    debug!("effective settings: {:?}", settings);
    Ok(settings)
}

fn build_container(cli: &Cli) -> CliResult<ServiceContainer> {
    let settings = load_settings(cli)?;
    Ok(ServiceContainer::new(settings)?)
}

/// Rendering context shared by the query handlers.
struct View<'a> {
    school: &'a SchoolService,
    format: OutputFormat,
}

impl View<'_> {
    fn json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}

fn emit_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(value).map_err(InfraError::from)?;
    output::info(&rendered);
    Ok(())
}

fn execute_query(view: &View<'_>, settings: &Settings, command: &Commands) -> CliResult<()> {
    match command {
        Commands::Colleges => _colleges(view),
        Commands::College { id } => _college(view, *id),
        Commands::Departments { college } => _departments(view, *college),
        Commands::Department { id } => _department(view, *id),
        Commands::Classes { department } => _classes(view, *department),
        Commands::Class { id } => _class(view, *id),
        Commands::Students { class } => _students(view, *class),
        Commands::Student { id } => _student(view, *id),
        Commands::Search {
            query,
            levels,
            case_sensitive,
            ignore_case,
        } => {
            let case = Commands::case_override(*case_sensitive, *ignore_case);
            _search(view, settings, query, levels, case)
        }
        Commands::Tree => _tree(view),
        Commands::Stats => _stats(view),
        Commands::Check => _check(view),
        Commands::Completion { .. } | Commands::Config { .. } | Commands::Dataset { .. } => {
            Err(CliError::Usage("not a query command".into()))
        }
    }
}

// ============================================================
// Colleges
// ============================================================

#[instrument(skip(view))]
fn _colleges(view: &View<'_>) -> CliResult<()> {
    let colleges = view.school.colleges();
    if view.json() {
        return emit_json(colleges);
    }
    let rows: Vec<Vec<String>> = colleges
        .iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                c.name.clone(),
                c.departments.len().to_string(),
            ]
        })
        .collect();
    output::table(&["ID", "NAME", "DEPARTMENTS"], &rows);
    Ok(())
}

#[instrument(skip(view))]
fn _college(view: &View<'_>, id: Id) -> CliResult<()> {
    let college = view.school.college(id)?;
    if view.json() {
        return emit_json(college);
    }
    output::header(&format!("College {}: {}", college.id, college.name));
    let departments = view.school.departments_of(id)?;
    let rows: Vec<Vec<String>> = departments
        .iter()
        .map(|d| {
            vec![
                d.department.id.to_string(),
                d.department.name.clone(),
                d.department.classes.len().to_string(),
            ]
        })
        .collect();
    output::table(&["ID", "DEPARTMENT", "CLASSES"], &rows);
    Ok(())
}

// ============================================================
// Departments
// ============================================================

#[instrument(skip(view))]
fn _departments(view: &View<'_>, college: Option<Id>) -> CliResult<()> {
    let departments = match college {
        Some(id) => view.school.departments_of(id)?,
        None => view.school.departments(),
    };
    if view.json() {
        return emit_json(&departments);
    }
    let rows: Vec<Vec<String>> = departments
        .iter()
        .map(|d| {
            vec![
                d.department.id.to_string(),
                d.department.name.clone(),
                d.college_name.to_string(),
                d.department.classes.len().to_string(),
            ]
        })
        .collect();
    output::table(&["ID", "NAME", "COLLEGE", "CLASSES"], &rows);
    Ok(())
}

#[instrument(skip(view))]
fn _department(view: &View<'_>, id: Id) -> CliResult<()> {
    let department = view.school.department(id)?;
    if view.json() {
        return emit_json(&department);
    }
    output::header(&format!(
        "{} / {}",
        department.college_name, department.department.name
    ));
    let classes = view.school.classes_of(id)?;
    let rows: Vec<Vec<String>> = classes
        .iter()
        .map(|c| {
            vec![
                c.class.id.to_string(),
                c.class.name.clone(),
                c.class.students.len().to_string(),
            ]
        })
        .collect();
    output::table(&["ID", "CLASS", "STUDENTS"], &rows);
    Ok(())
}

// ============================================================
// Classes
// ============================================================

#[instrument(skip(view))]
fn _classes(view: &View<'_>, department: Option<Id>) -> CliResult<()> {
    let classes = match department {
        Some(id) => view.school.classes_of(id)?,
        None => view.school.classes(),
    };
    if view.json() {
        return emit_json(&classes);
    }
    let rows: Vec<Vec<String>> = classes
        .iter()
        .map(|c| {
            vec![
                c.class.id.to_string(),
                c.class.name.clone(),
                c.department_name.to_string(),
                c.class.students.len().to_string(),
            ]
        })
        .collect();
    output::table(&["ID", "NAME", "DEPARTMENT", "STUDENTS"], &rows);
    Ok(())
}

#[derive(Serialize)]
struct ClassDetail<'a> {
    #[serde(flatten)]
    class: ClassView<'a>,
    stats: StudentStats,
}

#[instrument(skip(view))]
fn _class(view: &View<'_>, id: Id) -> CliResult<()> {
    let class = view.school.class(id)?;
    let stats = view.school.class_stats(id)?;
    if view.json() {
        return emit_json(&ClassDetail { class, stats });
    }
    output::header(&format!(
        "{} / {} / {}",
        class.college_name, class.department_name, class.class.name
    ));
    let students = view.school.students_of(id)?;
    output::table(&STUDENT_HEADERS[..5], &student_rows(&students, false));
    println!();
    print_student_stats(&stats);
    Ok(())
}

// ============================================================
// Students
// ============================================================

const STUDENT_HEADERS: [&str; 6] = ["ID", "NAME", "AGE", "GENDER", "GRADE", "CLASS"];

fn student_rows(students: &[StudentView<'_>], with_class: bool) -> Vec<Vec<String>> {
    students
        .iter()
        .map(|v| {
            let s = v.student;
            let mut row = vec![
                s.id.to_string(),
                s.name.clone(),
                s.age.to_string(),
                s.gender.to_string(),
                s.grade.to_string(),
            ];
            if with_class {
                row.push(v.class_name.to_string());
            }
            row
        })
        .collect()
}

#[instrument(skip(view))]
fn _students(view: &View<'_>, class: Option<Id>) -> CliResult<()> {
    let students = match class {
        Some(id) => view.school.students_of(id)?,
        None => view.school.students(),
    };
    if view.json() {
        return emit_json(&students);
    }
    output::table(&STUDENT_HEADERS, &student_rows(&students, true));
    Ok(())
}

#[instrument(skip(view))]
fn _student(view: &View<'_>, id: Id) -> CliResult<()> {
    let student = view.school.student(id)?;
    if view.json() {
        return emit_json(&student);
    }
    output::header(&student.breadcrumb());
    let s = student.student;
    output::field("id", 7, &s.id);
    output::field("age", 7, &s.age);
    output::field("gender", 7, &s.gender);
    output::field("grade", 7, &s.grade);
    Ok(())
}

// ============================================================
// Search
// ============================================================

/// Search options from config, with command line levels and case sensitivity on top.
fn search_options(
    settings: &Settings,
    levels: &[Level],
    case_sensitive: Option<bool>,
) -> CliResult<SearchOptions> {
    let mut options = settings.search.to_options()?;
    if !levels.is_empty() {
        options.levels = levels.to_vec();
    }
    if let Some(case_sensitive) = case_sensitive {
        options.case_sensitive = case_sensitive;
    }
    Ok(options)
}

#[instrument(skip(view, settings))]
fn _search(
    view: &View<'_>,
    settings: &Settings,
    query: &str,
    levels: &[Level],
    case_sensitive: Option<bool>,
) -> CliResult<()> {
    let options = search_options(settings, levels, case_sensitive)?;

    let hits = view.school.search(query, &options)?;
    if view.json() {
        return emit_json(&hits);
    }
    if hits.is_empty() {
        output::warning(&format!("no matches for '{}'", query));
        return Ok(());
    }
    let rows: Vec<Vec<String>> = hits
        .iter()
        .map(|h| {
            vec![
                h.level.to_string(),
                h.id.to_string(),
                h.name.to_string(),
                h.path.join(" / "),
            ]
        })
        .collect();
    output::table(&["LEVEL", "ID", "NAME", "PATH"], &rows);
    Ok(())
}

// ============================================================
// Whole dataset
// ============================================================

fn node_label(name: &str, id: Id) -> String {
    format!("{} [{}]", name, id)
}

fn class_trees(classes: &[Class]) -> Vec<Tree<String>> {
    classes
        .iter()
        .map(|c| {
            Tree::new(node_label(&c.name, c.id))
                .with_leaves(c.students.iter().map(|s| node_label(&s.name, s.id)))
        })
        .collect()
}

/// Render one college with all descendants.
pub fn college_tree(college: &College) -> Tree<String> {
    Tree::new(node_label(&college.name, college.id)).with_leaves(
        college
            .departments
            .iter()
            .map(|d| Tree::new(node_label(&d.name, d.id)).with_leaves(class_trees(&d.classes))),
    )
}

#[instrument(skip(view))]
fn _tree(view: &View<'_>) -> CliResult<()> {
    if view.json() {
        return emit_json(view.school.dataset());
    }
    for college in view.school.colleges() {
        print!("{}", college_tree(college));
    }
    Ok(())
}

const LABEL_WIDTH: usize = 14;

fn print_student_stats(stats: &StudentStats) {
    let average = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"));
    let range = |r: Option<(u8, u8)>| {
        r.map_or_else(|| "-".to_string(), |(lo, hi)| format!("{lo}-{hi}"))
    };
    let genders = if stats.genders.is_empty() {
        "-".to_string()
    } else {
        stats
            .genders
            .iter()
            .map(|(g, n)| format!("{g} {n}"))
            .collect::<Vec<_>>()
            .join(", ")
    };

    output::field("students", LABEL_WIDTH, &stats.count);
    output::field("average age", LABEL_WIDTH, &average(stats.average_age));
    output::field("age range", LABEL_WIDTH, &range(stats.age_range));
    output::field("average grade", LABEL_WIDTH, &average(stats.average_grade));
    output::field("grade range", LABEL_WIDTH, &range(stats.grade_range));
    output::field("genders", LABEL_WIDTH, &genders);
}

#[instrument(skip(view))]
fn _stats(view: &View<'_>) -> CliResult<()> {
    let stats = view.school.stats();
    if view.json() {
        return emit_json(&stats);
    }
    output::header("Dataset");
    output::field("colleges", LABEL_WIDTH, &stats.colleges);
    output::field("departments", LABEL_WIDTH, &stats.departments);
    output::field("classes", LABEL_WIDTH, &stats.classes);
    print_student_stats(&stats.students);
    Ok(())
}

#[instrument(skip(view))]
fn _check(view: &View<'_>) -> CliResult<()> {
    let duplicates = view.school.dataset().duplicate_ids();
    if view.json() {
        emit_json(&duplicates)?;
    } else if duplicates.is_empty() {
        output::success("no duplicate ids");
    } else {
        for dup in &duplicates {
            output::warning(&format!(
                "{} id {} appears {} times",
                dup.level, dup.id, dup.count
            ));
        }
    }
    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(CliError::DuplicateIds(duplicates.len()))
    }
}

// ============================================================
// Dataset files
// ============================================================

fn execute_dataset(command: &DatasetCommands) -> CliResult<()> {
    match command {
        DatasetCommands::Export { path, force } => _export(path, *force),
    }
}

#[instrument]
fn _export(path: &Path, force: bool) -> CliResult<()> {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    if fs.exists(path) && !force {
        return Err(CliError::Usage(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    DatasetLoader::new(fs).export_mock(path)?;
    output::action("Exported", &path.display());
    Ok(())
}

// ============================================================
// Config
// ============================================================

fn execute_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            let describe = |path: &Path| {
                let state = if path.exists() { "exists" } else { "missing" };
                format!("{} ({})", path.display(), state)
            };
            match global_config_path() {
                Some(path) => output::field("global", 7, &describe(path.as_path())),
                None => output::field("global", 7, "unavailable"),
            }
            if let Some(dir) = project_dir(cli) {
                output::field("local", 7, &describe(local_config_path(&dir).as_path()));
            }
            Ok(())
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path()
                    .ok_or_else(|| CliError::Usage("cannot determine config directory".into()))?
            } else {
                let dir = project_dir(cli)
                    .ok_or_else(|| CliError::Usage("cannot determine project directory".into()))?;
                local_config_path(&dir)
            };
            let fs = RealFileSystem;
            if fs.exists(&path) {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            fs.ensure_parent(&path)
                .and_then(|_| fs.write(&path, &Settings::template()))
                .map_err(|e| InfraError::io(format!("write config {}", path.display()), e))?;
            output::action("Created", &path.display());
            Ok(())
        }
    }
}
