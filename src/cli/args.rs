//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::config::OutputFormat;
use crate::domain::{Id, Level};

/// Read-only viewer for a College / Department / Class / Student hierarchy
#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project directory holding .roster.toml (default: cwd)
    #[arg(short = 'C', long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// JSON dataset to load instead of the built-in mock data
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub dataset: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List colleges
    Colleges,

    /// Show one college and its departments
    College {
        /// College id
        id: Id,
    },

    /// List departments (all, or of one college)
    Departments {
        /// Only departments of this college
        #[arg(long)]
        college: Option<Id>,
    },

    /// Show one department and its classes
    Department {
        /// Department id
        id: Id,
    },

    /// List classes (all, or of one department)
    Classes {
        /// Only classes of this department
        #[arg(long)]
        department: Option<Id>,
    },

    /// Show one class, its students and aggregates
    Class {
        /// Class id
        id: Id,
    },

    /// List students (all, or of one class)
    Students {
        /// Only students of this class
        #[arg(long)]
        class: Option<Id>,
    },

    /// Show one student
    Student {
        /// Student id
        id: Id,
    },

    /// Search names across the hierarchy
    Search {
        /// Substring to look for
        query: String,
        /// Restrict to level (repeatable; default from config)
        #[arg(short, long = "level", value_parser = parse_level)]
        levels: Vec<Level>,
        /// Match case-sensitively (overrides config)
        #[arg(long, conflicts_with = "ignore_case")]
        case_sensitive: bool,
        /// Match ignoring case (overrides config)
        #[arg(short = 'i', long)]
        ignore_case: bool,
    },

    /// Show the whole hierarchy as tree
    Tree,

    /// Show dataset aggregates
    Stats,

    /// Report duplicate ids
    Check,

    /// Work with dataset files
    Dataset {
        #[command(subcommand)]
        command: DatasetCommands,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum DatasetCommands {
    /// Write the built-in mock dataset as JSON
    Export {
        /// Target file
        #[arg(value_hint = ValueHint::FilePath)]
        path: PathBuf,
        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },
}

impl Commands {
    /// Case sensitivity requested on the command line, if any.
    pub fn case_override(case_sensitive: bool, ignore_case: bool) -> Option<bool> {
        match (case_sensitive, ignore_case) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

fn parse_level(s: &str) -> Result<Level, String> {
    Level::parse(s).ok_or_else(|| {
        format!("unknown level '{s}' (expected college, department, class or student)")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    // https://docs.rs/clap/latest/clap/_derive/_tutorial/index.html#testing
    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn search_accepts_repeated_levels() {
        let cli = Cli::try_parse_from([
            "roster", "search", "zhang", "--level", "student", "-l", "college",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Search { levels, .. }) => {
                assert_eq!(levels, vec![Level::Student, Level::College])
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn case_flags_conflict() {
        let result = Cli::try_parse_from([
            "roster",
            "search",
            "x",
            "--case-sensitive",
            "--ignore-case",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn case_override_from_flags() {
        assert_eq!(Commands::case_override(true, false), Some(true));
        assert_eq!(Commands::case_override(false, true), Some(false));
        assert_eq!(Commands::case_override(false, false), None);
    }

    #[test]
    fn unknown_level_is_rejected() {
        assert!(Cli::try_parse_from(["roster", "search", "x", "--level", "school"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["roster", "colleges", "-f", "json", "-dd"]).unwrap();
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert_eq!(cli.debug, 2);
    }
}
