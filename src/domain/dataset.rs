//! The in-memory hierarchy and how it is built.
//!
//! A `Dataset` is constructed once, either from the embedded mock literal or from
//! a JSON file of the same shape, and is never mutated afterwards.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::{Class, College, Department, Id, Level, Student};

/// Embedded mock data, compiled into the binary.
const MOCK_DATASET: &str = include_str!("../../resources/mock.json");

/// Root of the hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub colleges: Vec<College>,
}

/// An id that appears more than once within one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateId {
    pub level: Level,
    pub id: Id,
    pub count: usize,
}

impl Dataset {
    /// Build a dataset from JSON text (`{"colleges": [...]}`).
    ///
    /// The JSON is copied structurally into the typed tree. Any shape or type
    /// mismatch is reported as `InvalidDataset` with line/column from serde.
    pub fn from_json(content: &str) -> Result<Self, DomainError> {
        serde_json::from_str(content).map_err(|e| DomainError::InvalidDataset {
            message: format!("line {}, column {}: {}", e.line(), e.column(), e),
            source: Some(e),
        })
    }

    /// The built-in mock dataset.
    pub fn mock() -> Result<Self, DomainError> {
        Self::from_json(MOCK_DATASET)
    }

    /// Raw JSON of the built-in mock dataset.
    pub fn mock_source() -> &'static str {
        MOCK_DATASET
    }

    pub fn departments(&self) -> impl Iterator<Item = (&College, &Department)> {
        self.colleges
            .iter()
            .flat_map(|c| c.departments.iter().map(move |d| (c, d)))
    }

    pub fn classes(&self) -> impl Iterator<Item = (&College, &Department, &Class)> {
        self.departments()
            .flat_map(|(c, d)| d.classes.iter().map(move |cl| (c, d, cl)))
    }

    pub fn students(&self) -> impl Iterator<Item = (&College, &Department, &Class, &Student)> {
        self.classes()
            .flat_map(|(c, d, cl)| cl.students.iter().map(move |s| (c, d, cl, s)))
    }

    /// Report ids occurring more than once per level.
    ///
    /// Uniqueness is never enforced; this is a diagnostic only.
    pub fn duplicate_ids(&self) -> Vec<DuplicateId> {
        let per_level: [(Level, Vec<Id>); 4] = [
            (Level::College, self.colleges.iter().map(|c| c.id).collect()),
            (
                Level::Department,
                self.departments().map(|(_, d)| d.id).collect(),
            ),
            (Level::Class, self.classes().map(|(_, _, c)| c.id).collect()),
            (
                Level::Student,
                self.students().map(|(_, _, _, s)| s.id).collect(),
            ),
        ];

        per_level
            .into_iter()
            .flat_map(|(level, ids)| {
                ids.into_iter()
                    .counts()
                    .into_iter()
                    .filter(|(_, count)| *count > 1)
                    .map(move |(id, count)| DuplicateId { level, id, count })
            })
            .sorted_by_key(|dup| (dup.level, dup.id))
            .collect()
    }
}
