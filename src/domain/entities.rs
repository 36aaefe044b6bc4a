//! Domain entities: core data structures
//!
//! The hierarchy is College → Department → Class → Student. Containment is the
//! only relationship; there are no cross-references.

use std::fmt;

use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};

/// Record identifier. Unique within its level by convention only.
pub type Id = u32;

/// Highest valid `Student::grade`.
pub const MAX_GRADE: u8 = 100;

/// Leaf record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Id,
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    /// Score in `0..=MAX_GRADE`
    #[serde(deserialize_with = "deserialize_grade")]
    pub grade: u8,
}

fn deserialize_grade<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let grade = u8::deserialize(deserializer)?;
    if grade > MAX_GRADE {
        return Err(de::Error::invalid_value(
            Unexpected::Unsigned(u64::from(grade)),
            &"a grade between 0 and 100",
        ));
    }
    Ok(grade)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub students: Vec<Student>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub classes: Vec<Class>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct College {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub departments: Vec<Department>,
}

/// Student gender. Unknown values deserialize to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[serde(other)]
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        };
        f.write_str(s)
    }
}

/// One level of the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    College,
    Department,
    Class,
    Student,
}

impl Level {
    pub const ALL: [Level; 4] = [
        Level::College,
        Level::Department,
        Level::Class,
        Level::Student,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::College => "college",
            Level::Department => "department",
            Level::Class => "class",
            Level::Student => "student",
        }
    }

    /// Parse a level name as used in config files (`"college"`, `"student"`, ...).
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
