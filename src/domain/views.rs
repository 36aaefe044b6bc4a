//! Flattened records.
//!
//! When a level is listed across all of its parents the ancestry is carried along,
//! so every row can still be navigated back up the hierarchy.

use serde::Serialize;

use crate::domain::{Class, College, Department, Id, Level, Student};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentView<'a> {
    pub college_id: Id,
    pub college_name: &'a str,
    pub department: &'a Department,
}

impl<'a> DepartmentView<'a> {
    pub fn new(college: &'a College, department: &'a Department) -> Self {
        Self {
            college_id: college.id,
            college_name: &college.name,
            department,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassView<'a> {
    pub college_id: Id,
    pub college_name: &'a str,
    pub department_id: Id,
    pub department_name: &'a str,
    pub class: &'a Class,
}

impl<'a> ClassView<'a> {
    pub fn new(college: &'a College, department: &'a Department, class: &'a Class) -> Self {
        Self {
            college_id: college.id,
            college_name: &college.name,
            department_id: department.id,
            department_name: &department.name,
            class,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentView<'a> {
    pub college_id: Id,
    pub college_name: &'a str,
    pub department_id: Id,
    pub department_name: &'a str,
    pub class_id: Id,
    pub class_name: &'a str,
    pub student: &'a Student,
}

impl<'a> StudentView<'a> {
    pub fn new(
        college: &'a College,
        department: &'a Department,
        class: &'a Class,
        student: &'a Student,
    ) -> Self {
        Self {
            college_id: college.id,
            college_name: &college.name,
            department_id: department.id,
            department_name: &department.name,
            class_id: class.id,
            class_name: &class.name,
            student,
        }
    }
}

impl StudentView<'_> {
    pub fn breadcrumb(&self) -> String {
        [
            self.college_name,
            self.department_name,
            self.class_name,
            self.student.name.as_str(),
        ]
        .join(" / ")
    }
}

/// A record whose name matched a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit<'a> {
    pub level: Level,
    pub id: Id,
    pub name: &'a str,
    /// Names of the ancestors, outermost first
    pub path: Vec<&'a str>,
}

impl SearchHit<'_> {
    /// Breadcrumb including the hit itself: `College / Department / Class / Student`.
    pub fn breadcrumb(&self) -> String {
        self.path
            .iter()
            .chain(std::iter::once(&self.name))
            .copied()
            .collect::<Vec<_>>()
            .join(" / ")
    }
}
