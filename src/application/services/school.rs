//! Query service over the College → Department → Class → Student hierarchy
//!
//! All lookups are linear scans in document order. Ids are not required to be
//! unique; the first match wins.

use std::sync::Arc;

use tracing::debug;

use crate::application::services::stats::{Stats, StudentStats};
use crate::application::ApplicationResult;
use crate::domain::{
    Class, ClassView, College, Dataset, Department, DepartmentView, DomainError, Id, Level,
    SearchHit, StudentView,
};

/// Options controlling `SchoolService::search`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    pub case_sensitive: bool,
    /// Levels to search; empty means none
    pub levels: Vec<Level>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            levels: Level::ALL.to_vec(),
        }
    }
}

/// Read-only query façade over a loaded dataset.
pub struct SchoolService {
    dataset: Arc<Dataset>,
}

impl SchoolService {
    /// Create a new school service.
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    // ============================================================
    // Colleges
    // ============================================================

    pub fn colleges(&self) -> &[College] {
        &self.dataset.colleges
    }

    pub fn college(&self, id: Id) -> ApplicationResult<&College> {
        debug!("college: id={}", id);
        self.dataset
            .colleges
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| DomainError::not_found(Level::College, id).into())
    }

    // ============================================================
    // Departments
    // ============================================================

    /// Every department, flattened across colleges.
    pub fn departments(&self) -> Vec<DepartmentView<'_>> {
        self.dataset
            .departments()
            .map(|(c, d)| DepartmentView::new(c, d))
            .collect()
    }

    pub fn departments_of(&self, college_id: Id) -> ApplicationResult<Vec<DepartmentView<'_>>> {
        let college = self.college(college_id)?;
        Ok(college
            .departments
            .iter()
            .map(|d| DepartmentView::new(college, d))
            .collect())
    }

    pub fn department(&self, id: Id) -> ApplicationResult<DepartmentView<'_>> {
        debug!("department: id={}", id);
        self.dataset
            .departments()
            .find(|(_, d)| d.id == id)
            .map(|(c, d)| DepartmentView::new(c, d))
            .ok_or_else(|| DomainError::not_found(Level::Department, id).into())
    }

    // ============================================================
    // Classes
    // ============================================================

    /// Every class, flattened across departments.
    pub fn classes(&self) -> Vec<ClassView<'_>> {
        self.dataset
            .classes()
            .map(|(c, d, cl)| ClassView::new(c, d, cl))
            .collect()
    }

    pub fn classes_of(&self, department_id: Id) -> ApplicationResult<Vec<ClassView<'_>>> {
        let (college, department) = self.find_department(department_id)?;
        Ok(department
            .classes
            .iter()
            .map(|cl| ClassView::new(college, department, cl))
            .collect())
    }

    pub fn class(&self, id: Id) -> ApplicationResult<ClassView<'_>> {
        debug!("class: id={}", id);
        self.find_class(id).map(|(c, d, cl)| ClassView::new(c, d, cl))
    }

    // ============================================================
    // Students
    // ============================================================

    /// Every student, flattened across classes.
    pub fn students(&self) -> Vec<StudentView<'_>> {
        self.dataset
            .students()
            .map(|(c, d, cl, s)| StudentView::new(c, d, cl, s))
            .collect()
    }

    pub fn students_of(&self, class_id: Id) -> ApplicationResult<Vec<StudentView<'_>>> {
        let (college, department, class) = self.find_class(class_id)?;
        Ok(class
            .students
            .iter()
            .map(|s| StudentView::new(college, department, class, s))
            .collect())
    }

    pub fn student(&self, id: Id) -> ApplicationResult<StudentView<'_>> {
        debug!("student: id={}", id);
        self.dataset
            .students()
            .find(|(_, _, _, s)| s.id == id)
            .map(|(c, d, cl, s)| StudentView::new(c, d, cl, s))
            .ok_or_else(|| DomainError::not_found(Level::Student, id).into())
    }

    // ============================================================
    // Search
    // ============================================================

    /// Search record names across the enabled levels.
    ///
    /// Substring match, results in document order with parents before children.
    pub fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> ApplicationResult<Vec<SearchHit<'_>>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DomainError::InvalidQuery("query must not be empty".into()).into());
        }
        debug!(
            "search: query={:?}, case_sensitive={}, levels={:?}",
            query, options.case_sensitive, options.levels
        );

        let needle = if options.case_sensitive {
            query.to_string()
        } else {
            query.to_lowercase()
        };
        let matches = |name: &str| {
            if options.case_sensitive {
                name.contains(&needle)
            } else {
                name.to_lowercase().contains(&needle)
            }
        };
        let wants = |level: Level| options.levels.contains(&level);

        let mut hits = Vec::new();
        for college in &self.dataset.colleges {
            if wants(Level::College) && matches(college.name.as_str()) {
                hits.push(hit(Level::College, college.id, &college.name, vec![]));
            }
            for department in &college.departments {
                if wants(Level::Department) && matches(department.name.as_str()) {
                    hits.push(hit(
                        Level::Department,
                        department.id,
                        &department.name,
                        vec![college.name.as_str()],
                    ));
                }
                for class in &department.classes {
                    if wants(Level::Class) && matches(class.name.as_str()) {
                        hits.push(hit(
                            Level::Class,
                            class.id,
                            &class.name,
                            vec![college.name.as_str(), department.name.as_str()],
                        ));
                    }
                    if !wants(Level::Student) {
                        continue;
                    }
                    for student in class.students.iter().filter(|s| matches(s.name.as_str())) {
                        hits.push(hit(
                            Level::Student,
                            student.id,
                            &student.name,
                            vec![
                                college.name.as_str(),
                                department.name.as_str(),
                                class.name.as_str(),
                            ],
                        ));
                    }
                }
            }
        }

        debug!("search: {} hits", hits.len());
        Ok(hits)
    }

    // ============================================================
    // Aggregation
    // ============================================================

    pub fn stats(&self) -> Stats {
        Stats {
            colleges: self.dataset.colleges.len(),
            departments: self.dataset.departments().count(),
            classes: self.dataset.classes().count(),
            students: StudentStats::from_students(self.dataset.students().map(|(_, _, _, s)| s)),
        }
    }

    pub fn class_stats(&self, class_id: Id) -> ApplicationResult<StudentStats> {
        let (_, _, class) = self.find_class(class_id)?;
        Ok(StudentStats::from_students(&class.students))
    }

    fn find_department(&self, id: Id) -> ApplicationResult<(&College, &Department)> {
        self.dataset
            .departments()
            .find(|(_, d)| d.id == id)
            .ok_or_else(|| DomainError::not_found(Level::Department, id).into())
    }

    fn find_class(&self, id: Id) -> ApplicationResult<(&College, &Department, &Class)> {
        self.dataset
            .classes()
            .find(|(_, _, cl)| cl.id == id)
            .ok_or_else(|| DomainError::not_found(Level::Class, id).into())
    }
}

fn hit<'a>(level: Level, id: Id, name: &'a str, path: Vec<&'a str>) -> SearchHit<'a> {
    SearchHit {
        level,
        id,
        name,
        path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Student;

    fn service() -> SchoolService {
        SchoolService::new(Arc::new(Dataset::mock().unwrap()))
    }

    #[test]
    fn first_match_wins_for_duplicate_ids() {
        let json = r#"{"colleges": [
            {"id": 1, "name": "First"},
            {"id": 1, "name": "Second"}
        ]}"#;
        let service = SchoolService::new(Arc::new(Dataset::from_json(json).unwrap()));

        assert_eq!(service.college(1).unwrap().name, "First");
    }

    #[test]
    fn class_view_carries_ancestry() {
        let service = service();
        let view = service.class(1003).unwrap();
        assert_eq!(view.college_id, 1);
        assert_eq!(view.department_id, 102);
        assert_eq!(view.department_name, "Electrical Engineering");
    }

    #[test]
    fn search_with_no_levels_returns_nothing() {
        let options = SearchOptions {
            case_sensitive: false,
            levels: vec![],
        };
        assert!(service().search("a", &options).unwrap().is_empty());
    }

    #[test]
    fn student_lookup_returns_record() {
        let service = service();
        let student: &Student = service.student(1).unwrap().student;
        assert_eq!(student.name, "Alice Zhang");
    }
}
