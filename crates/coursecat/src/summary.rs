use std::collections::BTreeMap;
use std::path::Path;

use crate::store::{CourseCollection, StoreError};

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentCount {
    pub department: String,
    pub courses: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermCount {
    pub term: String,
    pub courses: usize,
}

/// Aggregates over a persisted course table.
///
/// Records whose course number or terms offered is the `N/A` sentinel take
/// no part in the respective aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseSummary {
    pub total: usize,
    pub busiest_department: Option<DepartmentCount>,
    /// Descending by count, ties by term.
    pub term_counts: Vec<TermCount>,
}

impl CourseSummary {
    pub fn from_collection(collection: &CourseCollection) -> CourseSummary {
        let mut departments: BTreeMap<String, usize> = BTreeMap::new();
        let mut terms: BTreeMap<&str, usize> = BTreeMap::new();

        for record in collection.records() {
            if let Some(department) = record.department() {
                *departments.entry(department).or_default() += 1;
            }
            if let Some(term) = record.first_term() {
                *terms.entry(term).or_default() += 1;
            }
        }

        // keys iterate sorted, so the first maximum is the smallest prefix
        let busiest_department = departments
            .into_iter()
            .fold(None::<DepartmentCount>, |best, (department, courses)| match best {
                Some(b) if b.courses >= courses => Some(b),
                _ => Some(DepartmentCount {
                    department,
                    courses,
                }),
            });

        let mut term_counts: Vec<TermCount> = terms
            .into_iter()
            .map(|(term, courses)| TermCount {
                term: term.to_string(),
                courses,
            })
            .collect();
        term_counts.sort_by(|a, b| b.courses.cmp(&a.courses).then_with(|| a.term.cmp(&b.term)));

        CourseSummary {
            total: collection.len(),
            busiest_department,
            term_counts,
        }
    }

    /// Reloads the table at `path` and summarises it.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<CourseSummary, StoreError> {
        let collection = CourseCollection::read_csv(path)?;
        Ok(Self::from_collection(&collection))
    }

    pub fn count_for_term(&self, term: &str) -> usize {
        self.term_counts
            .iter()
            .find(|t| t.term == term)
            .map_or(0, |t| t.courses)
    }
}

impl std::fmt::Display for CourseSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\nSummary:")?;
        writeln!(f, "  Courses:              {}", self.total)?;
        match &self.busiest_department {
            Some(d) => writeln!(
                f,
                "  Most courses:         {} ({} courses)",
                d.department, d.courses
            )?,
            None => writeln!(f, "  Most courses:         -")?,
        }
        writeln!(f, "  Number of classes offered in each quarter:")?;
        for t in &self.term_counts {
            writeln!(f, "    {:<20} {}", t.term, t.courses)?;
        }
        Ok(())
    }
}
