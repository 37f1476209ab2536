use serde::{Deserialize, Serialize};

/// Placeholder stored in any field whose value was not found on the page.
pub const NOT_AVAILABLE: &str = "N/A";

/// One course entry as it appears in a department's catalog page.
///
/// The serde names double as the column headers of the persisted table, and
/// the field order is the column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecord {
    #[serde(rename = "Course Number")]
    pub course_number: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Instructor")]
    pub instructor: String,
    #[serde(rename = "Terms Offered")]
    pub terms_offered: String,
    #[serde(rename = "Equivalent Courses")]
    pub equivalent_courses: String,
    #[serde(rename = "Prerequisite")]
    pub prerequisite: String,
}

impl CourseRecord {
    /// First four characters of the course number, e.g. `ECON` for `ECON 101`.
    ///
    /// `None` when the course number is the sentinel.
    pub fn department(&self) -> Option<String> {
        (self.course_number != NOT_AVAILABLE)
            .then(|| self.course_number.chars().take(4).collect())
    }

    /// First whitespace-delimited token of the terms offered.
    pub fn first_term(&self) -> Option<&str> {
        if self.terms_offered == NOT_AVAILABLE {
            return None;
        }
        self.terms_offered.split_whitespace().next()
    }
}
