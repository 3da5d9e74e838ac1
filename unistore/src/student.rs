//! The record the walkthrough stores.

use std::fmt;

use serde::{Deserialize, Serialize};
use unistore_core::record::Record;

/// Database every demo group works in.
pub const DATABASE_NAME: &str = "university";

/// A university student.
///
/// `status` is left out of the stored document entirely when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub name: String,
    pub age: i32,
    pub college: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Student {
    pub fn new(name: impl Into<String>, age: i32, college: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            age,
            college: college.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

impl Record for Student {
    fn collection_name() -> &'static str {
        "students"
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{} {} {}", self.name, self.age, self.college)?;

        if let Some(status) = &self.status {
            write!(f, " {status}")?;
        }

        write!(f, "}}")
    }
}

/// The name and college of a student, read through a projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentSummary {
    pub name: String,
    pub college: String,
}

impl Record for StudentSummary {
    fn collection_name() -> &'static str {
        Student::collection_name()
    }
}

impl fmt::Display for StudentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{} {}}}", self.name, self.college)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unistore_core::record::RecordExt;

    #[test]
    fn unset_status_is_not_stored() {
        let document = Student::new("Aarav Sharma", 21, "IIT Delhi").to_document().unwrap();

        assert_eq!(document.keys().collect::<Vec<_>>(), ["name", "age", "college"]);
    }

    #[test]
    fn set_status_is_stored() {
        let document = Student::new("Aarav Sharma", 21, "IIT Delhi")
            .with_status("active")
            .to_document()
            .unwrap();

        assert_eq!(document.get_str("status").unwrap(), "active");
    }

    #[test]
    fn display_mirrors_the_stored_fields() {
        let student = Student::new("Priya Singh", 20, "Mumbai University");

        assert_eq!(student.to_string(), "{Priya Singh 20 Mumbai University}");
        assert_eq!(student.with_status("active").to_string(), "{Priya Singh 20 Mumbai University active}");
    }
}
