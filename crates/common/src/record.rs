//! Test case records
//!
//! A [`TestCase`] is declared before a check runs. Once the check's governing
//! assertion has produced an [`Outcome`], the case is concluded into a
//! [`TestCaseRecord`], which is the row persisted in the results sheet.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column headers of the results sheet, in file order
pub const COLUMNS: [&str; 5] = [
    "Test Case ID",
    "Description",
    "Expected Result",
    "Actual Result",
    "Status",
];

/// Pass/fail status of a concluded check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Pass,
    Fail,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pass => "Pass",
            Status::Fail => "Fail",
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Status::Pass)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a check's governing assertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The assertion held; `observed` describes what was seen
    Pass { observed: String },
    /// The assertion failed or an interaction raised; `reason` is the message text
    Fail { reason: String },
}

impl Outcome {
    pub fn pass(observed: impl Into<String>) -> Self {
        Outcome::Pass { observed: observed.into() }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Outcome::Fail { reason: reason.into() }
    }

    pub fn status(&self) -> Status {
        match self {
            Outcome::Pass { .. } => Status::Pass,
            Outcome::Fail { .. } => Status::Fail,
        }
    }

    /// Text written to the "Actual Result" column
    pub fn actual(&self) -> &str {
        match self {
            Outcome::Pass { observed } => observed,
            Outcome::Fail { reason } => reason,
        }
    }
}

/// A declared check that has not produced an outcome yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub description: String,
    pub expected: String,
}

impl TestCase {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            expected: expected.into(),
        }
    }

    /// Build the persisted row for this case from its outcome
    pub fn conclude(&self, outcome: &Outcome) -> TestCaseRecord {
        TestCaseRecord {
            id: self.id.clone(),
            description: self.description.clone(),
            expected: self.expected.clone(),
            actual: outcome.actual().to_string(),
            status: outcome.status(),
        }
    }
}

/// One row of the results sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseRecord {
    #[serde(rename = "Test Case ID")]
    pub id: String,

    #[serde(rename = "Description")]
    pub description: String,

    #[serde(rename = "Expected Result")]
    pub expected: String,

    #[serde(rename = "Actual Result")]
    pub actual: String,

    #[serde(rename = "Status")]
    pub status: Status,
}

impl TestCaseRecord {
    /// Field values in column order
    pub fn fields(&self) -> [&str; 5] {
        [
            &self.id,
            &self.description,
            &self.expected,
            &self.actual,
            self.status.as_str(),
        ]
    }
}
