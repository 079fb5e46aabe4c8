//! Declarative YAML check specification

use serde::{Deserialize, Serialize};
use std::path::Path;

use imdb_smoke_common::TestCase;

use crate::error::{E2eError, E2eResult};
use crate::selector::Selector;
use crate::session::Key;

/// A single check parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckSpec {
    /// Test case identifier written to the results sheet
    pub id: String,

    /// Human-readable description
    pub description: String,

    /// What a passing run looks like
    pub expected: String,

    /// Tags for filtering checks
    #[serde(default)]
    pub tags: Vec<String>,

    /// Steps to execute in order
    pub steps: Vec<CheckStep>,
}

/// A single step in a check
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CheckStep {
    /// Navigate to a URL; relative URLs are joined to the base URL
    Navigate { url: String },

    /// Type text into an element
    Fill { selector: Selector, value: String },

    /// Press a special key on an element
    Press { selector: Selector, key: Key },

    /// Click an element
    Click { selector: Selector },

    /// Wait for an element to be present
    Wait {
        selector: Selector,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },

    /// Wait for a fixed amount of time (use sparingly)
    Sleep { ms: u64 },

    /// Assert the page title contains a substring
    AssertTitle {
        contains: String,
        #[serde(default)]
        message: Option<String>,
    },

    /// Assert an element is present and displayed
    AssertVisible {
        selector: Selector,
        #[serde(default)]
        message: Option<String>,
    },

    /// Assert an element's text contains a substring
    AssertText {
        selector: Selector,
        contains: String,
        #[serde(default)]
        message: Option<String>,
    },

    /// Log a message (for debugging)
    Log { message: String },
}

impl CheckStep {
    /// Short label used in logs
    pub fn label(&self) -> String {
        match self {
            CheckStep::Navigate { url } => format!("navigate:{}", url),
            CheckStep::Fill { selector, .. } => format!("fill:{}", selector),
            CheckStep::Press { selector, key } => format!("press:{:?}@{}", key, selector),
            CheckStep::Click { selector } => format!("click:{}", selector),
            CheckStep::Wait { selector, .. } => format!("wait:{}", selector),
            CheckStep::Sleep { ms } => format!("sleep:{}ms", ms),
            CheckStep::AssertTitle { contains, .. } => format!("assert_title:{}", contains),
            CheckStep::AssertVisible { selector, .. } => format!("assert_visible:{}", selector),
            CheckStep::AssertText { selector, .. } => format!("assert_text:{}", selector),
            CheckStep::Log { message } => {
                format!("log:{}", message.chars().take(30).collect::<String>())
            }
        }
    }
}

/// A file may hold one check or a list of them
#[derive(Deserialize)]
#[serde(untagged)]
enum SpecDocument {
    Many(Vec<CheckSpec>),
    One(CheckSpec),
}

impl CheckSpec {
    /// The record metadata for this check
    pub fn test_case(&self) -> TestCase {
        TestCase::new(&self.id, &self.description, &self.expected)
    }

    /// Parse one check from a YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        serde_yaml::from_str(yaml).map_err(E2eError::from)
    }

    /// Parse a YAML string holding one check or a list of checks
    pub fn parse_many(yaml: &str) -> E2eResult<Vec<Self>> {
        let specs = match serde_yaml::from_str::<SpecDocument>(yaml) {
            Ok(SpecDocument::Many(specs)) => specs,
            Ok(SpecDocument::One(spec)) => vec![spec],
            Err(e) => return Err(E2eError::SpecParse(e.to_string())),
        };
        for spec in &specs {
            spec.validate()?;
        }
        Ok(specs)
    }

    /// Parse checks from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Vec<Self>> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_many(&content)
            .map_err(|e| E2eError::SpecParse(format!("{}: {}", path.display(), e)))
    }

    /// Load all checks from a directory, in path order
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut specs = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            specs.extend(Self::from_file(entry.path())?);
        }

        Ok(specs)
    }

    /// Keep the checks carrying `tag`
    pub fn filter_by_tag(specs: Vec<Self>, tag: &str) -> Vec<Self> {
        specs
            .into_iter()
            .filter(|s| s.tags.iter().any(|t| t == tag))
            .collect()
    }

    /// Keep the checks whose id is `id`
    pub fn filter_by_id(specs: Vec<Self>, id: &str) -> Vec<Self> {
        specs.into_iter().filter(|s| s.id == id).collect()
    }

    fn validate(&self) -> E2eResult<()> {
        if self.id.trim().is_empty() {
            return Err(E2eError::SpecParse("check with empty id".to_string()));
        }
        if self.steps.is_empty() {
            return Err(E2eError::SpecParse(format!("check {} has no steps", self.id)));
        }
        Ok(())
    }
}
