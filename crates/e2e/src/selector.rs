//! Element selectors
//!
//! Selectors are written as `strategy=value`, e.g. `id=suggestion-search` or
//! `xpath=//footer//a`. A bare value starting with `/` or `(` is XPath, any
//! other bare value is CSS.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::E2eError;

/// Element lookup strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Id,
    Name,
    XPath,
    Css,
    LinkText,
    ClassName,
    Tag,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Id => "id",
            Strategy::Name => "name",
            Strategy::XPath => "xpath",
            Strategy::Css => "css",
            Strategy::LinkText => "link_text",
            Strategy::ClassName => "class_name",
            Strategy::Tag => "tag",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "id" => Some(Strategy::Id),
            "name" => Some(Strategy::Name),
            "xpath" => Some(Strategy::XPath),
            "css" => Some(Strategy::Css),
            "link_text" | "link" => Some(Strategy::LinkText),
            "class_name" | "class" => Some(Strategy::ClassName),
            "tag" => Some(Strategy::Tag),
            _ => None,
        }
    }
}

/// A strategy plus the value to look up
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Selector {
    pub strategy: Strategy,
    pub value: String,
}

impl Selector {
    pub fn new(strategy: Strategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    pub fn id(value: impl Into<String>) -> Self {
        Self::new(Strategy::Id, value)
    }

    pub fn name(value: impl Into<String>) -> Self {
        Self::new(Strategy::Name, value)
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(Strategy::XPath, value)
    }

    pub fn css(value: impl Into<String>) -> Self {
        Self::new(Strategy::Css, value)
    }
}

impl FromStr for Selector {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(E2eError::InvalidSelector(s.to_string()));
        }

        if let Some((prefix, value)) = s.split_once('=') {
            if let Some(strategy) = Strategy::from_prefix(prefix.trim()) {
                let value = value.trim();
                if value.is_empty() {
                    return Err(E2eError::InvalidSelector(s.to_string()));
                }
                return Ok(Selector::new(strategy, value));
            }
        }

        if s.starts_with('/') || s.starts_with('(') {
            Ok(Selector::xpath(s))
        } else {
            Ok(Selector::css(s))
        }
    }
}

impl TryFrom<String> for Selector {
    type Error = E2eError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        selector.to_string()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy.as_str(), self.value)
    }
}
