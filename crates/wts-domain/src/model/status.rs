//! Transaction status and its source-label aliases

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Completed,
    InProgress,
    Pending,
    #[default]
    Unknown,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Status::Completed => "Completed",
            Status::InProgress => "In Progress",
            Status::Pending => "Pending",
            Status::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Source labels recognized as each status
///
/// Matching is exact after trimming. Source data mixes English and
/// Traditional Chinese labels, so both are registered by default.
#[derive(Debug, Clone)]
pub struct StatusAliases {
    entries: Vec<(String, Status)>,
}

impl Default for StatusAliases {
    fn default() -> Self {
        let defaults = [
            ("Completed", Status::Completed),
            ("Complete", Status::Completed),
            ("已完成", Status::Completed),
            ("完成", Status::Completed),
            ("In Progress", Status::InProgress),
            ("進行中", Status::InProgress),
            ("處理中", Status::InProgress),
            ("Pending", Status::Pending),
            ("待處理", Status::Pending),
            ("等候中", Status::Pending),
        ];
        Self {
            entries: defaults
                .into_iter()
                .map(|(label, status)| (label.to_string(), status))
                .collect(),
        }
    }
}

impl StatusAliases {
    /// Register another label; a label already present keeps its first status
    pub fn add(&mut self, label: impl Into<String>, status: Status) {
        let label = label.into().trim().to_string();
        if label.is_empty() || self.entries.iter().any(|(l, _)| *l == label) {
            return;
        }
        self.entries.push((label, status));
    }

    /// Register a label, replacing any status it already maps to
    pub fn set(&mut self, label: impl Into<String>, status: Status) {
        let label = label.into().trim().to_string();
        if label.is_empty() {
            return;
        }
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some(entry) => entry.1 = status,
            None => self.entries.push((label, status)),
        }
    }

    pub fn with(mut self, label: impl Into<String>, status: Status) -> Self {
        self.add(label, status);
        self
    }

    pub fn recognize(&self, label: &str) -> Status {
        let label = label.trim();
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, status)| *status)
            .unwrap_or(Status::Unknown)
    }
}
