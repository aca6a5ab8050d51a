//! Rule sets: immutable `rule id -> level` maps handed to validators at
//! construction time.
//!
//! Each validator ships a hard-coded default set; config files may override
//! individual levels (`off|warn|error`) before the validator is built.

use super::Severity;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleLevel {
    Off,
    #[serde(alias = "warning")]
    Warn,
    Error,
}

impl RuleLevel {
    pub fn severity(&self) -> Option<Severity> {
        match self {
            RuleLevel::Off => None,
            RuleLevel::Warn => Some(Severity::Warning),
            RuleLevel::Error => Some(Severity::Error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    levels: BTreeMap<&'static str, RuleLevel>,
}

impl RuleSet {
    pub fn new(rules: &[(&'static str, RuleLevel)]) -> Self {
        Self {
            levels: rules.iter().copied().collect(),
        }
    }

    /// Severity a rule reports with, or `None` when it is disabled or unknown.
    pub fn severity(&self, rule: &str) -> Option<Severity> {
        self.levels.get(rule).and_then(|l| l.severity())
    }

    pub fn is_enabled(&self, rule: &str) -> bool {
        self.severity(rule).is_some()
    }

    /// Apply per-rule level overrides. Only ids already present in the set
    /// are accepted; the rejected ids are returned for reporting.
    pub fn with_overrides(mut self, overrides: &HashMap<String, RuleLevel>) -> (Self, Vec<String>) {
        let mut unknown = Vec::new();
        for (id, level) in overrides {
            match self.levels.get_mut(id.as_str()) {
                Some(slot) => *slot = *level,
                None => unknown.push(id.clone()),
            }
        }
        unknown.sort();
        (self, unknown)
    }
}
