//! Accept/reject filter over full path strings.

use log::debug;
use regex::Regex;

use crate::error::{IndexError, PatternKind};

/// Compiled accept and reject patterns. A path is admitted iff the accept list is empty or at
/// least one accept pattern matches, and no reject pattern matches.
#[derive(Clone, Debug, Default)]
pub struct PathFilter {
    accept: Vec<Regex>,
    reject: Vec<Regex>,
}

fn compile(patterns: &[String], kind: PatternKind) -> Result<Vec<Regex>, IndexError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| IndexError::Pattern {
                kind,
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

impl PathFilter {
    /// Compile both lists. The first invalid pattern fails the whole filter.
    pub fn new(accept: &[String], reject: &[String]) -> Result<Self, IndexError> {
        Ok(Self {
            accept: compile(accept, PatternKind::Accept)?,
            reject: compile(reject, PatternKind::Reject)?,
        })
    }

    /// True when no pattern is configured (every path is admitted).
    pub fn is_empty(&self) -> bool {
        self.accept.is_empty() && self.reject.is_empty()
    }

    pub fn admits(&self, path: &str) -> bool {
        if let Some(re) = self.reject.iter().find(|re| re.is_match(path)) {
            debug!("{} skipped: matches reject filter {}", path, re.as_str());
            return false;
        }
        if !self.accept.is_empty() && !self.accept.iter().any(|re| re.is_match(path)) {
            debug!("{} skipped: matches no accept filter", path);
            return false;
        }
        true
    }
}
