//! Name screening for clubs and leagues.

use regex::Regex;
use tracing::warn;

pub trait NameFilter: Send + Sync {
    /// True when the name must be rejected.
    fn is_blocked(&self, name: &str) -> bool;
}

/// Rejects names containing any listed word as a whole word, ignoring case.
#[derive(Debug, Default)]
pub struct WordListFilter {
    pattern: Option<Regex>,
}

impl WordListFilter {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let escaped: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty())
            .map(|w| regex::escape(&w))
            .collect();
        if escaped.is_empty() {
            return Self::default();
        }

        let pattern = match Regex::new(&format!(r"(?i)\b(?:{})\b", escaped.join("|"))) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!(error = %e, "name filter word list rejected; filter disabled");
                None
            }
        };
        Self { pattern }
    }

    /// Comma separated list, as configured in the environment.
    pub fn from_csv(raw: &str) -> Self {
        Self::new(raw.split(','))
    }
}

impl NameFilter for WordListFilter {
    fn is_blocked(&self, name: &str) -> bool {
        self.pattern.as_ref().is_some_and(|re| re.is_match(name))
    }
}
