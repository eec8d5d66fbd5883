use std::str::FromStr;

use crate::domain::DomainError;

pub const ALL_TARGETS: &str = "all";

/// Which backends a query goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Targets {
    All,
    /// Ordered, without duplicates.
    Named(Vec<String>),
}

impl Targets {
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for name in names.into_iter().map(Into::into) {
            if !unique.contains(&name) {
                unique.push(name);
            }
        }
        Targets::Named(unique)
    }

    pub fn single(name: impl Into<String>) -> Self {
        Targets::Named(vec![name.into()])
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Targets::All)
    }
}

impl FromStr for Targets {
    type Err = DomainError;

    /// `"all"` or a comma separated list of backend names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(ALL_TARGETS) {
            return Ok(Targets::All);
        }

        let names: Vec<&str> = trimmed
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .collect();

        if names.is_empty() {
            return Err(DomainError::invalid_input("target must name at least one backend"));
        }

        Ok(Targets::named(names))
    }
}
