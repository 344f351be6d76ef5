use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// Field-level validation failures keyed by field path (`name`, `seo.title`, `faqs.0.answer`).
///
/// Only the first failure per path is kept. Iteration order is by path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Error)]
#[serde(transparent)]
#[error("validation failed: {}", join_messages(.0))]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self { Self::default() }

    /// Build from a single failure.
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errs = Self::new();
        errs.insert(path, message);
        errs
    }

    pub fn insert(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.entry(path.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool { self.0.contains_key(path) }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn len(&self) -> usize { self.0.len() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_map(self) -> BTreeMap<String, String> { self.0 }

    /// `Ok(value)` when nothing was recorded, otherwise `Err(self)`.
    pub fn finish<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

fn join_messages(errors: &BTreeMap<String, String>) -> String {
    errors.iter().map(|(path, msg)| format!("{path}: {msg}")).collect::<Vec<_>>().join("; ")
}
