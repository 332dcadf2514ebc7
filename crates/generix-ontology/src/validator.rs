//! Value validators referenced by term validator keys
//!
//! Terms carry only a key. The registry that resolves keys to validators is
//! owned by the caller and handed to the service at construction time.

use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Key of the built-in amino-acid sequence validator
pub const PROTEIN_SEQUENCE: &str = "protein_sequence";

const PROTEIN_SEQUENCE_PATTERN: &str = "(?i)^[ACDEFGHIKLMNPQRSTVWY]+$";

pub trait Validator: Send + Sync {
    fn validate(&self, value: &str) -> bool;
}

impl<F> Validator for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn validate(&self, value: &str) -> bool {
        self(value)
    }
}

/// Accepts values matching a regular expression
#[derive(Debug, Clone)]
pub struct RegexValidator {
    pattern: Regex,
}

impl RegexValidator {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Validator for RegexValidator {
    fn validate(&self, value: &str) -> bool {
        self.pattern.is_match(value)
    }
}

#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    validators: HashMap<String, Arc<dyn Validator>>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the validators Generix ships with
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        if let Ok(protein) = RegexValidator::new(PROTEIN_SEQUENCE_PATTERN) {
            registry.register(PROTEIN_SEQUENCE, protein);
        }
        registry
    }

    /// Add or replace the validator stored under `key`
    pub fn register(
        &mut self,
        key: impl Into<String>,
        validator: impl Validator + 'static,
    ) -> &mut Self {
        self.validators.insert(key.into(), Arc::new(validator));
        self
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn Validator>> {
        self.validators.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.validators.contains_key(key)
    }

    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.validators.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Run the validator named by `key` against `value`.
    ///
    /// Missing and unregistered keys accept everything.
    pub fn validate(&self, key: Option<&str>, value: &str) -> bool {
        match key.and_then(|key| self.validators.get(key)) {
            Some(validator) => validator.validate(value),
            None => true,
        }
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}
