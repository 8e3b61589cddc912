use derive_more::{AsRef, Display};

#[derive(AsRef, Debug, Display, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Name(String);

impl Name {
    pub fn new(name: &str) -> Result<Self, NameError> {
        let trimmed_name = name.trim();

        if trimmed_name.is_empty() {
            return Err(NameError::Empty);
        }

        let len = trimmed_name.chars().count();

        if len > 64 {
            return Err(NameError::TooLong(len));
        }

        Ok(Name(trimmed_name.to_string()))
    }

    /// Key used whenever names are compared across workouts and sessions.
    ///
    /// Comparison is case-insensitive: "Squat", "squat" and "SQUAT" refer to
    /// the same exercise.
    #[must_use]
    pub fn key(&self) -> NameKey {
        NameKey::from(self.0.as_str())
    }
}

/// Normalized, case-insensitive form of an exercise or workout name.
#[derive(Debug, Display, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NameKey(String);

impl From<&str> for NameKey {
    fn from(value: &str) -> Self {
        Self(value.trim().to_lowercase())
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum NameError {
    #[error("Name must not be empty")]
    Empty,
    #[error("Name must be 64 characters or fewer ({0} > 64)")]
    TooLong(usize),
}
