//! Field-level validation collector
//!
//! Request validation reports every bad field at once rather than stopping at
//! the first one. Domain crates wrap [`Violations`] in their own error enum and
//! hand it to [`AppError::with_violations`] when rendering.

use std::fmt;

use super::app_error::AppError;

/// Field/message pairs gathered while validating one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations(Vec<(&'static str, String)>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a single violation
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut v = Self::new();
        v.add(field, message);
        v
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push((field, message.into()));
    }

    /// Record the error of `result` under `field`, returning the value on success.
    pub fn check<T, E: fmt::Display>(
        &mut self,
        field: &'static str,
        result: Result<T, E>,
    ) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.add(field, e.to_string());
                None
            }
        }
    }

    /// Record "required" when `value` is missing.
    pub fn require<T>(&mut self, field: &'static str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.add(field, "This field is required");
        }
        value
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|(f, _)| *f == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for Violations {}

impl AppError {
    /// Attach every violation as a field message
    pub fn with_violations(self, violations: &Violations) -> Self {
        violations
            .iter()
            .fold(self, |err, (field, message)| err.with_field(field, message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_all() {
        let mut v = Violations::new();
        let name: Option<u8> = v.check("name", "x".parse::<u8>());
        let year = v.require::<i32>("year", None);
        assert!(name.is_none());
        assert!(year.is_none());
        assert!(v.contains("name"));
        assert!(v.contains("year"));
        assert!(v.into_result().is_err());
    }

    #[test]
    fn test_empty_is_ok() {
        let mut v = Violations::new();
        assert_eq!(v.check("score", Ok::<_, String>(5)), Some(5));
        assert!(v.into_result().is_ok());
    }

    #[test]
    fn test_display_and_app_error() {
        let v = Violations::single("score", "Ensure this value is between 1 and 10");
        assert_eq!(v.to_string(), "score: Ensure this value is between 1 and 10");

        let err = AppError::bad_request("Invalid review").with_violations(&v);
        assert_eq!(err.field_map()["score"].len(), 1);
    }
}
