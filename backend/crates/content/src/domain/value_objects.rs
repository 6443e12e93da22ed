//! Domain Value Objects
//!
//! Validated scalars shared by categories, genres, titles, reviews and
//! comments. Every constructor rejects bad input with a [`ValueError`] whose
//! message is shown to the client as a field error.

use std::fmt;

use serde::Serialize;

pub const NAME_MAX_LENGTH: usize = 256;
pub const SLUG_MAX_LENGTH: usize = 50;
pub const SCORE_MIN: i64 = 1;
pub const SCORE_MAX: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    #[error("This field may not be blank")]
    Blank,
    #[error("Ensure this field has no more than {max} characters")]
    TooLong { max: usize },
    #[error("Enter a valid slug consisting of letters, numbers, underscores or hyphens")]
    InvalidSlug,
    #[error("Year cannot be later than {current}")]
    FutureYear { current: i32 },
    #[error("Ensure this value is between 1 and 10")]
    ScoreOutOfRange,
}

/// Display name of a category, genre or title
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Name(String);

impl Name {
    pub fn new(value: impl AsRef<str>) -> Result<Self, ValueError> {
        let value = value.as_ref().trim();
        if value.is_empty() {
            return Err(ValueError::Blank);
        }
        if value.chars().count() > NAME_MAX_LENGTH {
            return Err(ValueError::TooLong {
                max: NAME_MAX_LENGTH,
            });
        }
        Ok(Self(value.to_string()))
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// URL-safe unique key of a category or genre: `^[-a-zA-Z0-9_]+$`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    pub fn new(value: impl AsRef<str>) -> Result<Self, ValueError> {
        let value = value.as_ref();
        if value.is_empty() {
            return Err(ValueError::Blank);
        }
        if value.chars().count() > SLUG_MAX_LENGTH {
            return Err(ValueError::TooLong {
                max: SLUG_MAX_LENGTH,
            });
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValueError::InvalidSlug);
        }
        Ok(Self(value.to_string()))
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Release year; never later than the current year
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Year(i32);

impl Year {
    pub fn new(value: i32, current: i32) -> Result<Self, ValueError> {
        if value > current {
            return Err(ValueError::FutureYear { current });
        }
        Ok(Self(value))
    }

    pub fn from_db(value: i32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

/// Review score, `1..=10`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
    pub fn new(value: i64) -> Result<Self, ValueError> {
        if !(SCORE_MIN..=SCORE_MAX).contains(&value) {
            return Err(ValueError::ScoreOutOfRange);
        }
        Ok(Self(value as u8))
    }

    pub fn from_db(value: i16) -> Self {
        Self(value.clamp(SCORE_MIN as i16, SCORE_MAX as i16) as u8)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

/// Body of a review or comment; may not be blank
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Text(String);

impl Text {
    pub fn new(value: impl Into<String>) -> Result<Self, ValueError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValueError::Blank);
        }
        Ok(Self(value))
    }

    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name() {
        assert_eq!(Name::new("  Film  ").unwrap().as_str(), "Film");
        assert_eq!(Name::new("   "), Err(ValueError::Blank));
        assert!(Name::new("x".repeat(NAME_MAX_LENGTH)).is_ok());
        assert_eq!(
            Name::new("x".repeat(NAME_MAX_LENGTH + 1)),
            Err(ValueError::TooLong {
                max: NAME_MAX_LENGTH
            })
        );
    }

    #[test]
    fn test_slug() {
        assert!(Slug::new("sci-fi_2").is_ok());
        assert_eq!(Slug::new(""), Err(ValueError::Blank));
        assert_eq!(Slug::new("sci fi"), Err(ValueError::InvalidSlug));
        assert_eq!(Slug::new("фильм"), Err(ValueError::InvalidSlug));
        assert_eq!(
            Slug::new("a".repeat(SLUG_MAX_LENGTH + 1)),
            Err(ValueError::TooLong {
                max: SLUG_MAX_LENGTH
            })
        );
    }

    #[test]
    fn test_year_not_in_future() {
        assert!(Year::new(2024, 2024).is_ok());
        assert!(Year::new(1895, 2024).is_ok());
        assert_eq!(
            Year::new(2025, 2024),
            Err(ValueError::FutureYear { current: 2024 })
        );
    }

    #[test]
    fn test_score_bounds() {
        assert!(Score::new(1).is_ok());
        assert!(Score::new(10).is_ok());
        assert_eq!(Score::new(0), Err(ValueError::ScoreOutOfRange));
        assert_eq!(Score::new(11), Err(ValueError::ScoreOutOfRange));
        assert_eq!(Score::new(-3), Err(ValueError::ScoreOutOfRange));
    }

    #[test]
    fn test_text_not_blank() {
        assert!(Text::new("Great").is_ok());
        assert_eq!(Text::new(" \n\t"), Err(ValueError::Blank));
    }
}
