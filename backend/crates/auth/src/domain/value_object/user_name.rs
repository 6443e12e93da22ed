//! User Name Value Object
//!
//! ユーザー名はアカウントの公開識別子（ハンドル）。
//! `/users/{username}` の検索キーであり、レビューやコメントの `author` として表示される。
//!
//! ## 不変条件
//! - 空でないこと、最大 150 文字
//! - 使用できる文字は ASCII 英数字と `_ . @ + -` のみ
//! - `me` は大文字小文字を問わず予約済み（`/users/me` と衝突するため）
//! - 大文字小文字は区別して保存・比較する
//! - 作成後は変更不可

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Constants
// ============================================================================

/// Maximum length for user name (in characters)
pub const USER_NAME_MAX_LENGTH: usize = 150;

/// Allowed special characters in user name
const ALLOWED_SPECIAL_CHARS: &[char] = &['_', '.', '@', '+', '-'];

/// Names that collide with fixed routes
const RESERVED_NAMES: &[&str] = &["me"];

// ============================================================================
// Error Types
// ============================================================================

/// Error returned when user name validation fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserNameError {
    /// User name is empty
    Empty,

    /// User name is too long (maximum: USER_NAME_MAX_LENGTH)
    TooLong { length: usize, max: usize },

    /// User name contains invalid character
    InvalidCharacter { char: char, position: usize },

    /// User name is a reserved word
    Reserved { word: String },
}

impl fmt::Display for UserNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "This field may not be blank"),
            Self::TooLong { length, max } => {
                write!(f, "User name is too long ({length} chars, maximum {max})")
            }
            Self::InvalidCharacter { char, position } => {
                write!(
                    f,
                    "Invalid character '{char}' at position {position}. Only letters, digits and @ . + - _ are allowed"
                )
            }
            Self::Reserved { word } => {
                write!(f, "The user name \"{word}\" is reserved")
            }
        }
    }
}

impl std::error::Error for UserNameError {}

// ============================================================================
// UserName Value Object
// ============================================================================

/// Validated user name
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserName(String);

impl UserName {
    /// Validate raw input. Input is taken verbatim: no trimming, no case folding.
    pub fn new(input: impl AsRef<str>) -> Result<Self, UserNameError> {
        let input = input.as_ref();
        Self::validate(input)?;
        Ok(Self(input.to_string()))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }

    fn validate(input: &str) -> Result<(), UserNameError> {
        if input.is_empty() {
            return Err(UserNameError::Empty);
        }

        let length = input.chars().count();
        if length > USER_NAME_MAX_LENGTH {
            return Err(UserNameError::TooLong {
                length,
                max: USER_NAME_MAX_LENGTH,
            });
        }

        if let Some(word) = RESERVED_NAMES
            .iter()
            .find(|word| input.eq_ignore_ascii_case(word))
        {
            return Err(UserNameError::Reserved {
                word: word.to_string(),
            });
        }

        for (position, ch) in input.chars().enumerate() {
            if !Self::is_valid_char(ch) {
                return Err(UserNameError::InvalidCharacter { char: ch, position });
            }
        }

        Ok(())
    }

    #[inline]
    fn is_valid_char(ch: char) -> bool {
        ch.is_ascii_alphanumeric() || ALLOWED_SPECIAL_CHARS.contains(&ch)
    }
}

impl TryFrom<String> for UserName {
    type Error = UserNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserName> for String {
    fn from(value: UserName) -> Self {
        value.0
    }
}

impl fmt::Debug for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserName({})", self.0)
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod valid_names {
        use super::*;

        #[test]
        fn test_plain_and_symbols() {
            for name in ["alice", "Alice_01", "john.doe", "a+b", "mail@host", "x-y", "_"] {
                assert!(UserName::new(name).is_ok(), "{name} should be valid");
            }
        }

        #[test]
        fn test_case_preserved() {
            let name = UserName::new("CamelCase").unwrap();
            assert_eq!(name.as_str(), "CamelCase");
        }

        #[test]
        fn test_max_length_boundary() {
            assert!(UserName::new("a".repeat(USER_NAME_MAX_LENGTH)).is_ok());
        }

        #[test]
        fn test_names_containing_me_are_fine() {
            assert!(UserName::new("meme").is_ok());
            assert!(UserName::new("me_too").is_ok());
        }
    }

    mod invalid_names {
        use super::*;

        #[test]
        fn test_empty() {
            assert_eq!(UserName::new(""), Err(UserNameError::Empty));
        }

        #[test]
        fn test_too_long() {
            assert!(matches!(
                UserName::new("a".repeat(USER_NAME_MAX_LENGTH + 1)),
                Err(UserNameError::TooLong { length: 151, .. })
            ));
        }

        #[test]
        fn test_reserved_me_any_case() {
            for name in ["me", "ME", "Me", "mE"] {
                assert!(matches!(
                    UserName::new(name),
                    Err(UserNameError::Reserved { .. })
                ));
            }
        }

        #[test]
        fn test_space_and_bang() {
            assert_eq!(
                UserName::new("bad name!"),
                Err(UserNameError::InvalidCharacter {
                    char: ' ',
                    position: 3
                })
            );
        }

        #[test]
        fn test_non_ascii_letters() {
            assert!(UserName::new("ユーザー").is_err());
            assert!(UserName::new("café").is_err());
        }
    }

    #[test]
    fn test_serde_validates() {
        let ok: Result<UserName, _> = serde_json::from_str("\"reader\"");
        assert!(ok.is_ok());
        let bad: Result<UserName, _> = serde_json::from_str("\"me\"");
        assert!(bad.is_err());
    }
}
