//! Free-form profile fields (first name, last name, bio).

/// Maximum length of first and last name
pub const PERSON_NAME_MAX_LENGTH: usize = 150;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Ensure this field has no more than {max} characters")]
pub struct PersonNameTooLong {
    pub max: usize,
}

/// Validate a first or last name. Empty means "not set".
pub fn person_name(value: &str) -> Result<String, PersonNameTooLong> {
    if value.chars().count() > PERSON_NAME_MAX_LENGTH {
        return Err(PersonNameTooLong {
            max: PERSON_NAME_MAX_LENGTH,
        });
    }
    Ok(value.to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_name_limits() {
        assert_eq!(person_name("").unwrap(), "");
        assert!(person_name(&"x".repeat(PERSON_NAME_MAX_LENGTH)).is_ok());
        assert!(person_name(&"x".repeat(PERSON_NAME_MAX_LENGTH + 1)).is_err());
    }
}
