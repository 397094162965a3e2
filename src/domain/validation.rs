//! Field validation helpers
//!
//! Small shared checks used by the per-entity validators.

use super::DomainError;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Require a non-blank value and return it trimmed
pub fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::invalid(format!("The field {field} is required")));
    }
    Ok(trimmed)
}

/// Check a character count against inclusive bounds
pub fn length(field: &str, value: &str, min: usize, max: usize) -> Result<(), DomainError> {
    let count = value.chars().count();
    if count < min {
        return Err(DomainError::invalid(format!(
            "The field {field} must be at least {min} characters"
        )));
    }
    if count > max {
        return Err(DomainError::invalid(format!(
            "The field {field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// Require a strictly positive identifier
pub fn positive_id(field: &str, value: i64) -> Result<i64, DomainError> {
    if value <= 0 {
        return Err(DomainError::invalid(format!("Invalid {field}")));
    }
    Ok(value)
}

/// True when every character is an ASCII digit and the length is in range
pub fn is_digits(value: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&value.len()) && value.bytes().all(|b| b.is_ascii_digit())
}

/// Loose structural email check: `local@domain.tld`, no whitespace
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => {
            !host.is_empty() && tld.len() >= 2 && !domain.starts_with('.') && !domain.contains("..")
        }
        None => false,
    }
}

/// Lower-case and trim an email, rejecting malformed ones
pub fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = required("email", email)?.to_lowercase();
    if !is_valid_email(&email) {
        return Err(DomainError::invalid("The email format is invalid"));
    }
    Ok(email)
}

/// Trim a person name, upper-case its first letter and check 2..=100 chars
pub fn normalize_person_name(field: &str, value: &str) -> Result<String, DomainError> {
    let trimmed = required(field, value)?;
    let mut chars = trimmed.chars();
    let name = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    length(field, &name, 2, 100)?;
    Ok(name)
}

pub fn validate_password(field: &str, password: &str) -> Result<(), DomainError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::invalid(format!(
            "The field {field} must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Normalized signup data
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Validate the fields of a signup request
pub fn validate_new_user(
    email: &str,
    password: &str,
    first_name: &str,
    last_name: &str,
) -> Result<NewUser, DomainError> {
    required("email", email)?;
    required("password", password)?;
    required("first_name", first_name)?;
    required("last_name", last_name)?;

    let email = normalize_email(email)?;
    validate_password("password", password)?;

    Ok(NewUser {
        email,
        first_name: normalize_person_name("first_name", first_name)?,
        last_name: normalize_person_name("last_name", last_name)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims() {
        assert_eq!(required("name", "  Ana ").unwrap(), "Ana");
        assert!(required("name", "   ").is_err());
    }

    #[test]
    fn test_length_bounds() {
        assert!(length("title", "abc", 3, 5).is_ok());
        assert!(length("title", "ab", 3, 5).is_err());
        assert!(length("title", "abcdef", 3, 5).is_err());
        // counts characters, not bytes
        assert!(length("title", "ñañ", 3, 3).is_ok());
    }

    #[test]
    fn test_email_check() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email("a@@b.com"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@b..com"));
    }

    #[test]
    fn test_person_name_normalization() {
        assert_eq!(normalize_person_name("first_name", "  maría ").unwrap(), "María");
        assert!(normalize_person_name("first_name", "x").is_err());
    }

    #[test]
    fn test_validate_new_user() {
        let user = validate_new_user(" A@B.com ", "secret1", "ana", "lopez").unwrap();
        assert_eq!(user.email, "a@b.com");
        assert_eq!(user.first_name, "Ana");
        assert_eq!(user.last_name, "Lopez");

        let err = validate_new_user("a@b.com", "123", "ana", "lopez").unwrap_err();
        assert!(err.to_string().contains("at least 6"));

        let err = validate_new_user("a@b.com", "secret1", "", "lopez").unwrap_err();
        assert_eq!(err.to_string(), "The field first_name is required");
    }

    #[test]
    fn test_digits() {
        assert!(is_digits("123", 3, 4));
        assert!(!is_digits("12a", 3, 4));
        assert!(!is_digits("12345", 3, 4));
    }
}
