//! Payment card validation
//!
//! Normalizes the raw fields of a card submission before it is stored.

use super::validation::{is_digits, positive_id};
use super::DomainError;

/// Validated card fields ready for the upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDetails {
    pub user_id: i64,
    pub card_number: String,
    pub expiry: String,
    pub cvc: String,
    pub holder_name: String,
}

impl CardDetails {
    /// Validate and normalize every field.
    ///
    /// The first invalid field wins, in submission order.
    pub fn parse(
        user_id: i64,
        card_number: &str,
        expiry: &str,
        cvc: &str,
        holder_name: &str,
    ) -> Result<Self, DomainError> {
        let user_id = positive_id("user id", user_id)?;

        Ok(Self {
            user_id,
            card_number: normalize_card_number(card_number)?,
            expiry: validate_expiry(expiry)?,
            cvc: validate_cvc(cvc)?,
            holder_name: normalize_holder_name(holder_name)?,
        })
    }
}

/// Strip every whitespace character, then require 13 to 19 digits
pub fn normalize_card_number(raw: &str) -> Result<String, DomainError> {
    let digits: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if !is_digits(&digits, 13, 19) {
        return Err(DomainError::invalid("Invalid card number"));
    }
    Ok(digits)
}

/// `MM/YY` with a month between 01 and 12
pub fn validate_expiry(raw: &str) -> Result<String, DomainError> {
    let expiry = raw.trim();
    let invalid = || DomainError::invalid("Invalid expiry date format (MM/YY)");

    let (month, year) = expiry.split_once('/').ok_or_else(invalid)?;
    if !is_digits(month, 2, 2) || !is_digits(year, 2, 2) {
        return Err(invalid());
    }
    let month: u8 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok(expiry.to_string())
}

pub fn validate_cvc(raw: &str) -> Result<String, DomainError> {
    let cvc = raw.trim();
    if !is_digits(cvc, 3, 4) {
        return Err(DomainError::invalid("Invalid CVC"));
    }
    Ok(cvc.to_string())
}

/// Trim and upper-case; at least 3 characters
pub fn normalize_holder_name(raw: &str) -> Result<String, DomainError> {
    let name = raw.trim().to_uppercase();
    if name.chars().count() < 3 {
        return Err(DomainError::invalid(
            "The name on the card must be at least 3 characters",
        ));
    }
    Ok(name)
}

/// Replace all but the last four digits with `*`
pub fn mask_card_number(number: &str) -> String {
    let len = number.chars().count();
    if len < 4 {
        return number.to_string();
    }
    let visible: String = number.chars().skip(len - 4).collect();
    format!("{}{}", "*".repeat(len - 4), visible)
}

pub fn last_four(number: &str) -> String {
    let len = number.chars().count();
    number.chars().skip(len.saturating_sub(4)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_number_accepted() {
        assert_eq!(
            normalize_card_number("4111111111111111").unwrap(),
            "4111111111111111"
        );
    }

    #[test]
    fn test_card_number_with_spaces_accepted() {
        assert_eq!(
            normalize_card_number("4111 1111 1111 1111").unwrap(),
            "4111111111111111"
        );
        assert_eq!(
            normalize_card_number(" 4111\t1111 1111 1111 ").unwrap(),
            "4111111111111111"
        );
    }

    #[test]
    fn test_card_number_rejected() {
        assert!(matches!(
            normalize_card_number("123"),
            Err(DomainError::InvalidArgument(_))
        ));
        assert!(normalize_card_number("41111111111111112222").is_err());
        assert!(normalize_card_number("4111-1111-1111-1111").is_err());
        assert!(normalize_card_number("").is_err());
    }

    #[test]
    fn test_expiry() {
        assert_eq!(validate_expiry(" 07/27 ").unwrap(), "07/27");
        assert!(validate_expiry("12/30").is_ok());
        assert!(validate_expiry("00/27").is_err());
        assert!(validate_expiry("13/27").is_err());
        assert!(validate_expiry("7/27").is_err());
        assert!(validate_expiry("07-27").is_err());
        assert!(validate_expiry("07/2027").is_err());
    }

    #[test]
    fn test_cvc() {
        assert!(validate_cvc("123").is_ok());
        assert!(validate_cvc("1234").is_ok());
        assert!(validate_cvc("12").is_err());
        assert!(validate_cvc("12a").is_err());
    }

    #[test]
    fn test_holder_name_uppercased() {
        assert_eq!(normalize_holder_name("  ana lopez ").unwrap(), "ANA LOPEZ");
        assert!(normalize_holder_name(" al ").is_err());
    }

    #[test]
    fn test_parse_reports_first_invalid_field() {
        let err = CardDetails::parse(1, "123", "99/99", "1", "x").unwrap_err();
        assert_eq!(err, DomainError::invalid("Invalid card number"));

        let err = CardDetails::parse(0, "4111111111111111", "01/30", "123", "ANA").unwrap_err();
        assert_eq!(err, DomainError::invalid("Invalid user id"));
    }

    #[test]
    fn test_mask_and_last_four() {
        assert_eq!(mask_card_number("4111111111111111"), "************1111");
        assert_eq!(mask_card_number("123"), "123");
        assert_eq!(last_four("4111111111111234"), "1234");
        assert_eq!(last_four("12"), "12");
    }
}
