//! Form field validation.
//!
//! Handlers run every validator for a form, collect the failures into
//! [`FieldErrors`], and re-render the form when any are present.

use std::collections::BTreeMap;

pub const LICENSE_NUMBER_LEN: usize = 8;
pub const LICENSE_NUMBER_ERROR: &str = "License number should consist of 8 characters";

/// Validates a candidate license number, returning it unchanged on success.
///
/// The only rule is the length: exactly 8 characters. Character classes are
/// deliberately not constrained.
pub fn validate_license_number(candidate: &str) -> Result<&str, String> {
    if candidate.chars().count() == LICENSE_NUMBER_LEN {
        Ok(candidate)
    } else {
        Err(LICENSE_NUMBER_ERROR.to_string())
    }
}

/// Validation errors keyed by form field name, in field-name order.
#[derive(Debug, Clone, Default)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages attached to a field, empty when the field validated.
    pub fn field(&self, name: &str) -> &[String] {
        self.0.get(name).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Adds `message` to `field` when the value is blank.
pub fn require(errors: &mut FieldErrors, field: &str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.add(field, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_license_number_valid() {
        assert_eq!(validate_license_number("AAA12345"), Ok("AAA12345"));
    }

    #[test]
    fn test_license_number_too_short() {
        assert_eq!(
            validate_license_number("invalid"),
            Err("License number should consist of 8 characters".to_string())
        );
    }

    #[test]
    fn test_license_number_too_long() {
        assert!(validate_license_number("AAA123456").is_err());
    }

    #[test]
    fn test_license_number_empty() {
        assert!(validate_license_number("").is_err());
    }

    #[test]
    fn test_license_number_counts_characters_not_bytes() {
        // 8 characters even though more than 8 bytes
        assert!(validate_license_number("ÅÅÅ12345").is_ok());
    }

    #[test]
    fn test_field_errors_collects_all_failures() {
        let mut errors = FieldErrors::new();
        require(&mut errors, "username", "", "Username is required");
        if let Err(msg) = validate_license_number("short") {
            errors.add("license_number", msg);
        }

        assert!(!errors.is_empty());
        assert_eq!(errors.field("username"), ["Username is required"]);
        assert_eq!(errors.field("license_number"), [LICENSE_NUMBER_ERROR]);
        assert!(errors.field("first_name").is_empty());
    }

    #[test]
    fn test_require_accepts_non_blank() {
        let mut errors = FieldErrors::new();
        require(&mut errors, "name", "Toyota", "Name is required");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_require_rejects_whitespace_only() {
        let mut errors = FieldErrors::new();
        require(&mut errors, "name", "   ", "Name is required");
        assert_eq!(errors.field("name"), ["Name is required"]);
    }
}
