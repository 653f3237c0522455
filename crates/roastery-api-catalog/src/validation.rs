//! Request validation helpers.

use uuid::Uuid;

use crate::error::{CatalogError, FieldError};

/// Parse a path identifier, mapping failures to `INVALID_ID_FORMAT`.
pub fn parse_id(raw: &str) -> Result<Uuid, CatalogError> {
    Uuid::parse_str(raw).map_err(|_| CatalogError::InvalidId(raw.to_string()))
}

/// Collects field errors and converts to a single validation failure.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(&mut self, condition: bool, field: &str, message: &str) {
        if !condition {
            self.errors.push(FieldError {
                field: field.to_string(),
                message: message.to_string(),
            });
        }
    }

    pub fn finish(self) -> Result<(), CatalogError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(CatalogError::Validation {
                errors: self.errors,
            })
        }
    }
}

/// Product name: non-empty, at most 255 characters.
pub fn validate_product_name(validator: &mut Validator, name: &str) {
    validator.require(!name.trim().is_empty(), "name", "must not be empty");
    validator.require(
        name.chars().count() <= 255,
        "name",
        "must be at most 255 characters",
    );
}

/// Currency: exactly three ASCII uppercase letters.
pub fn validate_currency(validator: &mut Validator, currency: &str) {
    validator.require(
        currency.len() == 3 && currency.chars().all(|c| c.is_ascii_uppercase()),
        "currency",
        "must be a three-letter uppercase ISO-4217 code",
    );
}

/// Recurring fields are present exactly when the type is recurring, with the
/// interval count in 1..=12.
pub fn validate_recurrence(
    validator: &mut Validator,
    recurring: bool,
    interval: Option<&str>,
    interval_count: Option<i32>,
) {
    if recurring {
        match interval {
            Some("week" | "month" | "year") => {}
            Some(_) => validator.require(false, "interval", "must be week, month, or year"),
            None => validator.require(false, "interval", "required for recurring prices"),
        }
        match interval_count {
            Some(count) => validator.require(
                (1..=12).contains(&count),
                "intervalCount",
                "must be between 1 and 12",
            ),
            None => validator.require(
                false,
                "intervalCount",
                "required for recurring prices",
            ),
        }
    } else {
        validator.require(
            interval.is_none(),
            "interval",
            "only allowed for recurring prices",
        );
        validator.require(
            interval_count.is_none(),
            "intervalCount",
            "only allowed for recurring prices",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run<F: FnOnce(&mut Validator)>(f: F) -> Result<(), CatalogError> {
        let mut v = Validator::new();
        f(&mut v);
        v.finish()
    }

    #[test]
    fn parse_id_rejects_non_uuid() {
        assert!(parse_id("7f4e0000-0000-0000-0000-000000000000").is_ok());
        assert!(matches!(
            parse_id("not-a-uuid"),
            Err(CatalogError::InvalidId(_))
        ));
    }

    #[test]
    fn product_name_bounds() {
        assert!(run(|v| validate_product_name(v, "Ethiopia")).is_ok());
        assert!(run(|v| validate_product_name(v, "")).is_err());
        assert!(run(|v| validate_product_name(v, "   ")).is_err());
        assert!(run(|v| validate_product_name(v, &"x".repeat(255))).is_ok());
        assert!(run(|v| validate_product_name(v, &"x".repeat(256))).is_err());
    }

    #[test]
    fn currency_must_be_uppercase_iso() {
        assert!(run(|v| validate_currency(v, "USD")).is_ok());
        assert!(run(|v| validate_currency(v, "usd")).is_err());
        assert!(run(|v| validate_currency(v, "US")).is_err());
        assert!(run(|v| validate_currency(v, "USDX")).is_err());
    }

    #[test]
    fn recurrence_interval_count_bounds() {
        assert!(run(|v| validate_recurrence(v, true, Some("month"), Some(1))).is_ok());
        assert!(run(|v| validate_recurrence(v, true, Some("month"), Some(12))).is_ok());
        assert!(run(|v| validate_recurrence(v, true, Some("month"), Some(0))).is_err());
        assert!(run(|v| validate_recurrence(v, true, Some("month"), Some(13))).is_err());
    }

    #[test]
    fn recurrence_fields_forbidden_for_one_time() {
        assert!(run(|v| validate_recurrence(v, false, None, None)).is_ok());
        assert!(run(|v| validate_recurrence(v, false, Some("month"), None)).is_err());
        assert!(run(|v| validate_recurrence(v, false, None, Some(1))).is_err());
    }

    #[test]
    fn recurrence_requires_interval_fields() {
        assert!(run(|v| validate_recurrence(v, true, None, Some(1))).is_err());
        assert!(run(|v| validate_recurrence(v, true, Some("month"), None)).is_err());
        assert!(run(|v| validate_recurrence(v, true, Some("day"), Some(1))).is_err());
    }

    #[test]
    fn multiple_errors_accumulate() {
        let result = run(|v| {
            validate_product_name(v, "");
            validate_currency(v, "usd");
        });
        let Err(CatalogError::Validation { errors }) = result else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 2);
    }
}
