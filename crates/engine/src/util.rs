//! Internal helpers for input validation and model conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every entry point (API procedures and snapshot import)
//! enforces the same invariants.

use api_types::{GenreColor, MealType};
use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

/// Trim and NFC-normalize a user supplied name.
///
/// The result is the form that is stored and compared, so `"Netflix "` and
/// `"Netflix"` name the same subscription.
pub(crate) fn normalize_name(value: &str, label: &str) -> ResultEngine<String> {
    let normalized: String = value.trim().nfc().collect();
    if normalized.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(normalized)
}

/// Trim optional free text, mapping blank input to `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

pub(crate) fn validate_price(price: i64) -> ResultEngine<()> {
    if price <= 0 {
        return Err(EngineError::InvalidAmount(
            "price must be > 0".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_count(value: Option<i32>, label: &str) -> ResultEngine<()> {
    if let Some(count) = value
        && count < 0
    {
        return Err(EngineError::InvalidCount(format!("{label} must be >= 0")));
    }
    Ok(())
}

/// Parse a color stored in the DB into the closed enum.
pub(crate) fn model_color(value: &str) -> ResultEngine<GenreColor> {
    GenreColor::parse(value)
        .ok_or_else(|| EngineError::InvalidData(format!("invalid genre color: {value}")))
}

/// Parse a meal type stored in the DB into the closed enum.
pub(crate) fn model_meal_type(value: &str) -> ResultEngine<MealType> {
    MealType::parse(value)
        .ok_or_else(|| EngineError::InvalidData(format!("invalid meal type: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed_and_composed() {
        // "e" + combining acute accent composes to a single code point.
        let name = normalize_name("  Cafe\u{301}  ", "genre").unwrap();
        assert_eq!(name, "Caf\u{e9}");
    }

    #[test]
    fn blank_name_is_rejected() {
        assert_eq!(
            normalize_name("   ", "subscription"),
            Err(EngineError::InvalidName(
                "subscription name must not be empty".to_string()
            ))
        );
    }

    #[test]
    fn price_must_be_positive() {
        assert!(validate_price(1).is_ok());
        assert!(validate_price(0).is_err());
        assert!(validate_price(-100).is_err());
    }

    #[test]
    fn counts_may_be_zero_but_not_negative() {
        assert!(validate_count(None, "monthlyCount").is_ok());
        assert!(validate_count(Some(0), "monthlyCount").is_ok());
        assert_eq!(
            validate_count(Some(-1), "dailyCount"),
            Err(EngineError::InvalidCount("dailyCount must be >= 0".to_string()))
        );
    }

    #[test]
    fn blank_description_becomes_none() {
        assert_eq!(normalize_optional_text(Some("  ")), None);
        assert_eq!(
            normalize_optional_text(Some(" family plan ")),
            Some("family plan".to_string())
        );
    }

    #[test]
    fn corrupt_enum_values_are_errors() {
        assert!(model_color("amber").is_ok());
        assert!(model_color("ultraviolet").is_err());
        assert!(model_meal_type("brunch").is_err());
    }
}
