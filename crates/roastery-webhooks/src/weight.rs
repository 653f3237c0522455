//! Weight parsing from Stripe metadata.
//!
//! Accepted forms: `NNNg`, `NNoz` (×28), `NNlb` (×454), or a bare integer
//! taken as grams. Anything else parses to 1 gram.

/// Default weight for variants bootstrapped by `product.created` without a
/// weight in metadata.
pub const DEFAULT_CREATED_WEIGHT_GRAMS: i32 = 340;

const GRAMS_PER_OZ: i32 = 28;
const GRAMS_PER_LB: i32 = 454;

/// Parse a metadata weight string into grams.
#[must_use]
pub fn parse_weight_grams(raw: &str) -> i32 {
    let value = raw.trim().to_lowercase();

    let parsed = if let Some(number) = value.strip_suffix("oz") {
        number.trim().parse::<i32>().ok().map(|n| n * GRAMS_PER_OZ)
    } else if let Some(number) = value.strip_suffix("lb") {
        number.trim().parse::<i32>().ok().map(|n| n * GRAMS_PER_LB)
    } else if let Some(number) = value.strip_suffix('g') {
        number.trim().parse::<i32>().ok()
    } else {
        value.parse::<i32>().ok()
    };

    match parsed {
        Some(grams) if grams > 0 => grams,
        _ => {
            tracing::warn!(raw = %raw, "Unrecognized weight, defaulting to 1g");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grams_suffix() {
        assert_eq!(parse_weight_grams("340g"), 340);
        assert_eq!(parse_weight_grams(" 250 g "), 250);
    }

    #[test]
    fn ounces_convert_at_28() {
        assert_eq!(parse_weight_grams("12oz"), 336);
        assert_eq!(parse_weight_grams("1oz"), 28);
    }

    #[test]
    fn pounds_convert_at_454() {
        assert_eq!(parse_weight_grams("3lb"), 1362);
        assert_eq!(parse_weight_grams("1lb"), 454);
    }

    #[test]
    fn bare_number_is_grams() {
        assert_eq!(parse_weight_grams("500"), 500);
    }

    #[test]
    fn unrecognized_defaults_to_one() {
        assert_eq!(parse_weight_grams("heavy"), 1);
        assert_eq!(parse_weight_grams("12kg"), 1);
        assert_eq!(parse_weight_grams(""), 1);
        assert_eq!(parse_weight_grams("-5oz"), 1);
        assert_eq!(parse_weight_grams("0g"), 1);
    }
}
