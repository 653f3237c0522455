//! Display-name synthesis for prices arriving from Stripe.

/// Build the display name for a price.
///
/// A non-empty Stripe nickname wins. Otherwise the name is synthesized from
/// the product name, the billing cadence, and the amount in major units.
#[must_use]
pub fn price_display_name(
    product_name: &str,
    nickname: Option<&str>,
    unit_amount: i64,
    currency_upper: &str,
    recurring: Option<(&str, i64)>,
) -> String {
    if let Some(nick) = nickname {
        if !nick.is_empty() {
            return nick.to_string();
        }
    }

    let amount = format_minor_units(unit_amount);

    match recurring {
        Some((interval, count)) => {
            let phrase = interval_phrase(interval, count);
            format!("{product_name} - {phrase} ({amount} {currency_upper} / {interval})")
        }
        None => format!("{product_name} - One-time ({amount} {currency_upper})"),
    }
}

/// Minor units rendered with two decimals: 1500 -> "15.00".
fn format_minor_units(amount: i64) -> String {
    format!("{}.{:02}", amount / 100, (amount % 100).abs())
}

/// Billing cadence phrase: count 1 gets the idiomatic adjective, larger
/// counts spell out the interval.
fn interval_phrase(interval: &str, count: i64) -> String {
    if count == 1 {
        match interval {
            "week" => "Weekly".to_string(),
            "month" => "Monthly".to_string(),
            "year" => "Annual".to_string(),
            other => format!("Every {other}"),
        }
    } else {
        format!("{count} {interval}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nickname_wins_when_present() {
        let name = price_display_name(
            "Ethiopia",
            Some("Club price"),
            1500,
            "USD",
            Some(("month", 1)),
        );
        assert_eq!(name, "Club price");
    }

    #[test]
    fn empty_nickname_falls_through() {
        let name = price_display_name("Ethiopia", Some(""), 1500, "USD", None);
        assert_eq!(name, "Ethiopia - One-time (15.00 USD)");
    }

    #[test]
    fn monthly_recurring_name() {
        let name = price_display_name(
            "Ethiopia Yirgacheffe – 12oz",
            None,
            1500,
            "USD",
            Some(("month", 1)),
        );
        assert_eq!(
            name,
            "Ethiopia Yirgacheffe – 12oz - Monthly (15.00 USD / month)"
        );
    }

    #[test]
    fn weekly_and_annual_adjectives() {
        assert_eq!(
            price_display_name("Beans", None, 900, "USD", Some(("week", 1))),
            "Beans - Weekly (9.00 USD / week)"
        );
        assert_eq!(
            price_display_name("Beans", None, 12000, "USD", Some(("year", 1))),
            "Beans - Annual (120.00 USD / year)"
        );
    }

    #[test]
    fn multi_count_pluralizes() {
        assert_eq!(
            price_display_name("Beans", None, 2850, "USD", Some(("month", 3))),
            "Beans - 3 months (28.50 USD / month)"
        );
    }

    #[test]
    fn one_time_name() {
        assert_eq!(
            price_display_name("Beans", None, 1050, "EUR", None),
            "Beans - One-time (10.50 EUR)"
        );
    }

    #[test]
    fn amount_formatting_pads_cents() {
        assert_eq!(format_minor_units(1500), "15.00");
        assert_eq!(format_minor_units(1005), "10.05");
        assert_eq!(format_minor_units(99), "0.99");
        assert_eq!(format_minor_units(100000), "1000.00");
    }
}
