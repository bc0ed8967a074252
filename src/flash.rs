//! Flash Discounts
//!
//! Time-boxed percentage offers shown to the shopper. An offer stays in the
//! cart's active set until it expires or is committed to a line item.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A time-boxed percentage offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashDiscount {
    /// Offer identifier
    pub id: u64,

    /// Percentage off, 0-100
    #[serde(with = "rust_decimal::serde::float")]
    pub percentage: Decimal,

    /// Event that surfaced the offer (e.g. `exit_intent`)
    #[serde(default)]
    pub trigger_condition: String,

    /// Nominal length of the offer
    #[serde(default)]
    pub duration_minutes: u32,

    /// Start of the offer window
    pub start_date: Timestamp,

    /// End of the offer window (exclusive)
    pub end_date: Timestamp,

    /// Message shown with the offer
    #[serde(default)]
    pub message: String,

    /// Whether the offer is switched on
    pub is_active: bool,

    /// Optional headline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Optional long description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Cart total required before the offer can be accepted
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub minimum_purchase: Option<Decimal>,
}

impl FlashDiscount {
    /// Whether the offer is switched on and `now` falls inside its window.
    pub fn is_live(&self, now: Timestamp) -> bool {
        self.is_active && self.start_date <= now && now < self.end_date
    }

    /// Whole seconds until the offer ends, never negative.
    pub fn seconds_left(&self, now: Timestamp) -> i64 {
        self.end_date.duration_since(now).as_secs().max(0)
    }

    /// Whether a cart total satisfies the offer's minimum purchase.
    pub fn meets_minimum_purchase(&self, subtotal: Decimal) -> bool {
        self.minimum_purchase
            .is_none_or(|minimum| subtotal >= minimum)
    }
}

/// Formats a countdown for display.
///
/// Uses `"{d}d {h}h {m}m"` for a day or more, `"{h}h {m}m {s}s"` for an hour or
/// more and `"MM:SS"` otherwise.
pub fn format_countdown(seconds: i64) -> String {
    let seconds = seconds.max(0);

    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    let secs = seconds % 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use testresult::TestResult;

    use super::*;

    pub(crate) fn flash_discount(id: u64, percentage: i64) -> Result<FlashDiscount, jiff::Error> {
        Ok(FlashDiscount {
            id,
            percentage: Decimal::from(percentage),
            trigger_condition: "exit_intent".to_string(),
            duration_minutes: 30,
            start_date: "2026-10-18T10:00:00Z".parse()?,
            end_date: "2026-10-18T10:30:00Z".parse()?,
            message: "Don't leave yet!".to_string(),
            is_active: true,
            title: None,
            description: None,
            minimum_purchase: None,
        })
    }

    #[test]
    fn is_live_inside_window() -> TestResult {
        let discount = flash_discount(1, 15)?;

        assert!(discount.is_live("2026-10-18T10:00:00Z".parse()?));
        assert!(discount.is_live("2026-10-18T10:29:59Z".parse()?));
        assert!(!discount.is_live("2026-10-18T10:30:00Z".parse()?));
        assert!(!discount.is_live("2026-10-18T09:59:59Z".parse()?));

        Ok(())
    }

    #[test]
    fn inactive_offer_is_never_live() -> TestResult {
        let mut discount = flash_discount(1, 15)?;
        discount.is_active = false;

        assert!(!discount.is_live("2026-10-18T10:10:00Z".parse()?));

        Ok(())
    }

    #[test]
    fn seconds_left_is_floored_at_zero() -> TestResult {
        let discount = flash_discount(1, 15)?;

        assert_eq!(discount.seconds_left("2026-10-18T10:20:00Z".parse()?), 600);
        assert_eq!(discount.seconds_left("2026-10-18T11:00:00Z".parse()?), 0);

        Ok(())
    }

    #[test]
    fn minimum_purchase_is_optional() -> TestResult {
        let mut discount = flash_discount(1, 15)?;

        assert!(discount.meets_minimum_purchase(Decimal::ZERO));

        discount.minimum_purchase = Some(Decimal::from(75));

        assert!(!discount.meets_minimum_purchase(Decimal::new(7499, 2)));
        assert!(discount.meets_minimum_purchase(Decimal::from(75)));

        Ok(())
    }

    #[test]
    fn format_countdown_picks_unit_by_magnitude() {
        assert_eq!(format_countdown(90_061), "1d 1h 1m");
        assert_eq!(format_countdown(3_725), "1h 2m 5s");
        assert_eq!(format_countdown(125), "02:05");
        assert_eq!(format_countdown(-5), "00:00");
    }

    #[test]
    fn deserializes_api_payload() -> TestResult {
        let json = r#"{
            "id": 7,
            "percentage": 25,
            "trigger_condition": "time_on_page",
            "duration_minutes": 15,
            "start_date": "2026-10-18T10:00:00Z",
            "end_date": "2026-10-18T10:15:00Z",
            "message": "25% off for the next 15 minutes",
            "is_active": true,
            "minimum_purchase": 50
        }"#;

        let discount: FlashDiscount = serde_json::from_str(json)?;

        assert_eq!(discount.percentage, Decimal::from(25));
        assert_eq!(discount.minimum_purchase, Some(Decimal::from(50)));
        assert!(discount.title.is_none());

        Ok(())
    }
}
