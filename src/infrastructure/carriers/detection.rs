//! # Carrier Detection
//!
//! Guesses the issuing carrier from the shape of a tracking number.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Carriers whose tracking-number formats are recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KnownCarrier {
    /// FedEx.
    FedEx,
    /// UPS.
    Ups,
    /// DHL.
    Dhl,
    /// USPS.
    Usps,
}

impl KnownCarrier {
    /// All recognised carriers, in lookup order.
    pub const ALL: [Self; 4] = [Self::FedEx, Self::Ups, Self::Dhl, Self::Usps];

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FedEx => "FedEx",
            Self::Ups => "UPS",
            Self::Dhl => "DHL",
            Self::Usps => "USPS",
        }
    }

    /// Lowercase URL path segment.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::FedEx => "fedex",
            Self::Ups => "ups",
            Self::Dhl => "dhl",
            Self::Usps => "usps",
        }
    }
}

impl fmt::Display for KnownCarrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Detects the carrier from a tracking number's format.
///
/// Returns `None` when the format matches no known carrier.
#[must_use]
pub fn detect_carrier(tracking_number: &str) -> Option<KnownCarrier> {
    let number = tracking_number.trim().to_ascii_uppercase();
    let len = number.len();

    if let Some(rest) = number.strip_prefix("1Z")
        && rest.len() == 16
        && rest.bytes().all(|b| b.is_ascii_alphanumeric())
    {
        return Some(KnownCarrier::Ups);
    }

    if all_digits(&number) {
        return match len {
            12 | 14 => Some(KnownCarrier::FedEx),
            10 | 11 => Some(KnownCarrier::Dhl),
            22 if matches!(number.get(..2), Some("92" | "93" | "94" | "95")) => {
                Some(KnownCarrier::Usps)
            }
            _ => None,
        };
    }

    // International postal format: AA123456789AA
    let bytes = number.as_bytes();
    if let [a, b, digits @ .., y, z] = bytes
        && digits.len() == 9
        && digits.iter().all(u8::is_ascii_digit)
        && [a, b, y, z].iter().all(|c| c.is_ascii_alphabetic())
    {
        return Some(KnownCarrier::Usps);
    }

    None
}
