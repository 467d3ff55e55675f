//! # Domain Enums
//!
//! Enumeration types for shipment concepts.
//!
//! - [`PackageType`] - Packaging category of a shipped item
//! - [`ServiceLevel`] - Requested speed/class of service
//! - [`LengthUnit`] - Linear unit for package dimensions
//! - [`WeightUnit`] - Unit for package weight
//!
//! All enums implement `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`,
//! `Display`, `FromStr`, and Serde traits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Packaging category of a shipped item.
///
/// # Examples
///
/// ```
/// use shipping_engine::domain::value_objects::enums::PackageType;
///
/// assert_eq!(PackageType::default(), PackageType::Parcel);
/// assert_eq!("tube".parse::<PackageType>().unwrap(), PackageType::Tube);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PackageType {
    /// Flat document envelope.
    Envelope,
    /// Generic parcel.
    #[default]
    Parcel,
    /// Rigid box.
    Box,
    /// Mailing tube.
    Tube,
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Envelope => write!(f, "ENVELOPE"),
            Self::Parcel => write!(f, "PARCEL"),
            Self::Box => write!(f, "BOX"),
            Self::Tube => write!(f, "TUBE"),
        }
    }
}

impl FromStr for PackageType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ENVELOPE" => Ok(Self::Envelope),
            "PARCEL" => Ok(Self::Parcel),
            "BOX" => Ok(Self::Box),
            "TUBE" => Ok(Self::Tube),
            _ => Err(ParseEnumError::InvalidValue("PackageType", s.to_string())),
        }
    }
}

/// Requested class of service.
///
/// Carriers map these onto their own service menus; a level a carrier does
/// not offer is skipped by that carrier rather than treated as an error.
///
/// # Examples
///
/// ```
/// use shipping_engine::domain::value_objects::enums::ServiceLevel;
///
/// assert_eq!(ServiceLevel::default(), ServiceLevel::Ground);
/// assert_eq!(ServiceLevel::Overnight.to_string(), "OVERNIGHT");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceLevel {
    /// Standard ground service.
    #[default]
    Ground,
    /// Expedited service.
    Express,
    /// Next business day.
    Overnight,
    /// Slowest, cheapest service.
    Economy,
    /// Cross-border service.
    International,
}

impl ServiceLevel {
    /// All service levels, in display order.
    pub const ALL: [Self; 5] = [
        Self::Ground,
        Self::Express,
        Self::Overnight,
        Self::Economy,
        Self::International,
    ];

    /// Returns the lowercase category tag used by frontends for icons.
    #[must_use]
    pub const fn category_tag(self) -> &'static str {
        match self {
            Self::Ground => "ground",
            Self::Express => "express",
            Self::Overnight => "overnight",
            Self::Economy => "economy",
            Self::International => "international",
        }
    }
}

impl fmt::Display for ServiceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ground => write!(f, "GROUND"),
            Self::Express => write!(f, "EXPRESS"),
            Self::Overnight => write!(f, "OVERNIGHT"),
            Self::Economy => write!(f, "ECONOMY"),
            Self::International => write!(f, "INTERNATIONAL"),
        }
    }
}

impl FromStr for ServiceLevel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GROUND" => Ok(Self::Ground),
            "EXPRESS" => Ok(Self::Express),
            "OVERNIGHT" => Ok(Self::Overnight),
            "ECONOMY" => Ok(Self::Economy),
            "INTERNATIONAL" => Ok(Self::International),
            _ => Err(ParseEnumError::InvalidValue("ServiceLevel", s.to_string())),
        }
    }
}

/// Linear unit for package dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LengthUnit {
    /// Inches.
    #[default]
    In,
    /// Centimetres.
    Cm,
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::In => write!(f, "IN"),
            Self::Cm => write!(f, "CM"),
        }
    }
}

impl FromStr for LengthUnit {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "IN" => Ok(Self::In),
            "CM" => Ok(Self::Cm),
            _ => Err(ParseEnumError::InvalidValue("LengthUnit", s.to_string())),
        }
    }
}

/// Unit for package weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WeightUnit {
    /// Pounds.
    #[default]
    Lb,
    /// Kilograms.
    Kg,
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lb => write!(f, "LB"),
            Self::Kg => write!(f, "KG"),
        }
    }
}

impl FromStr for WeightUnit {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LB" => Ok(Self::Lb),
            "KG" => Ok(Self::Kg),
            _ => Err(ParseEnumError::InvalidValue("WeightUnit", s.to_string())),
        }
    }
}

/// Error returned when parsing an enum from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEnumError {
    /// The provided string value is not valid for the enum.
    InvalidValue(&'static str, String),
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue(enum_name, value) => {
                write!(f, "invalid {} value: '{}'", enum_name, value)
            }
        }
    }
}

impl std::error::Error for ParseEnumError {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod service_level {
        use super::*;

        #[test]
        fn from_str_is_case_insensitive() {
            assert_eq!("ground".parse::<ServiceLevel>().unwrap(), ServiceLevel::Ground);
            assert_eq!(
                " Express ".parse::<ServiceLevel>().unwrap(),
                ServiceLevel::Express
            );
        }

        #[test]
        fn from_str_rejects_unknown() {
            let err = "TELEPORT".parse::<ServiceLevel>().unwrap_err();
            assert!(err.to_string().contains("ServiceLevel"));
            assert!(err.to_string().contains("TELEPORT"));
        }

        #[test]
        fn display_matches_serde() {
            for level in ServiceLevel::ALL {
                let json = serde_json::to_string(&level).unwrap();
                assert_eq!(json, format!("\"{}\"", level));
            }
        }

        #[test]
        fn category_tags() {
            assert_eq!(ServiceLevel::Ground.category_tag(), "ground");
            assert_eq!(ServiceLevel::International.category_tag(), "international");
        }
    }

    mod units {
        use super::*;

        #[test]
        fn defaults_are_imperial() {
            assert_eq!(LengthUnit::default(), LengthUnit::In);
            assert_eq!(WeightUnit::default(), WeightUnit::Lb);
        }

        #[test]
        fn parse_units() {
            assert_eq!("cm".parse::<LengthUnit>().unwrap(), LengthUnit::Cm);
            assert_eq!("KG".parse::<WeightUnit>().unwrap(), WeightUnit::Kg);
            assert!("ft".parse::<LengthUnit>().is_err());
        }
    }

    mod package_type {
        use super::*;

        #[test]
        fn serde_uppercase() {
            let json = serde_json::to_string(&PackageType::Envelope).unwrap();
            assert_eq!(json, "\"ENVELOPE\"");
            let back: PackageType = serde_json::from_str("\"BOX\"").unwrap();
            assert_eq!(back, PackageType::Box);
        }

        #[test]
        fn pallet_is_not_a_package_type() {
            assert!("PALLET".parse::<PackageType>().is_err());
        }
    }
}
