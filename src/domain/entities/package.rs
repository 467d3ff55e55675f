//! # Package Entity
//!
//! A single shipped item with its dimensions and declared value.
//!
//! Billable weight follows the usual carrier rule: the greater of actual
//! weight and dimensional weight, both in pounds.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::enums::{LengthUnit, PackageType, WeightUnit};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Pounds per kilogram.
pub const LB_PER_KG: Decimal = Decimal::from_parts(220_462, 0, 0, false, 5);

/// Centimetres per inch.
pub const CM_PER_INCH: Decimal = Decimal::from_parts(254, 0, 0, false, 2);

/// Domestic dimensional weight divisor (cubic inches per pound).
pub const DIM_DIVISOR: Decimal = Decimal::from_parts(166, 0, 0, false, 0);

/// Largest accepted length, width or height, in either linear unit.
pub const MAX_DIMENSION: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Largest accepted weight, in either weight unit.
pub const MAX_WEIGHT: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

/// Physical dimensions and weight of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimensions {
    /// Length in `unit`.
    pub length: Decimal,
    /// Width in `unit`.
    pub width: Decimal,
    /// Height in `unit`.
    pub height: Decimal,
    /// Weight in `weight_unit`.
    pub weight: Decimal,
    /// Linear unit.
    #[serde(default)]
    pub unit: LengthUnit,
    /// Weight unit.
    #[serde(default)]
    pub weight_unit: WeightUnit,
}

impl Dimensions {
    /// Creates dimensions in inches and pounds.
    #[must_use]
    pub fn imperial(length: Decimal, width: Decimal, height: Decimal, weight: Decimal) -> Self {
        Self {
            length,
            width,
            height,
            weight,
            unit: LengthUnit::In,
            weight_unit: WeightUnit::Lb,
        }
    }

    // Upper bounds keep every derived weight and price well inside
    // `Decimal` range.
    fn validate(&self, field_prefix: &str) -> DomainResult<()> {
        let checks = [
            ("length", self.length, MAX_DIMENSION),
            ("width", self.width, MAX_DIMENSION),
            ("height", self.height, MAX_DIMENSION),
            ("weight", self.weight, MAX_WEIGHT),
        ];
        for (name, value, max) in checks {
            let field = format!("{field_prefix}.dimensions.{name}");
            if value <= Decimal::ZERO {
                return Err(DomainError::non_positive(field));
            }
            if value > max {
                return Err(DomainError::MeasureTooLarge { field, max });
            }
        }
        Ok(())
    }

    /// Actual weight converted to pounds.
    #[must_use]
    pub fn weight_lb(&self) -> Decimal {
        match self.weight_unit {
            WeightUnit::Lb => self.weight,
            WeightUnit::Kg => self.weight * LB_PER_KG,
        }
    }

    /// Dimensional weight in pounds (volume in cubic inches / 166).
    #[must_use]
    pub fn dimensional_weight_lb(&self) -> Decimal {
        let to_inches = |v: Decimal| match self.unit {
            LengthUnit::In => v,
            LengthUnit::Cm => v / CM_PER_INCH,
        };
        to_inches(self.length) * to_inches(self.width) * to_inches(self.height) / DIM_DIVISOR
    }
}

/// A shipped item.
///
/// # Invariants
///
/// - weight and every dimension are strictly positive
/// - declared value is not negative
///
/// # Examples
///
/// ```
/// use shipping_engine::domain::entities::package::{Dimensions, Package};
/// use shipping_engine::domain::value_objects::enums::PackageType;
/// use rust_decimal::Decimal;
///
/// let pkg = Package::new(
///     PackageType::Parcel,
///     Dimensions::imperial(Decimal::new(12, 0), Decimal::new(12, 0), Decimal::new(12, 0), Decimal::new(5, 0)),
///     Decimal::new(100, 0),
///     "Books",
/// ).unwrap();
///
/// // 12x12x12 / 166 ≈ 10.4 lb dimensional, beats 5 lb actual
/// assert!(pkg.billable_weight_lb() > Decimal::new(10, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    #[serde(rename = "type")]
    package_type: PackageType,
    dimensions: Dimensions,
    declared_value: Decimal,
    contents: String,
}

impl Package {
    /// Creates a validated package.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NonPositiveMeasure` naming the offending field,
    /// or `DomainError::InvalidAmount` for a negative declared value.
    pub fn new(
        package_type: PackageType,
        dimensions: Dimensions,
        declared_value: Decimal,
        contents: impl Into<String>,
    ) -> DomainResult<Self> {
        Self::validated(0, package_type, dimensions, declared_value, contents)
    }

    /// Creates a validated package, naming fields relative to
    /// `packages[index]` in error messages.
    ///
    /// # Errors
    ///
    /// Same as [`Package::new`].
    pub fn validated(
        index: usize,
        package_type: PackageType,
        dimensions: Dimensions,
        declared_value: Decimal,
        contents: impl Into<String>,
    ) -> DomainResult<Self> {
        let package = Self {
            package_type,
            dimensions,
            declared_value,
            contents: contents.into(),
        };
        package.validate(index)?;
        Ok(package)
    }

    /// Re-checks the package invariants, naming fields relative to
    /// `packages[index]`.
    ///
    /// # Errors
    ///
    /// Same as [`Package::new`].
    pub fn validate(&self, index: usize) -> DomainResult<()> {
        let prefix = format!("packages[{index}]");
        self.dimensions.validate(&prefix)?;
        if self.declared_value < Decimal::ZERO {
            return Err(DomainError::InvalidAmount(format!(
                "{prefix}.value must not be negative"
            )));
        }
        Ok(())
    }

    /// Returns the package type.
    #[must_use]
    pub fn package_type(&self) -> PackageType {
        self.package_type
    }

    /// Returns the dimensions.
    #[must_use]
    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    /// Returns the declared value.
    #[must_use]
    pub fn declared_value(&self) -> Decimal {
        self.declared_value
    }

    /// Returns the contents description.
    #[must_use]
    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Greater of actual and dimensional weight, in pounds.
    #[must_use]
    pub fn billable_weight_lb(&self) -> Decimal {
        self.dimensions
            .weight_lb()
            .max(self.dimensions.dimensional_weight_lb())
    }
}
