//! # Tracking Status
//!
//! Shipment lifecycle state machine.
//!
//! # State Machine
//!
//! ```text
//! Created → PickedUp → InTransit ⟲ → OutForDelivery → Delivered
//!    ↓          ↓          ↓               ↓
//!    └──────────┴──────────┴───────────────┴→ Exception
//! ```
//!
//! `InTransit` may repeat (one event per hub scan). `Delivered` and
//! `Exception` are terminal.
//!
//! # Examples
//!
//! ```
//! use shipping_engine::domain::value_objects::tracking_status::TrackingStatus;
//!
//! let state = TrackingStatus::Created;
//! assert!(state.can_transition_to(TrackingStatus::PickedUp));
//! assert!(!state.can_transition_to(TrackingStatus::Delivered));
//! ```

use crate::domain::value_objects::enums::ParseEnumError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Shipment lifecycle status.
///
/// # Terminal States
///
/// - [`Delivered`](TrackingStatus::Delivered) - handed to the recipient
/// - [`Exception`](TrackingStatus::Exception) - delivery halted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum TrackingStatus {
    /// Label created, carrier has not taken the package yet.
    #[default]
    Created = 0,

    /// Carrier took possession of the package.
    PickedUp = 1,

    /// Moving through the carrier network.
    InTransit = 2,

    /// On the final delivery vehicle.
    OutForDelivery = 3,

    /// Delivered (terminal).
    Delivered = 4,

    /// Delivery halted (terminal).
    Exception = 5,
}

impl TrackingStatus {
    /// Returns true if this is a terminal state.
    ///
    /// # Examples
    ///
    /// ```
    /// use shipping_engine::domain::value_objects::tracking_status::TrackingStatus;
    ///
    /// assert!(!TrackingStatus::InTransit.is_terminal());
    /// assert!(TrackingStatus::Delivered.is_terminal());
    /// assert!(TrackingStatus::Exception.is_terminal());
    /// ```
    #[inline]
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Exception)
    }

    /// Returns true if this state can transition to the target state.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, target),
            (Self::Created, Self::PickedUp)
                | (Self::PickedUp, Self::InTransit)
                | (Self::InTransit, Self::InTransit)
                | (Self::InTransit, Self::OutForDelivery)
                | (Self::OutForDelivery, Self::Delivered)
                | (_, Self::Exception)
        )
    }

    /// Returns the valid next states from this state.
    #[must_use]
    pub fn valid_transitions(&self) -> Vec<Self> {
        match self {
            Self::Created => vec![Self::PickedUp, Self::Exception],
            Self::PickedUp => vec![Self::InTransit, Self::Exception],
            Self::InTransit => vec![Self::InTransit, Self::OutForDelivery, Self::Exception],
            Self::OutForDelivery => vec![Self::Delivered, Self::Exception],
            Self::Delivered | Self::Exception => vec![],
        }
    }

    /// Returns the short carrier-style status code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Created => "CR",
            Self::PickedUp => "PU",
            Self::InTransit => "IT",
            Self::OutForDelivery => "OFD",
            Self::Delivered => "DL",
            Self::Exception => "EX",
        }
    }

    /// Returns a human-readable label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Created => "Label Created",
            Self::PickedUp => "Picked Up",
            Self::InTransit => "In Transit",
            Self::OutForDelivery => "Out for Delivery",
            Self::Delivered => "Delivered",
            Self::Exception => "Delivery Exception",
        }
    }

    /// Returns the numeric value of this state.
    #[inline]
    #[must_use]
    pub const fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for TrackingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Created => "CREATED",
            Self::PickedUp => "PICKED_UP",
            Self::InTransit => "IN_TRANSIT",
            Self::OutForDelivery => "OUT_FOR_DELIVERY",
            Self::Delivered => "DELIVERED",
            Self::Exception => "EXCEPTION",
        };
        write!(f, "{s}")
    }
}

impl FromStr for TrackingStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CREATED" => Ok(Self::Created),
            "PICKED_UP" => Ok(Self::PickedUp),
            "IN_TRANSIT" => Ok(Self::InTransit),
            "OUT_FOR_DELIVERY" => Ok(Self::OutForDelivery),
            "DELIVERED" => Ok(Self::Delivered),
            "EXCEPTION" => Ok(Self::Exception),
            _ => Err(ParseEnumError::InvalidValue("TrackingStatus", s.to_string())),
        }
    }
}

/// Error returned when converting an invalid u8 to TrackingStatus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTrackingStatusError(
    /// The invalid u8 value.
    pub u8,
);

impl fmt::Display for InvalidTrackingStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid tracking status value: {}", self.0)
    }
}

impl std::error::Error for InvalidTrackingStatusError {}

impl TryFrom<u8> for TrackingStatus {
    type Error = InvalidTrackingStatusError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Created),
            1 => Ok(Self::PickedUp),
            2 => Ok(Self::InTransit),
            3 => Ok(Self::OutForDelivery),
            4 => Ok(Self::Delivered),
            5 => Ok(Self::Exception),
            _ => Err(InvalidTrackingStatusError(value)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ALL: [TrackingStatus; 6] = [
        TrackingStatus::Created,
        TrackingStatus::PickedUp,
        TrackingStatus::InTransit,
        TrackingStatus::OutForDelivery,
        TrackingStatus::Delivered,
        TrackingStatus::Exception,
    ];

    mod terminal {
        use super::*;

        #[test]
        fn only_delivered_and_exception_are_terminal() {
            let terminal: Vec<_> = ALL.iter().filter(|s| s.is_terminal()).collect();
            assert_eq!(
                terminal,
                vec![&TrackingStatus::Delivered, &TrackingStatus::Exception]
            );
        }

        #[test]
        fn terminal_states_have_no_transitions() {
            for from in [TrackingStatus::Delivered, TrackingStatus::Exception] {
                assert!(from.valid_transitions().is_empty());
                for to in ALL {
                    assert!(!from.can_transition_to(to), "{from} -> {to}");
                }
            }
        }
    }

    mod transitions {
        use super::*;

        #[test]
        fn happy_path() {
            assert!(TrackingStatus::Created.can_transition_to(TrackingStatus::PickedUp));
            assert!(TrackingStatus::PickedUp.can_transition_to(TrackingStatus::InTransit));
            assert!(TrackingStatus::InTransit.can_transition_to(TrackingStatus::InTransit));
            assert!(TrackingStatus::InTransit.can_transition_to(TrackingStatus::OutForDelivery));
            assert!(TrackingStatus::OutForDelivery.can_transition_to(TrackingStatus::Delivered));
        }

        #[test]
        fn exception_reachable_from_every_active_state() {
            for from in ALL.iter().filter(|s| !s.is_terminal()) {
                assert!(from.can_transition_to(TrackingStatus::Exception));
            }
        }

        #[test]
        fn no_skipping_or_going_back() {
            assert!(!TrackingStatus::Created.can_transition_to(TrackingStatus::InTransit));
            assert!(!TrackingStatus::PickedUp.can_transition_to(TrackingStatus::Delivered));
            assert!(!TrackingStatus::OutForDelivery.can_transition_to(TrackingStatus::InTransit));
            assert!(!TrackingStatus::PickedUp.can_transition_to(TrackingStatus::Created));
        }

        #[test]
        fn valid_transitions_agree_with_can_transition_to() {
            for from in ALL {
                for to in ALL {
                    assert_eq!(
                        from.valid_transitions().contains(&to),
                        from.can_transition_to(to),
                        "{from} -> {to}"
                    );
                }
            }
        }
    }

    mod conversions {
        use super::*;

        #[test]
        fn u8_round_trip() {
            for status in ALL {
                assert_eq!(TrackingStatus::try_from(status.as_u8()).unwrap(), status);
            }
            assert_eq!(
                TrackingStatus::try_from(9).unwrap_err(),
                InvalidTrackingStatusError(9)
            );
        }

        #[test]
        fn display_matches_serde_and_from_str() {
            for status in ALL {
                let json = serde_json::to_string(&status).unwrap();
                assert_eq!(json, format!("\"{status}\""));
                assert_eq!(status.to_string().parse::<TrackingStatus>().unwrap(), status);
            }
        }

        #[test]
        fn codes() {
            assert_eq!(TrackingStatus::OutForDelivery.code(), "OFD");
            assert_eq!(TrackingStatus::InTransit.label(), "In Transit");
        }
    }
}
