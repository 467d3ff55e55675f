//! # Domain Services
//!
//! - [`clock::Clock`]: injectable source of "now"

pub mod clock;

pub use clock::{Clock, ManualClock, SystemClock};
