//! # Tracking Simulation
//!
//! Deterministic synthesis of plausible tracking histories.
//!
//! Everything is a pure function of a seed (derived from the tracking
//! number) and an anchor instant:
//!
//! ```text
//! seed     = fnv1a64(tracking_number)
//! schedule = derive_schedule(seed, anchor)     // full event plan
//! history  = events of schedule with ts <= now // visible prefix
//! ```
//!
//! For a fixed anchor, a later `now` can only reveal more of the same
//! schedule, so successive histories extend each other by append.

use crate::domain::entities::tracking::{TrackingEvent, TrackingHistory};
use crate::domain::errors::DomainResult;
use crate::domain::value_objects::TrackingNumber;
use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::tracking_status::TrackingStatus;

/// Carrier name on synthesised histories.
pub const SIMULATED_CARRIER: &str = "Demo Carrier";

/// One seed in this many ends in an exception.
pub const EXCEPTION_ONE_IN: u64 = 12;

/// Shortest backdate of the `CREATED` event before the anchor, in minutes.
pub const MIN_BACKDATE_MINUTES: i64 = 6 * 60;

/// Longest backdate of the `CREATED` event before the anchor, in minutes.
pub const MAX_BACKDATE_MINUTES: i64 = 48 * 60;

const HUBS: [&str; 12] = [
    "Memphis, TN",
    "Louisville, KY",
    "Indianapolis, IN",
    "Dallas, TX",
    "Chicago, IL",
    "Atlanta, GA",
    "Denver, CO",
    "Phoenix, AZ",
    "Newark, NJ",
    "Oakland, CA",
    "Seattle, WA",
    "Kansas City, MO",
];

const EXCEPTION_REASONS: [&str; 4] = [
    "Delivery exception: address could not be verified",
    "Delivery exception: package damaged in transit",
    "Delivery exception: weather delay at facility",
    "Delivery exception: recipient unavailable",
];

const FALLBACK_LOCATION: &str = "Distribution Center";

// Salts keep each derived quantity independent of the others.
const SALT_ORIGIN: u64 = 1;
const SALT_DESTINATION: u64 = 2;
const SALT_BACKDATE: u64 = 3;
const SALT_HUB_COUNT: u64 = 4;
const SALT_EXCEPTION: u64 = 5;
const SALT_EXCEPTION_AT: u64 = 6;
const SALT_EXCEPTION_REASON: u64 = 7;
const SALT_GAP_BASE: u64 = 100;
const SALT_HUB_BASE: u64 = 200;

/// Derives the simulation seed from a tracking number (64-bit FNV-1a).
#[must_use]
pub fn seed_for(tracking_number: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    tracking_number
        .bytes()
        .fold(OFFSET, |hash, b| (hash ^ u64::from(b)).wrapping_mul(PRIME))
}

/// Mixes a seed with a salt into a well-distributed 64-bit value
/// (splitmix64 finalizer).
#[must_use]
pub fn mix(seed: u64, salt: u64) -> u64 {
    let mut z = seed ^ salt.wrapping_mul(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Uniform pick in `lo..=hi`.
fn pick(seed: u64, salt: u64, lo: i64, hi: i64) -> i64 {
    let span = u64::try_from(hi.saturating_sub(lo)).unwrap_or(0).saturating_add(1);
    let offset = i64::try_from(mix(seed, salt) % span).unwrap_or(0);
    lo.saturating_add(offset)
}

fn hub(index: u64) -> &'static str {
    let len = HUBS.len() as u64;
    usize::try_from(index % len)
        .ok()
        .and_then(|i| HUBS.get(i))
        .copied()
        .unwrap_or(FALLBACK_LOCATION)
}

/// Full event plan for one seed and anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    /// Origin hub label.
    pub origin: String,
    /// Destination hub label.
    pub destination: String,
    /// Every planned event, chronological.
    pub events: Vec<TrackingEvent>,
    /// Planned delivery instant (the `DELIVERED` slot, even when the plan
    /// ends in an exception first).
    pub estimated_delivery: Timestamp,
}

impl Schedule {
    /// Returns the events visible at `now`.
    #[must_use]
    pub fn visible_at(&self, now: Timestamp) -> Vec<TrackingEvent> {
        self.events
            .iter()
            .take_while(|e| !e.timestamp().is_after(&now))
            .cloned()
            .collect()
    }

    /// Returns true if the plan ends in an exception.
    #[must_use]
    pub fn ends_in_exception(&self) -> bool {
        self.events
            .last()
            .is_some_and(|e| e.status() == TrackingStatus::Exception)
    }
}

/// Derives the complete event plan.
///
/// The `CREATED` event sits 6 to 48 hours before `anchor`, so a freshly
/// anchored history already shows some progress. Roughly one seed in
/// [`EXCEPTION_ONE_IN`] replaces a later step with an `EXCEPTION` and stops.
#[must_use]
pub fn derive_schedule(seed: u64, anchor: Timestamp) -> Schedule {
    let origin_index = mix(seed, SALT_ORIGIN);
    let origin = hub(origin_index);
    let hops = HUBS.len() as u64 - 1;
    // Offset 1..=hops from the origin, so the destination always differs.
    let destination =
        hub(origin_index % HUBS.len() as u64 + 1 + mix(seed, SALT_DESTINATION) % hops);

    let backdate = pick(seed, SALT_BACKDATE, MIN_BACKDATE_MINUTES, MAX_BACKDATE_MINUTES);
    let mut at = anchor.add_secs(-backdate * 60);
    let mut gap_salt = SALT_GAP_BASE;
    let mut advance = |at: &mut Timestamp, lo_min: i64, hi_min: i64| {
        gap_salt += 1;
        *at = at.add_secs(pick(seed, gap_salt, lo_min, hi_min) * 60);
        *at
    };

    let mut events = vec![TrackingEvent::new(
        at,
        TrackingStatus::Created,
        origin,
        "Shipping label created",
    )];
    events.push(TrackingEvent::new(
        advance(&mut at, 120, 480),
        TrackingStatus::PickedUp,
        origin,
        "Package picked up",
    ));
    events.push(TrackingEvent::new(
        advance(&mut at, 240, 720),
        TrackingStatus::InTransit,
        origin,
        "Departed origin facility",
    ));

    let hub_count = pick(seed, SALT_HUB_COUNT, 1, 3);
    for i in 0..hub_count {
        let salt = SALT_HUB_BASE + u64::try_from(i).unwrap_or(0);
        let location = hub(mix(seed, salt));
        events.push(TrackingEvent::new(
            advance(&mut at, 480, 1200),
            TrackingStatus::InTransit,
            location,
            "Arrived at sort facility",
        ));
    }

    events.push(TrackingEvent::new(
        advance(&mut at, 360, 960),
        TrackingStatus::InTransit,
        destination,
        "Arrived at destination facility",
    ));
    events.push(TrackingEvent::new(
        advance(&mut at, 480, 840),
        TrackingStatus::OutForDelivery,
        destination,
        "Out for delivery",
    ));
    let delivered_at = advance(&mut at, 120, 480);
    events.push(TrackingEvent::new(
        delivered_at,
        TrackingStatus::Delivered,
        destination,
        "Delivered",
    ));

    if mix(seed, SALT_EXCEPTION) % EXCEPTION_ONE_IN == 0 {
        // Any step after CREATED may turn into the exception.
        let steps = events.len() as u64 - 1;
        let at_index = usize::try_from(1 + mix(seed, SALT_EXCEPTION_AT) % steps).unwrap_or(1);
        let reasons = EXCEPTION_REASONS.len() as u64;
        let reason_index =
            usize::try_from(mix(seed, SALT_EXCEPTION_REASON) % reasons).unwrap_or(0);
        if let Some(replaced) = events.get(at_index).cloned() {
            events.truncate(at_index);
            events.push(TrackingEvent::new(
                replaced.timestamp(),
                TrackingStatus::Exception,
                replaced.location(),
                EXCEPTION_REASONS
                    .get(reason_index)
                    .copied()
                    .unwrap_or("Delivery exception"),
            ));
        }
    }

    Schedule {
        origin: origin.to_string(),
        destination: destination.to_string(),
        events,
        estimated_delivery: delivered_at,
    }
}

/// Start of the seed-shifted epoch containing `now`.
///
/// Used as the anchor when no synthesis cache is available: stable for a
/// whole epoch, so repeated lookups within it see the same history grow.
#[must_use]
pub fn epoch_anchor(seed: u64, now: Timestamp, epoch_secs: u64) -> Timestamp {
    let epoch = i64::try_from(epoch_secs.max(1)).unwrap_or(i64::MAX);
    let phase = i64::try_from(seed % epoch_secs.max(1)).unwrap_or(0);
    let shifted = now.timestamp_secs().saturating_sub(phase);
    let start = shifted
        .div_euclid(epoch)
        .saturating_mul(epoch)
        .saturating_add(phase);
    Timestamp::from_secs(start).unwrap_or(now)
}

/// Synthesises the history visible at `now` for a schedule anchored at
/// `anchor`.
///
/// # Errors
///
/// Returns a `DomainError` only if the derived schedule violates a history
/// invariant, which the schedule construction rules out.
pub fn history_at(
    tracking_number: &TrackingNumber,
    anchor: Timestamp,
    now: Timestamp,
) -> DomainResult<TrackingHistory> {
    let schedule = derive_schedule(seed_for(tracking_number.as_str()), anchor);
    let visible = schedule.visible_at(now);
    let history =
        TrackingHistory::from_events(tracking_number.clone(), SIMULATED_CARRIER, visible)?
            .with_route(schedule.origin, schedule.destination)
            .with_estimated_delivery(schedule.estimated_delivery);
    Ok(history)
}
