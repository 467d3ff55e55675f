//! # Tracking History
//!
//! Ordered, append-only sequence of status events for one tracking number.
//!
//! # Invariants
//!
//! - the first event is `CREATED`
//! - timestamps never decrease
//! - every consecutive pair of statuses is a valid transition
//! - nothing follows a terminal status (`DELIVERED`, `EXCEPTION`)
//!
//! Deserialization re-applies these checks, so a history received from an
//! upstream carrier is as trustworthy as one built locally.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::tracking_status::TrackingStatus;
use crate::domain::value_objects::TrackingNumber;
use serde::{Deserialize, Serialize};

/// A single status event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEvent {
    timestamp: Timestamp,
    status: TrackingStatus,
    location: String,
    description: String,
}

impl TrackingEvent {
    /// Creates an event.
    #[must_use]
    pub fn new(
        timestamp: Timestamp,
        status: TrackingStatus,
        location: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            status,
            location: location.into(),
            description: description.into(),
        }
    }

    /// Returns when the event happened.
    #[inline]
    #[must_use]
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Returns the status entered by this event.
    #[inline]
    #[must_use]
    pub fn status(&self) -> TrackingStatus {
        self.status
    }

    /// Returns the location label.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Returns the free-text description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Tracking history for one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawTrackingHistory")]
pub struct TrackingHistory {
    tracking_number: TrackingNumber,
    carrier: String,
    current_status: TrackingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    estimated_delivery: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    delivered_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    destination: Option<String>,
    events: Vec<TrackingEvent>,
}

impl TrackingHistory {
    /// Starts a history with its `CREATED` event.
    #[must_use]
    pub fn start(
        tracking_number: TrackingNumber,
        carrier: impl Into<String>,
        created_at: Timestamp,
        location: impl Into<String>,
    ) -> Self {
        Self {
            tracking_number,
            carrier: carrier.into(),
            current_status: TrackingStatus::Created,
            estimated_delivery: None,
            delivered_at: None,
            origin: None,
            destination: None,
            events: vec![TrackingEvent::new(
                created_at,
                TrackingStatus::Created,
                location,
                "Shipping label created",
            )],
        }
    }

    /// Builds a history from a complete event list, validating every step.
    ///
    /// # Errors
    ///
    /// Returns the first invariant violation found.
    pub fn from_events(
        tracking_number: TrackingNumber,
        carrier: impl Into<String>,
        events: Vec<TrackingEvent>,
    ) -> DomainResult<Self> {
        let mut iter = events.into_iter();
        let first = iter
            .next()
            .ok_or_else(|| DomainError::validation("tracking history has no events"))?;
        if first.status() != TrackingStatus::Created {
            return Err(DomainError::MissingCreatedEvent(first.status()));
        }

        let mut history = Self {
            tracking_number,
            carrier: carrier.into(),
            current_status: TrackingStatus::Created,
            estimated_delivery: None,
            delivered_at: None,
            origin: None,
            destination: None,
            events: vec![first],
        };
        for event in iter {
            history.append(event)?;
        }
        Ok(history)
    }

    /// Appends an event.
    ///
    /// # Errors
    ///
    /// - `DomainError::HistoryTerminated` if the history is already terminal
    /// - `DomainError::EventOutOfOrder` if the event predates the last one
    /// - `DomainError::InvalidStateTransition` if the status jump is invalid
    pub fn append(&mut self, event: TrackingEvent) -> DomainResult<()> {
        if self.current_status.is_terminal() {
            return Err(DomainError::HistoryTerminated(self.current_status));
        }
        if let Some(last) = self.events.last()
            && event.timestamp().is_before(&last.timestamp())
        {
            return Err(DomainError::EventOutOfOrder {
                previous: last.timestamp(),
                next: event.timestamp(),
            });
        }
        if !self.current_status.can_transition_to(event.status()) {
            return Err(DomainError::InvalidStateTransition {
                from: self.current_status,
                to: event.status(),
            });
        }

        self.current_status = event.status();
        match event.status() {
            TrackingStatus::Delivered => {
                self.delivered_at = Some(event.timestamp());
                self.estimated_delivery = None;
            }
            TrackingStatus::Exception => self.estimated_delivery = None,
            _ => {}
        }
        self.events.push(event);
        Ok(())
    }

    /// Sets the origin and destination labels.
    #[must_use]
    pub fn with_route(mut self, origin: impl Into<String>, destination: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self.destination = Some(destination.into());
        self
    }

    /// Sets the estimated delivery time; ignored once terminal.
    #[must_use]
    pub fn with_estimated_delivery(mut self, eta: Timestamp) -> Self {
        if !self.current_status.is_terminal() {
            self.estimated_delivery = Some(eta);
        }
        self
    }

    /// Returns the tracking number.
    #[must_use]
    pub fn tracking_number(&self) -> &TrackingNumber {
        &self.tracking_number
    }

    /// Returns the carrier name.
    #[must_use]
    pub fn carrier(&self) -> &str {
        &self.carrier
    }

    /// Returns the status of the latest event.
    #[inline]
    #[must_use]
    pub fn current_status(&self) -> TrackingStatus {
        self.current_status
    }

    /// Returns the estimated delivery time, if still pending.
    #[must_use]
    pub fn estimated_delivery(&self) -> Option<Timestamp> {
        self.estimated_delivery
    }

    /// Returns when the package was delivered.
    #[must_use]
    pub fn delivered_at(&self) -> Option<Timestamp> {
        self.delivered_at
    }

    /// Returns the origin label.
    #[must_use]
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Returns the destination label.
    #[must_use]
    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    /// Returns the events in chronological order.
    #[must_use]
    pub fn events(&self) -> &[TrackingEvent] {
        &self.events
    }

    /// Returns the most recent event.
    #[must_use]
    pub fn latest_event(&self) -> Option<&TrackingEvent> {
        self.events.last()
    }

    /// Returns true once a terminal status has been reached.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.current_status.is_terminal()
    }

    /// Returns true if this history's events are a prefix of `other`'s.
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        self.tracking_number == other.tracking_number
            && other.events.starts_with(&self.events)
    }
}

/// Wire form used to re-validate incoming histories.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTrackingHistory {
    tracking_number: TrackingNumber,
    carrier: String,
    #[serde(default)]
    current_status: Option<TrackingStatus>,
    #[serde(default)]
    estimated_delivery: Option<Timestamp>,
    #[serde(default)]
    delivered_at: Option<Timestamp>,
    #[serde(default)]
    origin: Option<String>,
    #[serde(default)]
    destination: Option<String>,
    events: Vec<TrackingEvent>,
}

impl TryFrom<RawTrackingHistory> for TrackingHistory {
    type Error = DomainError;

    fn try_from(raw: RawTrackingHistory) -> Result<Self, Self::Error> {
        let mut history = Self::from_events(raw.tracking_number, raw.carrier, raw.events)?;
        if let Some(claimed) = raw.current_status
            && claimed != history.current_status
        {
            return Err(DomainError::validation(format!(
                "currentStatus {claimed} does not match last event {}",
                history.current_status
            )));
        }
        if let Some(delivered_at) = raw.delivered_at {
            history.delivered_at = Some(delivered_at);
        }
        history.origin = raw.origin;
        history.destination = raw.destination;
        if let Some(eta) = raw.estimated_delivery {
            history = history.with_estimated_delivery(eta);
        }
        Ok(history)
    }
}
