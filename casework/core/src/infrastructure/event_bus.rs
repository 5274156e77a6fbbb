// Event Bus Implementation - Pub/Sub for Domain Events
//
// Provides in-memory event streaming using tokio broadcast channels.
// Carries the subsystem's outbound events (relationship responses and
// notifications, hearing/application status changes) to the hosting
// platform's publishers and to test observers.
//
// In-memory only: durable delivery to other bounded contexts is owned by
// the hosting platform's message infrastructure.

use crate::domain::events::{ApplicationEvent, HearingEvent, RelationshipEvent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::domain::case::CaseId;

/// Unified domain event type for the event bus
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    Relationship(RelationshipEvent),
    Hearing(HearingEvent),
    Application(ApplicationEvent),
}

/// Event bus for publishing and subscribing to domain events
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with specified channel capacity
    /// Capacity determines how many events can be buffered before dropping old ones
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Create event bus with default capacity (1000)
    pub fn with_default_capacity() -> Self {
        Self::new(1000)
    }

    /// Publish a relationship event
    pub fn publish_relationship_event(&self, event: RelationshipEvent) {
        self.publish(DomainEvent::Relationship(event));
    }

    /// Publish a hearing event
    pub fn publish_hearing_event(&self, event: HearingEvent) {
        self.publish(DomainEvent::Hearing(event));
    }

    /// Publish an application event
    pub fn publish_application_event(&self, event: ApplicationEvent) {
        self.publish(DomainEvent::Application(event));
    }

    /// Publish a domain event to all subscribers
    fn publish(&self, event: DomainEvent) {
        debug!("Publishing event: {:?}", event);

        let receiver_count = self.sender.send(event).unwrap_or(0);

        if receiver_count == 0 {
            debug!("No subscribers listening to event");
        }
    }

    /// Subscribe to all domain events
    pub fn subscribe(&self) -> EventReceiver {
        let receiver = self.sender.subscribe();
        EventReceiver { receiver }
    }

    /// Subscribe and filter for relationship events led by a specific case.
    /// Useful for observing a single saga's outbound traffic.
    pub fn subscribe_case(&self, case_id: CaseId) -> CaseEventReceiver {
        let receiver = self.sender.subscribe();
        CaseEventReceiver { receiver, case_id }
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Receiver for all domain events
pub struct EventReceiver {
    receiver: broadcast::Receiver<DomainEvent>,
}

impl EventReceiver {
    /// Receive the next event (blocks until event is available)
    pub async fn recv(&mut self) -> Result<DomainEvent, EventBusError> {
        self.receiver.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Closed => EventBusError::Closed,
            broadcast::error::RecvError::Lagged(n) => {
                warn!("Event receiver lagged by {} events", n);
                EventBusError::Lagged(n)
            }
        })
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&mut self) -> Result<DomainEvent, EventBusError> {
        self.receiver.try_recv().map_err(|e| match e {
            broadcast::error::TryRecvError::Empty => EventBusError::Empty,
            broadcast::error::TryRecvError::Closed => EventBusError::Closed,
            broadcast::error::TryRecvError::Lagged(n) => {
                warn!("Event receiver lagged by {} events", n);
                EventBusError::Lagged(n)
            }
        })
    }
}

/// Receiver for relationship events of a single case (filtered)
pub struct CaseEventReceiver {
    receiver: broadcast::Receiver<DomainEvent>,
    case_id: CaseId,
}

impl CaseEventReceiver {
    /// Receive the next relationship event whose lead/origin case matches.
    /// Events for other cases are filtered out.
    pub async fn recv(&mut self) -> Result<RelationshipEvent, EventBusError> {
        loop {
            let event = self.receiver.recv().await.map_err(|e| match e {
                broadcast::error::RecvError::Closed => EventBusError::Closed,
                broadcast::error::RecvError::Lagged(n) => {
                    warn!("Event receiver lagged by {} events", n);
                    EventBusError::Lagged(n)
                }
            })?;

            if let DomainEvent::Relationship(rel_event) = event {
                if self.matches_case(&rel_event) {
                    return Ok(rel_event);
                }
            }
            // Continue loop if event doesn't match
        }
    }

    fn matches_case(&self, event: &RelationshipEvent) -> bool {
        match event {
            RelationshipEvent::ResponseIssued { origin_case_id, .. } => {
                origin_case_id == &self.case_id
            }
            RelationshipEvent::CaseRelationshipNotified { lead_case_id, .. } => {
                lead_case_id == &self.case_id
            }
        }
    }
}

/// Errors that can occur when receiving events
#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("Event bus is closed")]
    Closed,

    #[error("No events available")]
    Empty,

    #[error("Receiver lagged by {0} events (events were dropped)")]
    Lagged(u64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::linkage::{LinkageKind, ValidationOutcome};
    use chrono::Utc;

    #[tokio::test]
    async fn test_event_bus_publish_subscribe() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe();

        let origin = CaseId::new();
        event_bus.publish_relationship_event(RelationshipEvent::ResponseIssued {
            origin_case_id: origin,
            kind: LinkageKind::Link,
            outcome: ValidationOutcome::Success,
            issued_at: Utc::now(),
        });

        let received = receiver.recv().await.unwrap();
        match received {
            DomainEvent::Relationship(RelationshipEvent::ResponseIssued {
                origin_case_id, ..
            }) => {
                assert_eq!(origin_case_id, origin);
            }
            _ => panic!("Wrong event type received"),
        }
    }

    #[tokio::test]
    async fn test_case_event_filtering() {
        let event_bus = EventBus::new(10);
        let case_id = CaseId::new();
        let other_case_id = CaseId::new();

        let mut receiver = event_bus.subscribe_case(case_id);

        // Event for a different case (should be filtered out)
        event_bus.publish_relationship_event(RelationshipEvent::ResponseIssued {
            origin_case_id: other_case_id,
            kind: LinkageKind::Merge,
            outcome: ValidationOutcome::Success,
            issued_at: Utc::now(),
        });

        // Event for our case (should be received)
        event_bus.publish_relationship_event(RelationshipEvent::ResponseIssued {
            origin_case_id: case_id,
            kind: LinkageKind::Merge,
            outcome: ValidationOutcome::Success,
            issued_at: Utc::now(),
        });

        let received = receiver.recv().await.unwrap();
        match received {
            RelationshipEvent::ResponseIssued { origin_case_id, .. } => {
                assert_eq!(origin_case_id, case_id);
            }
            _ => panic!("Wrong event type received"),
        }
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let event_bus = EventBus::new(10);
        let mut receiver1 = event_bus.subscribe();
        let mut receiver2 = event_bus.subscribe();

        assert_eq!(event_bus.subscriber_count(), 2);

        event_bus.publish_relationship_event(RelationshipEvent::ResponseIssued {
            origin_case_id: CaseId::new(),
            kind: LinkageKind::Split,
            outcome: ValidationOutcome::Success,
            issued_at: Utc::now(),
        });

        // Both receivers should get the event
        let _ = receiver1.recv().await.unwrap();
        let _ = receiver2.recv().await.unwrap();
    }
}
