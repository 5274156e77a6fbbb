// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Integration tests for the hearing-linkage lifecycle and the court
//! application progression saga family.
//!
//! Exercised through the application services over the in-memory
//! repositories, covering idempotent redelivery, the no-skip guard, the
//! retryable prosecution-case lookup, and the independence of the
//! application and hearing state tracks.

use std::sync::Arc;

use chrono::Utc;

use caselink_core::application::application_progression::CourtApplicationProgressionService;
use caselink_core::application::hearing_lifecycle::HearingLifecycleService;
use caselink_core::application::retry::ProcessingError;
use caselink_core::domain::case::{CaseDetail, CaseId, HearingId};
use caselink_core::domain::court_application::ApplicationStatus;
use caselink_core::domain::events::HearingEvent;
use caselink_core::domain::hearing::{HearingLinkageStatus, LinkageSubject};
use caselink_core::domain::repository::{CourtApplicationRepository, HearingLinkageRepository};
use caselink_core::infrastructure::event_bus::{DomainEvent, EventBus, EventReceiver};
use caselink_core::infrastructure::read_model::InMemoryReadModelGateway;
use caselink_core::infrastructure::relationship_store::InMemoryRelationshipStore;
use caselink_core::infrastructure::repositories::{
    InMemoryCourtApplicationRepository, InMemoryHearingLinkageRepository,
};

struct Harness {
    linkages: Arc<InMemoryHearingLinkageRepository>,
    applications: Arc<InMemoryCourtApplicationRepository>,
    gateway: Arc<InMemoryReadModelGateway>,
    event_bus: Arc<EventBus>,
    hearings: Arc<HearingLifecycleService>,
    progression: CourtApplicationProgressionService,
}

fn harness() -> Harness {
    let store = Arc::new(InMemoryRelationshipStore::new());
    let gateway = Arc::new(InMemoryReadModelGateway::new(store));
    let linkages = Arc::new(InMemoryHearingLinkageRepository::new());
    let applications = Arc::new(InMemoryCourtApplicationRepository::new());
    let event_bus = Arc::new(EventBus::new(64));
    let hearings = Arc::new(HearingLifecycleService::new(
        linkages.clone(),
        event_bus.clone(),
    ));
    let progression = CourtApplicationProgressionService::new(
        applications.clone(),
        gateway.clone(),
        hearings.clone(),
        event_bus.clone(),
    );
    Harness {
        linkages,
        applications,
        gateway,
        event_bus,
        hearings,
        progression,
    }
}

fn register_case(harness: &Harness, urn: &str) -> CaseId {
    let detail = CaseDetail {
        id: CaseId::new(),
        urn: urn.to_string(),
        prosecutor_reference: None,
        received_at: Utc::now(),
    };
    let id = detail.id;
    harness.gateway.register_case(detail);
    id
}

fn drain(receiver: &mut EventReceiver) -> Vec<DomainEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

fn hearing_changes(events: &[DomainEvent]) -> Vec<(HearingLinkageStatus, HearingLinkageStatus)> {
    events
        .iter()
        .filter_map(|event| match event {
            DomainEvent::Hearing(HearingEvent::StatusChanged { from, to, .. }) => {
                Some((*from, *to))
            }
            _ => None,
        })
        .collect()
}

async fn status_of(
    harness: &Harness,
    hearing_id: HearingId,
    subject: LinkageSubject,
) -> HearingLinkageStatus {
    harness
        .linkages
        .find(hearing_id, subject)
        .await
        .unwrap()
        .expect("linkage should exist")
        .status
}

#[tokio::test]
async fn test_full_hearing_lifecycle_for_a_case() {
    let h = harness();
    let hearing_id = HearingId::new();
    let subject = LinkageSubject::Case {
        case_id: CaseId::new(),
    };
    let mut receiver = h.event_bus.subscribe();

    h.hearings.initiate(hearing_id, &[subject]).await.unwrap();
    h.hearings
        .send_for_listing(hearing_id, &[subject])
        .await
        .unwrap();
    h.hearings.confirm(hearing_id, &[subject]).await.unwrap();

    assert_eq!(
        status_of(&h, hearing_id, subject).await,
        HearingLinkageStatus::HearingConfirmed
    );

    let changes = hearing_changes(&drain(&mut receiver));
    assert_eq!(
        changes,
        vec![
            (
                HearingLinkageStatus::Unallocated,
                HearingLinkageStatus::HearingInitialised
            ),
            (
                HearingLinkageStatus::HearingInitialised,
                HearingLinkageStatus::SentForListing
            ),
            (
                HearingLinkageStatus::SentForListing,
                HearingLinkageStatus::HearingConfirmed
            ),
        ]
    );
}

#[tokio::test]
async fn test_redelivered_send_for_listing_is_a_logged_no_op() {
    let h = harness();
    let hearing_id = HearingId::new();
    let subject = LinkageSubject::Case {
        case_id: CaseId::new(),
    };

    h.hearings.initiate(hearing_id, &[subject]).await.unwrap();
    h.hearings
        .send_for_listing(hearing_id, &[subject])
        .await
        .unwrap();

    let mut receiver = h.event_bus.subscribe();
    // Redelivery: must not fail and must not change or re-announce status.
    h.hearings
        .send_for_listing(hearing_id, &[subject])
        .await
        .unwrap();

    assert_eq!(
        status_of(&h, hearing_id, subject).await,
        HearingLinkageStatus::SentForListing
    );
    assert!(hearing_changes(&drain(&mut receiver)).is_empty());
}

#[tokio::test]
async fn test_out_of_order_transition_is_retryable() {
    let h = harness();
    let hearing_id = HearingId::new();
    let subject = LinkageSubject::Case {
        case_id: CaseId::new(),
    };

    // The listing request arrived before the initiation event.
    let error = h
        .hearings
        .send_for_listing(hearing_id, &[subject])
        .await
        .unwrap_err();
    assert!(error.is_retryable());

    // The intermediate state was not skipped into existence.
    assert!(h.linkages.find(hearing_id, subject).await.unwrap().is_none());
}

#[tokio::test]
async fn test_confirmation_cannot_skip_listing() {
    let h = harness();
    let hearing_id = HearingId::new();
    let subject = LinkageSubject::Case {
        case_id: CaseId::new(),
    };

    h.hearings.initiate(hearing_id, &[subject]).await.unwrap();

    let error = h.hearings.confirm(hearing_id, &[subject]).await.unwrap_err();
    assert!(error.is_retryable());
    assert_eq!(
        status_of(&h, hearing_id, subject).await,
        HearingLinkageStatus::HearingInitialised
    );
}

#[tokio::test]
async fn test_initiate_covers_multiple_subjects() {
    let h = harness();
    let hearing_id = HearingId::new();
    let case_subject = LinkageSubject::Case {
        case_id: CaseId::new(),
    };
    let application_subject = LinkageSubject::Application {
        application_id: caselink_core::domain::case::ApplicationId::new(),
    };

    h.hearings
        .initiate(hearing_id, &[case_subject, application_subject])
        .await
        .unwrap();

    assert_eq!(h.linkages.find_by_hearing(hearing_id).await.unwrap().len(), 2);
    assert_eq!(
        status_of(&h, hearing_id, application_subject).await,
        HearingLinkageStatus::HearingInitialised
    );
}

#[tokio::test]
async fn test_application_registration_requires_visible_case() {
    let h = harness();

    // Case not yet projected into the read model.
    let error = h
        .progression
        .register(CaseId::new(), "APP-2026-0001")
        .await
        .unwrap_err();
    assert!(matches!(error, ProcessingError::Retryable(_)));

    // Once projected, registration succeeds.
    let case_id = register_case(&h, "10AA0000001");
    let application_id = h
        .progression
        .register(case_id, "APP-2026-0001")
        .await
        .unwrap();

    let stored = h
        .applications
        .find_by_id(application_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ApplicationStatus::Draft);
    assert_eq!(stored.prosecution_case_id, case_id);
}

#[tokio::test]
async fn test_referral_progresses_application_and_initiates_hearing() {
    let h = harness();
    let case_id = register_case(&h, "10AA0000001");
    let application_id = h
        .progression
        .register(case_id, "APP-2026-0002")
        .await
        .unwrap();
    h.progression.submit(application_id).await.unwrap();

    let hearing_id = HearingId::new();
    h.progression
        .refer_to_hearing(application_id, hearing_id)
        .await
        .unwrap();

    let application = h
        .applications
        .find_by_id(application_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(application.status, ApplicationStatus::InProgress);

    let subject = LinkageSubject::Application { application_id };
    assert_eq!(
        status_of(&h, hearing_id, subject).await,
        HearingLinkageStatus::HearingInitialised
    );
}

#[tokio::test]
async fn test_application_listed_while_hearing_awaits_confirmation() {
    let h = harness();
    let case_id = register_case(&h, "10AA0000001");
    let application_id = h
        .progression
        .register(case_id, "APP-2026-0003")
        .await
        .unwrap();
    h.progression.submit(application_id).await.unwrap();

    let hearing_id = HearingId::new();
    h.progression
        .refer_to_hearing(application_id, hearing_id)
        .await
        .unwrap();
    h.progression
        .approve_summons(application_id, hearing_id)
        .await
        .unwrap();

    // The two state tracks diverge here: the application is LISTED while
    // the hearing is still awaiting the listing context's confirmation.
    let application = h
        .applications
        .find_by_id(application_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(application.status, ApplicationStatus::Listed);

    let subject = LinkageSubject::Application { application_id };
    assert_eq!(
        status_of(&h, hearing_id, subject).await,
        HearingLinkageStatus::SentForListing
    );

    h.progression
        .confirm_hearing(application_id, hearing_id)
        .await
        .unwrap();
    assert_eq!(
        status_of(&h, hearing_id, subject).await,
        HearingLinkageStatus::HearingConfirmed
    );
    let application = h
        .applications
        .find_by_id(application_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(application.status, ApplicationStatus::Listed);
}

#[tokio::test]
async fn test_referral_before_application_projection_is_retryable() {
    let h = harness();
    let error = h
        .progression
        .refer_to_hearing(
            caselink_core::domain::case::ApplicationId::new(),
            HearingId::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(error, ProcessingError::Retryable(_)));
}
