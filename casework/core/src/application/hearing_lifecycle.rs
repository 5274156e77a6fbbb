// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Hearing Lifecycle Service
//!
//! Drives the hearing-linkage state machine for sets of cases and
//! applications attached to a hearing. Several independent sagas (court
//! application referral, extension, confirmation) consume these operations;
//! the guards in the domain aggregate make every one of them idempotent
//! under at-least-once redelivery.

use anyhow::Context;
use std::sync::Arc;
use tracing::{debug, info};

use crate::application::retry::{retry_out_of_order, ProcessingError};
use crate::domain::case::HearingId;
use crate::domain::events::HearingEvent;
use crate::domain::hearing::{
    HearingLinkage, HearingLinkageStatus, LinkageSubject, TransitionRejection,
};
use crate::domain::repository::HearingLinkageRepository;
use crate::infrastructure::event_bus::EventBus;

pub struct HearingLifecycleService {
    linkages: Arc<dyn HearingLinkageRepository>,
    event_bus: Arc<EventBus>,
}

impl HearingLifecycleService {
    pub fn new(linkages: Arc<dyn HearingLinkageRepository>, event_bus: Arc<EventBus>) -> Self {
        Self { linkages, event_bus }
    }

    /// UNALLOCATED → HEARING_INITIALISED for every subject. Fired when a
    /// hearing is first created from a referral, box-work allocation or
    /// application proceeding.
    pub async fn initiate(
        &self,
        hearing_id: HearingId,
        subjects: &[LinkageSubject],
    ) -> Result<(), ProcessingError> {
        self.apply(hearing_id, subjects, HearingLinkageStatus::HearingInitialised)
            .await
    }

    /// HEARING_INITIALISED → SENT_FOR_LISTING once listing needs are handed
    /// to the listing context.
    pub async fn send_for_listing(
        &self,
        hearing_id: HearingId,
        subjects: &[LinkageSubject],
    ) -> Result<(), ProcessingError> {
        self.apply(hearing_id, subjects, HearingLinkageStatus::SentForListing)
            .await
    }

    /// SENT_FOR_LISTING → HEARING_CONFIRMED when the listing context
    /// reports a confirmed allocation.
    pub async fn confirm(
        &self,
        hearing_id: HearingId,
        subjects: &[LinkageSubject],
    ) -> Result<(), ProcessingError> {
        self.apply(hearing_id, subjects, HearingLinkageStatus::HearingConfirmed)
            .await
    }

    async fn apply(
        &self,
        hearing_id: HearingId,
        subjects: &[LinkageSubject],
        target: HearingLinkageStatus,
    ) -> Result<(), ProcessingError> {
        for subject in subjects {
            let mut linkage = self
                .linkages
                .find(hearing_id, *subject)
                .await
                .context("Failed to load hearing linkage")?
                .unwrap_or_else(|| HearingLinkage::new(hearing_id, *subject));

            let attempt = match target {
                HearingLinkageStatus::HearingInitialised => linkage.initiate(),
                HearingLinkageStatus::SentForListing => linkage.send_for_listing(),
                HearingLinkageStatus::HearingConfirmed => linkage.confirm(),
                HearingLinkageStatus::Unallocated => continue,
            };

            match attempt {
                Ok(transition) => {
                    self.linkages
                        .save(&linkage)
                        .await
                        .context("Failed to save hearing linkage")?;
                    info!(
                        hearing = %hearing_id,
                        subject = %subject,
                        from = %transition.from,
                        to = %transition.to,
                        "Hearing linkage status changed"
                    );
                    self.event_bus
                        .publish_hearing_event(HearingEvent::StatusChanged {
                            hearing_id,
                            subject: *subject,
                            from: transition.from,
                            to: transition.to,
                            changed_at: transition.at,
                        });
                }
                Err(TransitionRejection::AlreadyAtOrBeyond { current, target }) => {
                    // Redelivered transition: already recorded, carry on.
                    debug!(
                        hearing = %hearing_id,
                        subject = %subject,
                        current = %current,
                        target = %target,
                        "Ignoring redelivered hearing transition"
                    );
                }
                Err(rejection @ TransitionRejection::SkipsIntermediate { .. }) => {
                    return Err(retry_out_of_order(
                        rejection,
                        format!("{hearing_id}/{subject}"),
                    ));
                }
            }
        }
        Ok(())
    }
}
