// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Court Application Progression
//!
//! The saga family that moves a court application through its lifecycle
//! (DRAFT → UN_ALLOCATED → IN_PROGRESS → LISTED) and drives the linked
//! hearing's state machine alongside it. The two tracks are deliberately
//! independent: an application is LISTED as soon as listing is requested,
//! while its hearing stays SENT_FOR_LISTING until the listing context
//! confirms.
//!
//! The prosecution-case lookup on referral is the canonical
//! retryable-lookup site: an application can arrive before the case it
//! references has been projected into the local read model, and the
//! hosting layer redelivers until it is.

use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::application::hearing_lifecycle::HearingLifecycleService;
use crate::application::retry::{require, ProcessingError};
use crate::domain::case::{ApplicationId, CaseId, HearingId};
use crate::domain::court_application::{
    ApplicationStatus, ApplicationStatusRejection, CourtApplication,
};
use crate::domain::events::ApplicationEvent;
use crate::domain::hearing::LinkageSubject;
use crate::domain::repository::CourtApplicationRepository;
use crate::infrastructure::event_bus::EventBus;
use crate::infrastructure::read_model::ReadModelGateway;

pub struct CourtApplicationProgressionService {
    applications: Arc<dyn CourtApplicationRepository>,
    gateway: Arc<dyn ReadModelGateway>,
    hearings: Arc<HearingLifecycleService>,
    event_bus: Arc<EventBus>,
}

impl CourtApplicationProgressionService {
    pub fn new(
        applications: Arc<dyn CourtApplicationRepository>,
        gateway: Arc<dyn ReadModelGateway>,
        hearings: Arc<HearingLifecycleService>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            applications,
            gateway,
            hearings,
            event_bus,
        }
    }

    /// Record a newly drafted application against a prosecution case.
    ///
    /// The case must already be visible in the read model; if its creation
    /// event has not been projected yet, the registration is redelivered.
    pub async fn register(
        &self,
        prosecution_case_id: CaseId,
        reference: &str,
    ) -> Result<ApplicationId, ProcessingError> {
        require(
            "prosecution case",
            prosecution_case_id.to_string(),
            self.gateway
                .find_case_by_id(prosecution_case_id)
                .await
                .context("Failed to look up prosecution case")?,
        )?;

        let application = CourtApplication::new(prosecution_case_id, reference);
        let id = application.id;
        self.applications
            .save(&application)
            .await
            .context("Failed to save court application")?;
        info!(application = %id, case = %prosecution_case_id, "Court application registered");
        Ok(id)
    }

    /// DRAFT → UN_ALLOCATED on submission.
    pub async fn submit(&self, application_id: ApplicationId) -> Result<(), ProcessingError> {
        let mut application = self.load(application_id).await?;
        self.advance(&mut application, CourtApplication::submit).await
    }

    /// Referral to box-work or a court hearing: the application moves to
    /// IN_PROGRESS and its hearing linkage is initiated.
    pub async fn refer_to_hearing(
        &self,
        application_id: ApplicationId,
        hearing_id: HearingId,
    ) -> Result<(), ProcessingError> {
        let mut application = self.load(application_id).await?;

        require(
            "prosecution case",
            application.prosecution_case_id.to_string(),
            self.gateway
                .find_case_by_id(application.prosecution_case_id)
                .await
                .context("Failed to look up prosecution case")?,
        )?;

        self.advance(&mut application, CourtApplication::begin_progress)
            .await?;

        self.hearings
            .initiate(hearing_id, &[LinkageSubject::Application { application_id }])
            .await
    }

    /// Summons approval: listing needs are handed over, the application is
    /// LISTED. The hearing itself stays SENT_FOR_LISTING until confirmed.
    pub async fn approve_summons(
        &self,
        application_id: ApplicationId,
        hearing_id: HearingId,
    ) -> Result<(), ProcessingError> {
        self.hearings
            .send_for_listing(hearing_id, &[LinkageSubject::Application { application_id }])
            .await?;

        let mut application = self.load(application_id).await?;
        self.advance(&mut application, CourtApplication::mark_listed)
            .await
    }

    /// Confirmed allocation from the listing context.
    pub async fn confirm_hearing(
        &self,
        application_id: ApplicationId,
        hearing_id: HearingId,
    ) -> Result<(), ProcessingError> {
        self.hearings
            .confirm(hearing_id, &[LinkageSubject::Application { application_id }])
            .await
    }

    async fn load(&self, id: ApplicationId) -> Result<CourtApplication, ProcessingError> {
        let found = self
            .applications
            .find_by_id(id)
            .await
            .context("Failed to load court application")?;
        // Absence is projection lag, not a business failure: the
        // registering event may still be in flight.
        Ok(require("court application", id.to_string(), found)?)
    }

    async fn advance(
        &self,
        application: &mut CourtApplication,
        op: fn(&mut CourtApplication) -> Result<ApplicationStatus, ApplicationStatusRejection>,
    ) -> Result<(), ProcessingError> {
        let from = application.status;
        match op(application) {
            Ok(to) => {
                self.applications
                    .save(application)
                    .await
                    .context("Failed to save court application")?;
                info!(
                    application = %application.id,
                    from = %from,
                    to = %to,
                    "Court application status changed"
                );
                self.event_bus
                    .publish_application_event(ApplicationEvent::StatusChanged {
                        application_id: application.id,
                        from,
                        to,
                        changed_at: Utc::now(),
                    });
                Ok(())
            }
            Err(ApplicationStatusRejection::AlreadyAtOrBeyond { current, target }) => {
                // Redelivered status change: already recorded, carry on.
                debug!(
                    application = %application.id,
                    current = %current,
                    target = %target,
                    "Ignoring redelivered application status change"
                );
                Ok(())
            }
        }
    }
}
