// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Court Application Lifecycle
//!
//! A court application progresses on its own state track, distinct from the
//! hearing linkage status: an application can be LISTED while its hearing is
//! still SENT_FOR_LISTING pending confirmation from the listing context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::case::{ApplicationId, CaseId};

/// Lifecycle status of a court application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Draft,
    UnAllocated,
    InProgress,
    Listed,
}

impl ApplicationStatus {
    pub fn rank(&self) -> u8 {
        match self {
            ApplicationStatus::Draft => 0,
            ApplicationStatus::UnAllocated => 1,
            ApplicationStatus::InProgress => 2,
            ApplicationStatus::Listed => 3,
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicationStatus::Draft => write!(f, "DRAFT"),
            ApplicationStatus::UnAllocated => write!(f, "UN_ALLOCATED"),
            ApplicationStatus::InProgress => write!(f, "IN_PROGRESS"),
            ApplicationStatus::Listed => write!(f, "LISTED"),
        }
    }
}

/// Why an application status change was not applied
#[derive(Debug, thiserror::Error)]
pub enum ApplicationStatusRejection {
    #[error("Application already at or beyond {target} (currently {current})")]
    AlreadyAtOrBeyond {
        current: ApplicationStatus,
        target: ApplicationStatus,
    },
}

/// Court Application Aggregate Root
///
/// Status is created at `Draft` and only ever moves forward; no backward
/// transition is defined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourtApplication {
    pub id: ApplicationId,
    pub prosecution_case_id: CaseId,
    pub reference: String,
    pub status: ApplicationStatus,
    pub received_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CourtApplication {
    pub fn new(prosecution_case_id: CaseId, reference: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ApplicationId::new(),
            prosecution_case_id,
            reference: reference.into(),
            status: ApplicationStatus::Draft,
            received_at: now,
            updated_at: now,
        }
    }

    /// Draft → UnAllocated, on submission.
    pub fn submit(&mut self) -> Result<ApplicationStatus, ApplicationStatusRejection> {
        self.advance_to(ApplicationStatus::UnAllocated)
    }

    /// UnAllocated → InProgress, on referral to box-work or a court hearing.
    pub fn begin_progress(&mut self) -> Result<ApplicationStatus, ApplicationStatusRejection> {
        self.advance_to(ApplicationStatus::InProgress)
    }

    /// InProgress → Listed, once listing is requested for the hearing.
    pub fn mark_listed(&mut self) -> Result<ApplicationStatus, ApplicationStatusRejection> {
        self.advance_to(ApplicationStatus::Listed)
    }

    fn advance_to(
        &mut self,
        target: ApplicationStatus,
    ) -> Result<ApplicationStatus, ApplicationStatusRejection> {
        let current = self.status;
        if current.rank() >= target.rank() {
            return Err(ApplicationStatusRejection::AlreadyAtOrBeyond { current, target });
        }
        self.status = target;
        self.updated_at = Utc::now();
        Ok(target)
    }
}
