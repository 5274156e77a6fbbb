// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Hearing Linkage State Machine
//!
//! Tracks how a case or application attaches to a hearing as it moves
//! through initiation, listing and confirmation.
//!
//! # Architectural Context
//!
//! - **Bounded Context:** Hearing Context
//! - **Aggregate Root:** HearingLinkage, keyed by (hearing, subject)
//!
//! # Invariants
//!
//! - Status only moves forward: Unallocated → HearingInitialised →
//!   SentForListing → HearingConfirmed; no backward transition exists
//! - A transition whose target is at or behind the recorded status is
//!   rejected as `AlreadyAtOrBeyond`, which makes every operation idempotent
//!   under at-least-once redelivery
//! - No transition may skip a state; the intermediate status must be
//!   recorded even when two operations fire within the same saga run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::case::{ApplicationId, CaseId, HearingId};

/// Attachment status of a case or application to a hearing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HearingLinkageStatus {
    Unallocated,
    HearingInitialised,
    SentForListing,
    HearingConfirmed,
}

impl HearingLinkageStatus {
    /// Ordinal position in the forward-only lifecycle.
    pub fn rank(&self) -> u8 {
        match self {
            HearingLinkageStatus::Unallocated => 0,
            HearingLinkageStatus::HearingInitialised => 1,
            HearingLinkageStatus::SentForListing => 2,
            HearingLinkageStatus::HearingConfirmed => 3,
        }
    }
}

impl std::fmt::Display for HearingLinkageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HearingLinkageStatus::Unallocated => write!(f, "UNALLOCATED"),
            HearingLinkageStatus::HearingInitialised => write!(f, "HEARING_INITIALISED"),
            HearingLinkageStatus::SentForListing => write!(f, "SENT_FOR_LISTING"),
            HearingLinkageStatus::HearingConfirmed => write!(f, "HEARING_CONFIRMED"),
        }
    }
}

/// What is attached to the hearing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "subject", rename_all = "snake_case")]
pub enum LinkageSubject {
    Case { case_id: CaseId },
    Application { application_id: ApplicationId },
}

impl std::fmt::Display for LinkageSubject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkageSubject::Case { case_id } => write!(f, "case/{case_id}"),
            LinkageSubject::Application { application_id } => {
                write!(f, "application/{application_id}")
            }
        }
    }
}

/// A completed forward transition, reported on status-changed events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTransition {
    pub from: HearingLinkageStatus,
    pub to: HearingLinkageStatus,
    pub at: DateTime<Utc>,
}

/// Why a requested transition was not applied.
///
/// `AlreadyAtOrBeyond` is the redelivery guard: callers log it and carry on.
/// `SkipsIntermediate` means the predecessor status has not been recorded
/// yet; with out-of-order delivery the hosting layer redelivers later.
#[derive(Debug, thiserror::Error)]
pub enum TransitionRejection {
    #[error("Status already at or beyond {target} (currently {current})")]
    AlreadyAtOrBeyond {
        current: HearingLinkageStatus,
        target: HearingLinkageStatus,
    },

    #[error("Transition to {target} would skip a state (currently {current})")]
    SkipsIntermediate {
        current: HearingLinkageStatus,
        target: HearingLinkageStatus,
    },
}

/// Hearing Linkage Aggregate Root
///
/// Created at first reference to a (hearing, subject) pairing, at
/// `Unallocated`. Mutated only through the transition operations below,
/// never written directly by unrelated sagas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HearingLinkage {
    pub hearing_id: HearingId,
    pub subject: LinkageSubject,
    pub status: HearingLinkageStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HearingLinkage {
    pub fn new(hearing_id: HearingId, subject: LinkageSubject) -> Self {
        let now = Utc::now();
        Self {
            hearing_id,
            subject,
            status: HearingLinkageStatus::Unallocated,
            created_at: now,
            updated_at: now,
        }
    }

    /// Unallocated → HearingInitialised. Fired when a hearing is first
    /// created from a referral, box-work allocation or application
    /// proceeding.
    pub fn initiate(&mut self) -> Result<StatusTransition, TransitionRejection> {
        self.advance_to(HearingLinkageStatus::HearingInitialised)
    }

    /// HearingInitialised → SentForListing. Fired once the hearing's listing
    /// needs are handed to the listing context.
    pub fn send_for_listing(&mut self) -> Result<StatusTransition, TransitionRejection> {
        self.advance_to(HearingLinkageStatus::SentForListing)
    }

    /// SentForListing → HearingConfirmed. Fired when the listing context
    /// reports a confirmed allocation.
    pub fn confirm(&mut self) -> Result<StatusTransition, TransitionRejection> {
        self.advance_to(HearingLinkageStatus::HearingConfirmed)
    }

    fn advance_to(
        &mut self,
        target: HearingLinkageStatus,
    ) -> Result<StatusTransition, TransitionRejection> {
        let current = self.status;
        if current.rank() >= target.rank() {
            return Err(TransitionRejection::AlreadyAtOrBeyond { current, target });
        }
        if target.rank() != current.rank() + 1 {
            return Err(TransitionRejection::SkipsIntermediate { current, target });
        }

        let at = Utc::now();
        self.status = target;
        self.updated_at = at;
        Ok(StatusTransition {
            from: current,
            to: target,
            at,
        })
    }
}
