// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Domain events emitted by the casework sagas.
//!
//! These are the only consumer-facing signals this subsystem produces: a
//! response event back to the originating caller, a relationship
//! notification fanned out to every interested downstream context, and
//! status-change events for hearings and applications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::case::{ApplicationId, CaseId, HearingId};
use crate::domain::court_application::ApplicationStatus;
use crate::domain::hearing::{HearingLinkageStatus, LinkageSubject};
use crate::domain::linkage::{LinkageKind, ValidationOutcome};

/// How a notified pair relates to the lead case.
///
/// `ImplicitlyMerged` marks cluster members that were already merged with a
/// directly-proposed case; downstream contexts learn the full transitive
/// closure from one event instead of re-deriving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PairRelation {
    Linked,
    Merged,
    ImplicitlyMerged,
    Split,
}

/// One (lead, related) pairing carried on a relationship notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifiedPair {
    /// Absent for SPLIT references, which need not resolve to a case
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_case_id: Option<CaseId>,

    pub related_reference: String,

    pub relation: PairRelation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RelationshipEvent {
    /// Exactly one per saga run, addressed to the originating caller.
    ResponseIssued {
        origin_case_id: CaseId,
        kind: LinkageKind,
        outcome: ValidationOutcome,
        issued_at: DateTime<Utc>,
    },

    /// One per accepted LINK/MERGE/SPLIT, fanned out to every interested
    /// downstream context. For MERGE the pair set includes the implicit
    /// cluster members.
    CaseRelationshipNotified {
        lead_case_id: CaseId,
        lead_case_reference: String,
        kind: LinkageKind,
        pairs: Vec<NotifiedPair>,
        notified_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HearingEvent {
    StatusChanged {
        hearing_id: HearingId,
        subject: LinkageSubject,
        from: HearingLinkageStatus,
        to: HearingLinkageStatus,
        changed_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ApplicationEvent {
    StatusChanged {
        application_id: ApplicationId,
        from: ApplicationStatus,
        to: ApplicationStatus,
        changed_at: DateTime<Utc>,
    },
}
