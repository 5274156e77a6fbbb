// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Linkage Requests and Validation
//!
//! The pure decision function that accepts or rejects a proposed case
//! relationship against a graph snapshot. Resolution of raw reference
//! strings happens in the application layer (the saga); by the time the
//! validator runs, every proposed reference is already a `ResolvedReference`
//! and validation is a pure function over injected state.
//!
//! # Architectural Context
//!
//! - **Bounded Context:** Case Relationship Context
//! - **Pattern:** Domain Service (pure, side-effect free)
//!
//! Rejections are business outcomes, not faults: they are reported to the
//! originating caller through a response event and never thrown, retried or
//! logged as errors.

use serde::{Deserialize, Serialize};

use crate::domain::case::{CaseId, CaseSummary};
use crate::domain::relationship::{RelationshipGraph, RelationshipKind};

/// The three relationship changes a caller can propose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkageKind {
    Link,
    Merge,
    Split,
}

impl LinkageKind {
    /// The edge kind committed for an accepted request, if any.
    /// SPLIT commits split records, not edges.
    pub fn edge_kind(&self) -> Option<RelationshipKind> {
        match self {
            LinkageKind::Link => Some(RelationshipKind::Link),
            LinkageKind::Merge => Some(RelationshipKind::Merge),
            LinkageKind::Split => None,
        }
    }
}

impl std::fmt::Display for LinkageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkageKind::Link => write!(f, "LINK"),
            LinkageKind::Merge => write!(f, "MERGE"),
            LinkageKind::Split => write!(f, "SPLIT"),
        }
    }
}

/// A proposed relationship change, created when a validate-* event arrives.
///
/// Consumed once per saga run and never persisted; the committed state lives
/// in the relationship graph store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkageRequest {
    /// The case the relationship originates from (for MERGE, the lead case
    /// that survives/absorbs)
    pub origin_case_id: CaseId,

    /// The origin case's own URN, echoed into notifications
    pub origin_reference: String,

    /// Raw reference strings proposed by the caller, in caller order
    pub proposed_references: Vec<String>,

    pub kind: LinkageKind,
}

/// A proposed reference after read-model resolution.
///
/// `resolution` is `None` both when the reference matched nothing and when
/// the gateway lookup itself failed; an unresolved reference is a terminal
/// business outcome, not a fault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedReference {
    pub raw: String,
    pub resolution: Option<CaseSummary>,
}

/// Outcome of validating one linkage request.
///
/// Computed once per proposed reference; LINK/MERGE requests fail on the
/// first violation in caller enumeration order, SPLIT requests collect every
/// offending reference so the response can echo the full list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationOutcome {
    Success,

    /// A proposed reference does not resolve to any case
    ReferenceNotFound { reference: String },

    /// The reference resolves to the origin case itself
    ReferenceNotValid { reference: String },

    /// A direct or transitive edge already exists, or a split constraint is
    /// violated
    ReferenceAlreadyLinked { references: Vec<String> },
}

impl ValidationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ValidationOutcome::Success)
    }

    /// Stable outcome code carried on response events.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationOutcome::Success => "SUCCESS",
            ValidationOutcome::ReferenceNotFound { .. } => "REFERENCE_NOT_FOUND",
            ValidationOutcome::ReferenceNotValid { .. } => "REFERENCE_NOT_VALID",
            ValidationOutcome::ReferenceAlreadyLinked { .. } => "REFERENCE_ALREADY_LINKED",
        }
    }
}

/// Pure validator for proposed case relationships.
pub struct LinkageValidator;

impl LinkageValidator {
    /// Validate a request against resolved references and a graph snapshot.
    ///
    /// For LINK and MERGE, per reference and in caller order:
    /// 1. unresolved reference → `ReferenceNotFound`
    /// 2. resolves to the origin case → `ReferenceNotValid`
    /// 3. existing direct edge (LINK) or direct/transitive membership
    ///    (MERGE), or a violated split constraint → `ReferenceAlreadyLinked`
    ///
    /// For SPLIT: a proposed reference that already appears as a split
    /// record for the origin (containment-tolerant match) is offending; all
    /// offenders are reported together.
    pub fn validate(
        request: &LinkageRequest,
        resolutions: &[ResolvedReference],
        graph: &RelationshipGraph,
    ) -> ValidationOutcome {
        match request.kind {
            LinkageKind::Link | LinkageKind::Merge => {
                Self::validate_relation(request, resolutions, graph)
            }
            LinkageKind::Split => Self::validate_split(request, graph),
        }
    }

    fn validate_relation(
        request: &LinkageRequest,
        resolutions: &[ResolvedReference],
        graph: &RelationshipGraph,
    ) -> ValidationOutcome {
        // edge_kind is always present for LINK/MERGE
        let kind = match request.kind.edge_kind() {
            Some(kind) => kind,
            None => return ValidationOutcome::Success,
        };

        for resolved in resolutions {
            let summary = match &resolved.resolution {
                Some(summary) => summary,
                None => {
                    return ValidationOutcome::ReferenceNotFound {
                        reference: resolved.raw.clone(),
                    }
                }
            };

            if summary.id == request.origin_case_id {
                return ValidationOutcome::ReferenceNotValid {
                    reference: resolved.raw.clone(),
                };
            }

            if graph.is_related(request.origin_case_id, summary.id, kind)
                || graph.split_conflict(request.origin_case_id, &resolved.raw)
            {
                return ValidationOutcome::ReferenceAlreadyLinked {
                    references: vec![resolved.raw.clone()],
                };
            }
        }

        ValidationOutcome::Success
    }

    fn validate_split(request: &LinkageRequest, graph: &RelationshipGraph) -> ValidationOutcome {
        let offending: Vec<String> = request
            .proposed_references
            .iter()
            .filter(|reference| graph.split_conflict(request.origin_case_id, reference))
            .cloned()
            .collect();

        if offending.is_empty() {
            ValidationOutcome::Success
        } else {
            ValidationOutcome::ReferenceAlreadyLinked {
                references: offending,
            }
        }
    }
}
