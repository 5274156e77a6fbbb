// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Case Relationship Graph
//!
//! This module defines the relationship edges between prosecution cases and
//! the queryable graph snapshot the linkage validator runs against.
//!
//! # Architectural Context
//!
//! - **Bounded Context:** Case Relationship Context
//! - **Aggregate Root:** RelationshipGraph (per-neighbourhood snapshot)
//!
//! # Design Principles
//!
//! 1. **Self-Validating:** Edge constructors enforce invariants (no self-edges)
//! 2. **Explicit closure:** MERGE transitivity is an explicit BFS over the
//!    snapshot, never re-derived by string-matching read-model payloads
//! 3. **Append-only:** edges and split records are never deleted

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

use crate::domain::case::CaseId;

/// Kind of association recorded between two cases
///
/// LINK is non-transitive; MERGE is transitive and clustered under the lead
/// case (the case that survives/absorbs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipKind {
    Link,
    Merge,
}

impl std::fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelationshipKind::Link => write!(f, "LINK"),
            RelationshipKind::Merge => write!(f, "MERGE"),
        }
    }
}

/// A committed association between two cases.
///
/// Edges are undirected in effect but stored with a canonical lead case; for
/// MERGE the lead is the absorbing case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipEdge {
    pub lead_case_id: CaseId,
    pub other_case_id: CaseId,
    pub kind: RelationshipKind,
    pub created_at: DateTime<Utc>,
}

impl RelationshipEdge {
    /// Create an edge, enforcing the no-self-edge invariant.
    pub fn new(
        lead_case_id: CaseId,
        other_case_id: CaseId,
        kind: RelationshipKind,
    ) -> Result<Self, RelationshipError> {
        if lead_case_id == other_case_id {
            return Err(RelationshipError::SelfReference(lead_case_id));
        }
        Ok(Self {
            lead_case_id,
            other_case_id,
            kind,
            created_at: Utc::now(),
        })
    }

    /// True when this edge joins the two given cases, in either orientation.
    pub fn joins(&self, a: CaseId, b: CaseId) -> bool {
        (self.lead_case_id == a && self.other_case_id == b)
            || (self.lead_case_id == b && self.other_case_id == a)
    }

    /// The case on the far side of this edge from `case`, if `case` is an endpoint.
    pub fn counterpart(&self, case: CaseId) -> Option<CaseId> {
        if self.lead_case_id == case {
            Some(self.other_case_id)
        } else if self.other_case_id == case {
            Some(self.lead_case_id)
        } else {
            None
        }
    }
}

/// Negative constraint recorded when a case is split.
///
/// Means: never re-link `split_reference` into `origin_case_id`'s cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitRecord {
    pub origin_case_id: CaseId,
    pub split_reference: String,
    pub recorded_at: DateTime<Utc>,
}

impl SplitRecord {
    pub fn new(origin_case_id: CaseId, split_reference: impl Into<String>) -> Self {
        Self {
            origin_case_id,
            split_reference: split_reference.into(),
            recorded_at: Utc::now(),
        }
    }

    /// Tolerant match against a proposed reference string.
    ///
    /// Legacy split records may carry truncated or suffixed reference forms,
    /// so the match is containment in either direction, not equality.
    pub fn matches(&self, reference: &str) -> bool {
        if reference.is_empty() {
            return false;
        }
        self.split_reference.contains(reference) || reference.contains(&self.split_reference)
    }
}

/// Point-in-time snapshot of a case neighbourhood: every committed edge and
/// split record reachable from the cases the caller asked about.
///
/// # Invariants
/// - MERGE is transitive: if A merged with B and B with C, `merge_cluster(A)`
///   surfaces C as an implicit member
/// - LINK is never transitive
/// - No edge joins a case to itself
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationshipGraph {
    edges: Vec<RelationshipEdge>,
    splits: Vec<SplitRecord>,
}

impl RelationshipGraph {
    pub fn new(edges: Vec<RelationshipEdge>, splits: Vec<SplitRecord>) -> Self {
        Self { edges, splits }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn edges(&self) -> &[RelationshipEdge] {
        &self.edges
    }

    pub fn splits(&self) -> &[SplitRecord] {
        &self.splits
    }

    /// Does any edge, of either kind, directly join `a` and `b`?
    pub fn has_direct_edge(&self, a: CaseId, b: CaseId) -> bool {
        self.edges.iter().any(|edge| edge.joins(a, b))
    }

    /// The transitive MERGE cluster of `case`, excluding `case` itself.
    ///
    /// BFS over MERGE edges only; LINK edges never contribute members.
    pub fn merge_cluster(&self, case: CaseId) -> Vec<CaseId> {
        let mut visited: HashSet<CaseId> = HashSet::new();
        let mut queue: VecDeque<CaseId> = VecDeque::new();
        visited.insert(case);
        queue.push_back(case);

        let mut members = Vec::new();
        while let Some(current) = queue.pop_front() {
            for edge in &self.edges {
                if edge.kind != RelationshipKind::Merge {
                    continue;
                }
                if let Some(next) = edge.counterpart(current) {
                    if visited.insert(next) {
                        members.push(next);
                        queue.push_back(next);
                    }
                }
            }
        }
        members
    }

    /// Is `other` already related to `origin` for the purposes of `kind`?
    ///
    /// LINK tests direct edges only. MERGE additionally tests transitive
    /// cluster membership.
    pub fn is_related(&self, origin: CaseId, other: CaseId, kind: RelationshipKind) -> bool {
        if self.has_direct_edge(origin, other) {
            return true;
        }
        match kind {
            RelationshipKind::Link => false,
            RelationshipKind::Merge => self.merge_cluster(origin).contains(&other),
        }
    }

    /// Does a recorded split for `origin` forbid re-linking `reference`?
    pub fn split_conflict(&self, origin: CaseId, reference: &str) -> bool {
        self.splits
            .iter()
            .any(|record| record.origin_case_id == origin && record.matches(reference))
    }
}

/// Relationship domain errors
#[derive(Debug, thiserror::Error)]
pub enum RelationshipError {
    #[error("Case {0} cannot be related to itself")]
    SelfReference(CaseId),
}
