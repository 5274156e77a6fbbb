// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! In-memory relationship graph store.
//!
//! The durable graph store is owned by the hosting platform; this in-memory
//! implementation backs development and testing, and it is where the
//! idempotent-apply guarantee lives: committing the same
//! `CommitCaseRelationships` command twice yields the same graph. Two
//! concurrent saga runs for the same pair can both pass validation against
//! stale snapshots and both commit — set-semantics here is what keeps the
//! end state correct, not mutual exclusion.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::case::CaseId;
use crate::domain::commands::CaseworkCommand;
use crate::domain::relationship::{
    RelationshipEdge, RelationshipGraph, RelationshipKind, SplitRecord,
};

/// Canonical, orientation-insensitive edge key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct EdgeKey {
    low: Uuid,
    high: Uuid,
    kind: RelationshipKind,
}

impl EdgeKey {
    fn of(edge: &RelationshipEdge) -> Self {
        let a = edge.lead_case_id.as_uuid();
        let b = edge.other_case_id.as_uuid();
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        Self {
            low,
            high,
            kind: edge.kind,
        }
    }
}

/// Append-only, idempotent in-memory graph store.
#[derive(Default)]
pub struct InMemoryRelationshipStore {
    edges: DashMap<EdgeKey, RelationshipEdge>,
    splits: DashMap<(CaseId, String), SplitRecord>,
}

impl InMemoryRelationshipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a mutation command. Re-applying an already-applied command is a
    /// no-op: edges and split records are keyed by identity, and the first
    /// committed record wins (its timestamp is retained).
    pub fn apply(&self, command: &CaseworkCommand) {
        match command {
            CaseworkCommand::CommitCaseRelationships { edges, splits, .. } => {
                for edge in edges {
                    self.edges
                        .entry(EdgeKey::of(edge))
                        .or_insert_with(|| edge.clone());
                }
                for split in splits {
                    self.splits
                        .entry((split.origin_case_id, split.split_reference.clone()))
                        .or_insert_with(|| split.clone());
                }
            }
        }
    }

    /// Record an edge directly (test setup / projection seeding).
    pub fn insert_edge(&self, edge: RelationshipEdge) {
        self.edges.entry(EdgeKey::of(&edge)).or_insert(edge);
    }

    /// Record a split directly (test setup / projection seeding).
    pub fn insert_split(&self, split: SplitRecord) {
        self.splits
            .entry((split.origin_case_id, split.split_reference.clone()))
            .or_insert(split);
    }

    /// Point-in-time graph view for a case neighbourhood.
    ///
    /// The in-memory store holds one tenant's worth of edges, so the
    /// snapshot simply carries them all; `RelationshipGraph` scopes its
    /// queries to the cases the caller asks about.
    pub fn snapshot(&self, _case_id: CaseId) -> RelationshipGraph {
        let edges: Vec<RelationshipEdge> =
            self.edges.iter().map(|entry| entry.value().clone()).collect();
        let splits: Vec<SplitRecord> = self
            .splits
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        RelationshipGraph::new(edges, splits)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn split_count(&self) -> usize {
        self.splits.len()
    }

    /// Earliest commit timestamp recorded for an edge between two cases.
    pub fn edge_created_at(&self, a: CaseId, b: CaseId) -> Option<DateTime<Utc>> {
        self.edges
            .iter()
            .find(|entry| entry.value().joins(a, b))
            .map(|entry| entry.value().created_at)
    }
}
