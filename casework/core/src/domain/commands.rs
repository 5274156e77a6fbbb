// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Internal mutation commands.
//!
//! A saga commits an accepted relationship change through exactly one
//! command on the platform command bus. The command must be idempotent at
//! the storage layer (applying it twice yields the same graph) because the
//! saga offers no deduplication beyond the validator's already-linked check
//! against a possibly stale snapshot.

use serde::{Deserialize, Serialize};

use crate::domain::case::CaseId;
use crate::domain::relationship::{RelationshipEdge, SplitRecord};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CaseworkCommand {
    /// Commit the edges and split records of one accepted linkage request.
    CommitCaseRelationships {
        origin_case_id: CaseId,
        edges: Vec<RelationshipEdge>,
        splits: Vec<SplitRecord>,
    },
}

impl CaseworkCommand {
    pub fn origin_case_id(&self) -> CaseId {
        match self {
            CaseworkCommand::CommitCaseRelationships { origin_case_id, .. } => *origin_case_id,
        }
    }
}
