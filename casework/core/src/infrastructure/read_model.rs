// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Read-Model Gateway.
//!
//! Point-in-time lookups of cases and their relationship neighbourhood.
//! The production projection is owned by the hosting platform; this module
//! defines the narrow contract consumed by the sagas and an in-memory
//! implementation for development and testing. The gateway is consulted but
//! never mutated by this subsystem.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use crate::domain::case::{CaseDetail, CaseId, CaseSummary};
use crate::domain::relationship::RelationshipGraph;
use crate::infrastructure::relationship_store::InMemoryRelationshipStore;

#[async_trait]
pub trait ReadModelGateway: Send + Sync {
    /// Resolve an external reference (URN or prosecuting-authority
    /// reference) to a case, if one is visible in the read model.
    async fn find_case_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<CaseSummary>, GatewayError>;

    /// Look up a case by internal identifier.
    async fn find_case_by_id(&self, id: CaseId) -> Result<Option<CaseDetail>, GatewayError>;

    /// Direct + merged-cluster relationship view for a case.
    async fn find_relationships_for_case(
        &self,
        id: CaseId,
    ) -> Result<RelationshipGraph, GatewayError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Read model unavailable: {0}")]
    Unavailable(String),
}

/// In-memory gateway backed by a case map and the relationship store.
pub struct InMemoryReadModelGateway {
    cases: DashMap<CaseId, CaseDetail>,
    store: Arc<InMemoryRelationshipStore>,
}

impl InMemoryReadModelGateway {
    pub fn new(store: Arc<InMemoryRelationshipStore>) -> Self {
        Self {
            cases: DashMap::new(),
            store,
        }
    }

    /// Project a case into the read model (test setup / projection seeding).
    pub fn register_case(&self, detail: CaseDetail) {
        self.cases.insert(detail.id, detail);
    }

    /// Remove a case from the read model, simulating projection lag.
    pub fn evict_case(&self, id: CaseId) {
        self.cases.remove(&id);
    }
}

#[async_trait]
impl ReadModelGateway for InMemoryReadModelGateway {
    async fn find_case_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<CaseSummary>, GatewayError> {
        let found = self.cases.iter().find_map(|entry| {
            let case = entry.value();
            if case.addressed_by(reference) {
                Some(case.summary())
            } else {
                None
            }
        });
        Ok(found)
    }

    async fn find_case_by_id(&self, id: CaseId) -> Result<Option<CaseDetail>, GatewayError> {
        Ok(self.cases.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_relationships_for_case(
        &self,
        id: CaseId,
    ) -> Result<RelationshipGraph, GatewayError> {
        Ok(self.store.snapshot(id))
    }
}
