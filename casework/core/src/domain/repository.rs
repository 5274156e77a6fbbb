// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Repository Interfaces
//!
//! Persistence contracts for each aggregate root, following the DDD
//! Repository pattern: one repository per aggregate, interface defined in
//! the domain layer, implemented in `crate::infrastructure`.
//!
//! | Trait | Aggregate | Implementations |
//! |-------|-----------|----------------|
//! | `HearingLinkageRepository` | `HearingLinkage` | `InMemoryHearingLinkageRepository` |
//! | `CourtApplicationRepository` | `CourtApplication` | `InMemoryCourtApplicationRepository` |
//!
//! The hearing-linkage status store is mutated only through the state
//! machine's transition operations; unrelated sagas never write it
//! directly. The relationship graph store is NOT a repository here: the
//! platform owns it, and this subsystem reaches it read-side through the
//! read-model gateway and write-side through the command bus.

use async_trait::async_trait;

use crate::domain::case::{ApplicationId, HearingId};
use crate::domain::court_application::CourtApplication;
use crate::domain::hearing::{HearingLinkage, LinkageSubject};

/// Repository interface for HearingLinkage aggregates
#[async_trait]
pub trait HearingLinkageRepository: Send + Sync {
    /// Find the linkage for a (hearing, subject) pairing
    async fn find(
        &self,
        hearing_id: HearingId,
        subject: LinkageSubject,
    ) -> Result<Option<HearingLinkage>, RepositoryError>;

    /// Save linkage (create or update)
    async fn save(&self, linkage: &HearingLinkage) -> Result<(), RepositoryError>;

    /// All linkages recorded for a hearing
    async fn find_by_hearing(
        &self,
        hearing_id: HearingId,
    ) -> Result<Vec<HearingLinkage>, RepositoryError>;
}

/// Repository interface for CourtApplication aggregates
#[async_trait]
pub trait CourtApplicationRepository: Send + Sync {
    /// Find application by ID
    async fn find_by_id(
        &self,
        id: ApplicationId,
    ) -> Result<Option<CourtApplication>, RepositoryError>;

    /// Save application (create or update)
    async fn save(&self, application: &CourtApplication) -> Result<(), RepositoryError>;
}

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}
