// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command bus boundary.
//!
//! The hosting platform provides the real bus (fire-and-forget,
//! at-least-once delivery). This module defines the narrow contract the
//! sagas depend on plus two local implementations: a recording double for
//! assertions, and a store-backed bus that applies commands to the
//! in-memory relationship store for end-to-end tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::domain::commands::CaseworkCommand;
use crate::infrastructure::relationship_store::InMemoryRelationshipStore;

/// Fire-and-forget command dispatch. Delivery is at-least-once; commands
/// must therefore be idempotent at their handler.
#[async_trait]
pub trait CommandBus: Send + Sync {
    async fn send(&self, command: CaseworkCommand) -> Result<(), CommandBusError>;
}

#[derive(Debug, thiserror::Error)]
pub enum CommandBusError {
    #[error("Command dispatch failed: {0}")]
    Dispatch(String),
}

/// Records every sent command; for test assertions.
#[derive(Clone, Default)]
pub struct RecordingCommandBus {
    sent: Arc<Mutex<Vec<CaseworkCommand>>>,
}

impl RecordingCommandBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<CaseworkCommand> {
        self.sent.lock().expect("command log poisoned").clone()
    }
}

#[async_trait]
impl CommandBus for RecordingCommandBus {
    async fn send(&self, command: CaseworkCommand) -> Result<(), CommandBusError> {
        debug!("Recording command: {:?}", command);
        self.sent
            .lock()
            .map_err(|_| CommandBusError::Dispatch("command log poisoned".to_string()))?
            .push(command);
        Ok(())
    }
}

/// Applies commands straight to the in-memory relationship store,
/// standing in for the platform's graph-store command handler.
#[derive(Clone)]
pub struct StoreBackedCommandBus {
    store: Arc<InMemoryRelationshipStore>,
}

impl StoreBackedCommandBus {
    pub fn new(store: Arc<InMemoryRelationshipStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CommandBus for StoreBackedCommandBus {
    async fn send(&self, command: CaseworkCommand) -> Result<(), CommandBusError> {
        debug!(
            "Applying command for case {}: {:?}",
            command.origin_case_id(),
            command
        );
        self.store.apply(&command);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::case::CaseId;
    use crate::domain::relationship::{RelationshipEdge, RelationshipKind};

    #[tokio::test]
    async fn test_recording_bus_captures_commands() {
        let bus = RecordingCommandBus::new();
        let origin = CaseId::new();
        bus.send(CaseworkCommand::CommitCaseRelationships {
            origin_case_id: origin,
            edges: vec![],
            splits: vec![],
        })
        .await
        .unwrap();

        let sent = bus.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].origin_case_id(), origin);
    }

    #[tokio::test]
    async fn test_store_backed_bus_applies_idempotently() {
        let store = Arc::new(InMemoryRelationshipStore::new());
        let bus = StoreBackedCommandBus::new(store.clone());

        let a = CaseId::new();
        let b = CaseId::new();
        let command = CaseworkCommand::CommitCaseRelationships {
            origin_case_id: a,
            edges: vec![RelationshipEdge::new(a, b, RelationshipKind::Link).unwrap()],
            splits: vec![],
        };

        bus.send(command.clone()).await.unwrap();
        bus.send(command).await.unwrap();
        assert_eq!(store.edge_count(), 1);
    }
}
