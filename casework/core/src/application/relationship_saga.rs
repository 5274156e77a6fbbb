// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Case Relationship Saga
//!
//! Orchestrates validate → mutate → multi-target publish for LINK, MERGE
//! and SPLIT flows.
//!
//! # DDD Pattern: Application Service
//!
//! - **Layer:** Application
//! - **Responsibility:** Run one linkage request to completion
//! - **Collaborators:**
//!   - Domain: LinkageValidator, RelationshipGraph
//!   - Infrastructure: ReadModelGateway, CommandBus, EventBus
//!
//! Failure semantics: a fault after validation is fatal for this delivery
//! attempt; the platform redelivers and the saga re-executes from the
//! snapshot step. The validator then reports REFERENCE_ALREADY_LINKED
//! against the committed graph and the retry resolves as a safe no-op
//! response with no duplicate notification.

use anyhow::Context;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::application::retry::{require, ProcessingError};
use crate::domain::case::CaseId;
use crate::domain::commands::CaseworkCommand;
use crate::domain::events::{NotifiedPair, PairRelation, RelationshipEvent};
use crate::domain::linkage::{
    LinkageKind, LinkageRequest, LinkageValidator, ResolvedReference, ValidationOutcome,
};
use crate::domain::relationship::{RelationshipEdge, SplitRecord};
use crate::infrastructure::command_bus::CommandBus;
use crate::infrastructure::event_bus::EventBus;
use crate::infrastructure::read_model::ReadModelGateway;

/// How a saga run concluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SagaDisposition {
    /// Validation passed; the change was committed and notified.
    Committed,

    /// Validation failed; only the negative response event was published.
    Rejected(ValidationOutcome),
}

/// The accepted change, assembled in full before any side effect.
struct PreparedChange {
    edges: Vec<RelationshipEdge>,
    splits: Vec<SplitRecord>,
    pairs: Vec<NotifiedPair>,
}

pub struct RelationshipSaga {
    gateway: Arc<dyn ReadModelGateway>,
    command_bus: Arc<dyn CommandBus>,
    event_bus: Arc<EventBus>,
}

impl RelationshipSaga {
    pub fn new(
        gateway: Arc<dyn ReadModelGateway>,
        command_bus: Arc<dyn CommandBus>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            gateway,
            command_bus,
            event_bus,
        }
    }

    /// Run one linkage request to completion.
    pub async fn run(&self, request: LinkageRequest) -> Result<SagaDisposition, ProcessingError> {
        // Step 1: snapshot the origin's neighbourhood and resolve the
        // proposed references against the read model.
        let graph = self
            .gateway
            .find_relationships_for_case(request.origin_case_id)
            .await
            .context("Failed to snapshot relationship graph")?;

        let resolutions = self.resolve_references(&request).await;

        // Step 2: validate. A rejection is a business outcome: publish the
        // response to the originating caller and stop, with no other side
        // effect.
        let outcome = LinkageValidator::validate(&request, &resolutions, &graph);
        if !outcome.is_success() {
            info!(
                origin = %request.origin_case_id,
                kind = %request.kind,
                code = outcome.code(),
                "Linkage request rejected"
            );
            self.publish_response(&request, outcome.clone());
            return Ok(SagaDisposition::Rejected(outcome));
        }

        // Step 3: assemble edges, split records and the complete
        // notification pair set, including the merge closure. Closure
        // lookups happen before the mutation so that a read-model gap
        // aborts the run while redelivery can still succeed.
        let change = self.prepare_change(&request, &resolutions).await?;

        // Step 4: one idempotent mutation command commits the change.
        self.command_bus
            .send(CaseworkCommand::CommitCaseRelationships {
                origin_case_id: request.origin_case_id,
                edges: change.edges,
                splits: change.splits,
            })
            .await
            .context("Failed to dispatch relationship mutation command")?;

        // Step 5: fan the accepted change out to every interested context.
        self.event_bus
            .publish_relationship_event(RelationshipEvent::CaseRelationshipNotified {
                lead_case_id: request.origin_case_id,
                lead_case_reference: request.origin_reference.clone(),
                kind: request.kind,
                pairs: change.pairs,
                notified_at: Utc::now(),
            });

        // Step 6: success response to the originating caller.
        self.publish_response(&request, ValidationOutcome::Success);

        Ok(SagaDisposition::Committed)
    }

    /// Resolve raw references through the gateway.
    ///
    /// A gateway fault degrades to "unresolved": an unresolvable reference
    /// is a terminal business outcome for the caller, not a fault of this
    /// run. SPLIT references are constraints, not case lookups, and are
    /// not resolved.
    async fn resolve_references(&self, request: &LinkageRequest) -> Vec<ResolvedReference> {
        if request.kind == LinkageKind::Split {
            return Vec::new();
        }

        let mut resolutions = Vec::with_capacity(request.proposed_references.len());
        for raw in &request.proposed_references {
            let resolution = match self.gateway.find_case_by_reference(raw).await {
                Ok(found) => found,
                Err(err) => {
                    warn!(reference = %raw, error = %err, "Reference lookup failed; treating as unresolved");
                    None
                }
            };
            resolutions.push(ResolvedReference {
                raw: raw.clone(),
                resolution,
            });
        }
        resolutions
    }

    async fn prepare_change(
        &self,
        request: &LinkageRequest,
        resolutions: &[ResolvedReference],
    ) -> Result<PreparedChange, ProcessingError> {
        match request.kind {
            LinkageKind::Split => {
                let splits: Vec<SplitRecord> = request
                    .proposed_references
                    .iter()
                    .map(|reference| SplitRecord::new(request.origin_case_id, reference))
                    .collect();
                let pairs = splits
                    .iter()
                    .map(|split| NotifiedPair {
                        related_case_id: None,
                        related_reference: split.split_reference.clone(),
                        relation: PairRelation::Split,
                    })
                    .collect();
                Ok(PreparedChange {
                    edges: Vec::new(),
                    splits,
                    pairs,
                })
            }
            LinkageKind::Link | LinkageKind::Merge => {
                self.prepare_relation(request, resolutions).await
            }
        }
    }

    async fn prepare_relation(
        &self,
        request: &LinkageRequest,
        resolutions: &[ResolvedReference],
    ) -> Result<PreparedChange, ProcessingError> {
        let kind = request
            .kind
            .edge_kind()
            .expect("LINK/MERGE always map to an edge kind");
        let direct_relation = match request.kind {
            LinkageKind::Link => PairRelation::Linked,
            _ => PairRelation::Merged,
        };

        let mut edges = Vec::new();
        let mut pairs = Vec::new();
        let mut notified: HashSet<CaseId> = HashSet::new();

        for resolved in resolutions {
            let summary = resolved
                .resolution
                .as_ref()
                .expect("validated references are resolved");

            let edge = RelationshipEdge::new(request.origin_case_id, summary.id, kind)
                .map_err(|err| ProcessingError::Fatal(err.into()))?;
            edges.push(edge);

            if notified.insert(summary.id) {
                pairs.push(NotifiedPair {
                    related_case_id: Some(summary.id),
                    related_reference: resolved.raw.clone(),
                    relation: direct_relation,
                });
            }
        }

        // Merge-closure rule: a MERGE of X into the lead also notifies
        // every case previously merged with X, labelled distinctly, so
        // downstream consumers learn the whole cluster from one event.
        if request.kind == LinkageKind::Merge {
            for resolved in resolutions {
                let summary = resolved
                    .resolution
                    .as_ref()
                    .expect("validated references are resolved");

                let neighbourhood = self
                    .gateway
                    .find_relationships_for_case(summary.id)
                    .await
                    .context("Failed to load merge cluster for proposed case")?;

                for member in neighbourhood.merge_cluster(summary.id) {
                    if member == request.origin_case_id || !notified.insert(member) {
                        continue;
                    }

                    let detail = require(
                        "merged cluster member case",
                        member.to_string(),
                        self.gateway
                            .find_case_by_id(member)
                            .await
                            .context("Failed to look up merge cluster member")?,
                    )?;

                    debug!(
                        lead = %request.origin_case_id,
                        member = %member,
                        "Including implicitly merged cluster member"
                    );
                    pairs.push(NotifiedPair {
                        related_case_id: Some(member),
                        related_reference: detail.urn,
                        relation: PairRelation::ImplicitlyMerged,
                    });
                }
            }
        }

        Ok(PreparedChange {
            edges,
            splits: Vec::new(),
            pairs,
        })
    }

    fn publish_response(&self, request: &LinkageRequest, outcome: ValidationOutcome) {
        self.event_bus
            .publish_relationship_event(RelationshipEvent::ResponseIssued {
                origin_case_id: request.origin_case_id,
                kind: request.kind,
                outcome,
                issued_at: Utc::now(),
            });
    }
}
