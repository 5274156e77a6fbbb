// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Retryable Lookup Policy
//!
//! Any saga step that depends on another context's read model may run
//! before that model has caught up: a referenced prosecution case may not
//! be visible yet when the event arrives. This module converts "not found
//! where eventual visibility is expected" into a distinguished, typed error
//! the hosting message layer recognises as "redeliver later" rather than
//! "dead-letter".
//!
//! Business-validation outcomes (REFERENCE_NOT_FOUND and friends) are a
//! different code path entirely: they are legitimate terminal results,
//! reported through response events, and must never be converted into a
//! retryable error.

use crate::domain::hearing::TransitionRejection;

/// Distinguished "not yet visible, redeliver later" error.
#[derive(Debug, thiserror::Error)]
#[error("{entity} {reference} not yet visible in the read model")]
pub struct RetryableNotFound {
    pub entity: &'static str,
    pub reference: String,
}

impl RetryableNotFound {
    pub fn new(entity: &'static str, reference: impl Into<String>) -> Self {
        Self {
            entity,
            reference: reference.into(),
        }
    }
}

/// Error surface of every saga entry point.
///
/// The hosting layer matches on `Retryable` and schedules redelivery;
/// everything else follows the standard dead-letter/alerting path. No local
/// recovery is attempted for fatal faults.
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error(transparent)]
    Retryable(#[from] RetryableNotFound),

    #[error(transparent)]
    Fatal(#[from] anyhow::Error),
}

impl ProcessingError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProcessingError::Retryable(_))
    }
}

/// Require that an upstream lookup produced a value.
///
/// `entity` names what was being looked up; `reference` identifies which
/// one, for diagnostics and redelivery logging.
pub fn require<T>(
    entity: &'static str,
    reference: impl Into<String>,
    value: Option<T>,
) -> Result<T, RetryableNotFound> {
    value.ok_or_else(|| RetryableNotFound::new(entity, reference))
}

/// Map an out-of-order state-machine rejection to a retryable error: the
/// predecessor transition's message has not been processed yet, so this one
/// should come back later.
pub fn retry_out_of_order(rejection: TransitionRejection, reference: String) -> ProcessingError {
    debug_assert!(matches!(
        rejection,
        TransitionRejection::SkipsIntermediate { .. }
    ));
    ProcessingError::Retryable(RetryableNotFound::new(
        "predecessor hearing status",
        format!("{reference} ({rejection})"),
    ))
}
