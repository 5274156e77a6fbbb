// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Case Identity Value Objects
//!
//! Identifiers and reference forms for prosecution cases, hearings and court
//! applications, plus the read-model projections returned by the gateway.
//!
//! # Architectural Context
//!
//! - **Bounded Context:** Case Relationship Context
//! - **Pattern:** Value Objects (immutable once assigned)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a prosecution case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaseId(pub Uuid);

impl CaseId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for CaseId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a hearing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HearingId(pub Uuid);

impl HearingId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for HearingId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for HearingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a court application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub Uuid);

impl ApplicationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ApplicationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reference form identifying a case across context boundaries.
///
/// A case is addressed either by its internal identifier or by one of two
/// external reference forms: the case URN, or the prosecuting-authority
/// reference used for summary-offence cases. Immutable once assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum CaseReference {
    /// Internal case identifier
    Id { case_id: CaseId },

    /// Case unique reference number
    Urn { urn: String },

    /// Prosecuting-authority reference (summary cases)
    ProsecutorRef { reference: String },
}

impl CaseReference {
    /// The raw reference string as presented by callers.
    pub fn as_str(&self) -> String {
        match self {
            CaseReference::Id { case_id } => case_id.to_string(),
            CaseReference::Urn { urn } => urn.clone(),
            CaseReference::ProsecutorRef { reference } => reference.clone(),
        }
    }
}

impl std::fmt::Display for CaseReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Point-in-time case projection returned by reference lookups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseSummary {
    pub id: CaseId,
    pub urn: String,
}

/// Full case projection returned by identifier lookups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseDetail {
    pub id: CaseId,
    pub urn: String,

    /// Prosecuting-authority reference, present for summary cases
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prosecutor_reference: Option<String>,

    pub received_at: DateTime<Utc>,
}

impl CaseDetail {
    pub fn summary(&self) -> CaseSummary {
        CaseSummary {
            id: self.id,
            urn: self.urn.clone(),
        }
    }

    /// Every reference form under which this case can be addressed.
    pub fn reference_forms(&self) -> Vec<CaseReference> {
        let mut forms = vec![
            CaseReference::Id { case_id: self.id },
            CaseReference::Urn {
                urn: self.urn.clone(),
            },
        ];
        if let Some(reference) = &self.prosecutor_reference {
            forms.push(CaseReference::ProsecutorRef {
                reference: reference.clone(),
            });
        }
        forms
    }

    /// Does a raw reference string address this case, in any form?
    pub fn addressed_by(&self, reference: &str) -> bool {
        self.reference_forms()
            .iter()
            .any(|form| form.as_str() == reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_id_uniqueness() {
        let id1 = CaseId::new();
        let id2 = CaseId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_case_reference_as_str() {
        let urn = CaseReference::Urn {
            urn: "90GD1234521".to_string(),
        };
        assert_eq!(urn.as_str(), "90GD1234521");

        let prosecutor = CaseReference::ProsecutorRef {
            reference: "TFL-0045-22".to_string(),
        };
        assert_eq!(prosecutor.as_str(), "TFL-0045-22");
    }

    #[test]
    fn test_case_reference_serialization_round_trip() {
        let reference = CaseReference::Urn {
            urn: "90GD1234521".to_string(),
        };
        let json = serde_json::to_string(&reference).unwrap();
        let deserialized: CaseReference = serde_json::from_str(&json).unwrap();
        assert_eq!(reference, deserialized);
    }

    #[test]
    fn test_addressed_by_matches_every_reference_form() {
        let detail = CaseDetail {
            id: CaseId::new(),
            urn: "10AA0000001".to_string(),
            prosecutor_reference: Some("TFL-0045-22".to_string()),
            received_at: Utc::now(),
        };
        assert!(detail.addressed_by("10AA0000001"));
        assert!(detail.addressed_by("TFL-0045-22"));
        assert!(detail.addressed_by(&detail.id.to_string()));
        assert!(!detail.addressed_by("99ZZ9999999"));
    }

    #[test]
    fn test_case_detail_summary_projection() {
        let detail = CaseDetail {
            id: CaseId::new(),
            urn: "25AB0000101".to_string(),
            prosecutor_reference: None,
            received_at: Utc::now(),
        };
        let summary = detail.summary();
        assert_eq!(summary.id, detail.id);
        assert_eq!(summary.urn, "25AB0000101");
    }
}
