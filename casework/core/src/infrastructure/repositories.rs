use crate::domain::case::{ApplicationId, HearingId};
use crate::domain::court_application::CourtApplication;
use crate::domain::hearing::{HearingLinkage, LinkageSubject};
use crate::domain::repository::{
    CourtApplicationRepository, HearingLinkageRepository, RepositoryError,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct InMemoryHearingLinkageRepository {
    linkages: Arc<Mutex<HashMap<(HearingId, LinkageSubject), HearingLinkage>>>,
}

impl InMemoryHearingLinkageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HearingLinkageRepository for InMemoryHearingLinkageRepository {
    async fn find(
        &self,
        hearing_id: HearingId,
        subject: LinkageSubject,
    ) -> Result<Option<HearingLinkage>, RepositoryError> {
        let linkages = self
            .linkages
            .lock()
            .map_err(|_| RepositoryError::Storage("Mutex poisoned".to_string()))?;
        Ok(linkages.get(&(hearing_id, subject)).cloned())
    }

    async fn save(&self, linkage: &HearingLinkage) -> Result<(), RepositoryError> {
        let mut linkages = self
            .linkages
            .lock()
            .map_err(|_| RepositoryError::Storage("Mutex poisoned".to_string()))?;
        linkages.insert((linkage.hearing_id, linkage.subject), linkage.clone());
        Ok(())
    }

    async fn find_by_hearing(
        &self,
        hearing_id: HearingId,
    ) -> Result<Vec<HearingLinkage>, RepositoryError> {
        let linkages = self
            .linkages
            .lock()
            .map_err(|_| RepositoryError::Storage("Mutex poisoned".to_string()))?;
        Ok(linkages
            .values()
            .filter(|l| l.hearing_id == hearing_id)
            .cloned()
            .collect())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryCourtApplicationRepository {
    applications: Arc<Mutex<HashMap<ApplicationId, CourtApplication>>>,
}

impl InMemoryCourtApplicationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourtApplicationRepository for InMemoryCourtApplicationRepository {
    async fn find_by_id(
        &self,
        id: ApplicationId,
    ) -> Result<Option<CourtApplication>, RepositoryError> {
        let applications = self
            .applications
            .lock()
            .map_err(|_| RepositoryError::Storage("Mutex poisoned".to_string()))?;
        Ok(applications.get(&id).cloned())
    }

    async fn save(&self, application: &CourtApplication) -> Result<(), RepositoryError> {
        let mut applications = self
            .applications
            .lock()
            .map_err(|_| RepositoryError::Storage("Mutex poisoned".to_string()))?;
        applications.insert(application.id, application.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::case::CaseId;

    #[tokio::test]
    async fn test_hearing_linkage_round_trip() {
        let repo = InMemoryHearingLinkageRepository::new();
        let hearing_id = HearingId::new();
        let subject = LinkageSubject::Case {
            case_id: CaseId::new(),
        };

        assert!(repo.find(hearing_id, subject).await.unwrap().is_none());

        let linkage = HearingLinkage::new(hearing_id, subject);
        repo.save(&linkage).await.unwrap();

        let found = repo.find(hearing_id, subject).await.unwrap().unwrap();
        assert_eq!(found.status, linkage.status);
        assert_eq!(repo.find_by_hearing(hearing_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_court_application_round_trip() {
        let repo = InMemoryCourtApplicationRepository::new();
        let application = CourtApplication::new(CaseId::new(), "APP-2026-0001");
        let id = application.id;

        repo.save(&application).await.unwrap();
        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.reference, "APP-2026-0001");
    }
}
