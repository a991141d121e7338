//! # Application Status Refreshers
//!
//! Two refreshers, because the control plane tracks two independent lifecycles:
//!
//! - [`ApplicationRefresher`] polls the application summary (create and delete waits);
//! - [`ApplicationVersionRefresher`] polls one application version (update waits).
//!
//! Both map [`ApiError::NotFound`] to [`Observation::Absent`] and pass every other
//! error through untouched.

use crate::model::{ApplicationId, ApplicationStatus, ApplicationVersionStatus};
use crate::remote::{ApiError, ApplicationApi, ApplicationSummary, ApplicationVersionDetail};
use async_trait::async_trait;
use reconcile_framework::{Observation, StatusRefresher};
use std::sync::Arc;
use tracing::debug;

/// Fetches an application, rejecting a response that carries no application.
pub async fn find_application(
    api: &dyn ApplicationApi,
    id: &ApplicationId,
) -> Result<ApplicationSummary, ApiError> {
    let summary = api.get_application(id).await?;
    if summary.application_id.as_str().is_empty() {
        return Err(ApiError::EmptyResult(format!("get_application({id})")));
    }
    Ok(summary)
}

/// Fetches one version of an application.
pub async fn find_application_version(
    api: &dyn ApplicationApi,
    id: &ApplicationId,
    version: u32,
) -> Result<ApplicationVersionDetail, ApiError> {
    let detail = api.get_application_version(id, version).await?;
    if detail.application_version != version {
        return Err(ApiError::EmptyResult(format!(
            "get_application_version({id}, {version})"
        )));
    }
    Ok(detail)
}

/// Polls the application summary.
pub struct ApplicationRefresher {
    api: Arc<dyn ApplicationApi>,
    id: ApplicationId,
}

impl ApplicationRefresher {
    pub fn new(api: Arc<dyn ApplicationApi>, id: ApplicationId) -> Self {
        Self { api, id }
    }
}

#[async_trait]
impl StatusRefresher for ApplicationRefresher {
    type Payload = ApplicationSummary;
    type Status = ApplicationStatus;
    type Error = ApiError;

    async fn refresh(&self) -> Result<Observation<ApplicationSummary, ApplicationStatus>, ApiError> {
        match find_application(self.api.as_ref(), &self.id).await {
            Ok(summary) => Ok(Observation::Present {
                status: summary.status,
                payload: summary,
            }),
            Err(e) if e.is_not_found() => {
                debug!(application_id = %self.id, "Application not found");
                Ok(Observation::Absent)
            }
            Err(e) => Err(e),
        }
    }
}

/// Polls a single application version.
pub struct ApplicationVersionRefresher {
    api: Arc<dyn ApplicationApi>,
    id: ApplicationId,
    version: u32,
}

impl ApplicationVersionRefresher {
    pub fn new(api: Arc<dyn ApplicationApi>, id: ApplicationId, version: u32) -> Self {
        Self { api, id, version }
    }
}

#[async_trait]
impl StatusRefresher for ApplicationVersionRefresher {
    type Payload = ApplicationVersionDetail;
    type Status = ApplicationVersionStatus;
    type Error = ApiError;

    async fn refresh(
        &self,
    ) -> Result<Observation<ApplicationVersionDetail, ApplicationVersionStatus>, ApiError> {
        match find_application_version(self.api.as_ref(), &self.id, self.version).await {
            Ok(detail) => Ok(Observation::Present {
                status: detail.status,
                payload: detail,
            }),
            Err(e) if e.is_not_found() => Ok(Observation::Absent),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EngineType;
    use crate::remote::mock::MockApplicationApi;

    fn summary(status: ApplicationStatus) -> ApplicationSummary {
        ApplicationSummary {
            application_id: ApplicationId::from("app-1"),
            application_arn: "arn:app-1".to_string(),
            name: "APP1".to_string(),
            engine_type: EngineType::Bluage,
            description: None,
            kms_key_id: None,
            role_arn: None,
            status,
            status_reason: None,
            latest_version: 1,
        }
    }

    #[tokio::test]
    async fn test_present_application_reports_status() {
        let mock = Arc::new(MockApplicationApi::new());
        mock.expect_get()
            .return_ok(summary(ApplicationStatus::Creating));
        let refresher = ApplicationRefresher::new(mock.clone(), ApplicationId::from("app-1"));

        let observation = refresher.refresh().await.unwrap();
        assert_eq!(observation.status(), Some(ApplicationStatus::Creating));
        mock.verify();
    }

    #[tokio::test]
    async fn test_not_found_is_absent_not_error() {
        let mock = Arc::new(MockApplicationApi::new());
        mock.expect_get()
            .return_err(ApiError::NotFound("app-1".to_string()));
        let refresher = ApplicationRefresher::new(mock.clone(), ApplicationId::from("app-1"));

        assert_eq!(refresher.refresh().await.unwrap(), Observation::Absent);
    }

    #[tokio::test]
    async fn test_other_errors_propagate() {
        let mock = Arc::new(MockApplicationApi::new());
        mock.expect_get().return_err(ApiError::Throttled);
        let refresher = ApplicationRefresher::new(mock.clone(), ApplicationId::from("app-1"));

        assert_eq!(refresher.refresh().await.unwrap_err(), ApiError::Throttled);
    }

    #[tokio::test]
    async fn test_empty_result_is_an_error() {
        let mock = Arc::new(MockApplicationApi::new());
        let mut empty = summary(ApplicationStatus::Available);
        empty.application_id = ApplicationId::from("");
        mock.expect_get().return_ok(empty);

        let err = find_application(mock.as_ref(), &ApplicationId::from("app-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::EmptyResult(_)));
    }

    #[tokio::test]
    async fn test_version_refresher_reports_version_status() {
        let mock = Arc::new(MockApplicationApi::new());
        mock.expect_get_version().return_ok(ApplicationVersionDetail {
            application_version: 2,
            definition_content: "{}".to_string(),
            status: ApplicationVersionStatus::Available,
            status_reason: None,
        });
        let refresher =
            ApplicationVersionRefresher::new(mock.clone(), ApplicationId::from("app-1"), 2);

        let observation = refresher.refresh().await.unwrap();
        assert_eq!(observation.status(), Some(ApplicationVersionStatus::Available));
        assert_eq!(
            mock.calls(),
            vec![crate::remote::mock::ApiCall::GetVersion(
                ApplicationId::from("app-1"),
                2
            )]
        );
    }
}
