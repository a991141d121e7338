//! # Control Plane Actor
//!
//! Owns every simulated application and processes requests one at a time, so the
//! store needs no locking.
//!
//! Transitions are driven by reads rather than wall-clock time: an application stays
//! `Creating` for [`ProvisioningPlan::create_polls`] reads of its summary, then becomes
//! `Available` (or `Failed` when a failure is planned). Version and deletion
//! transitions work the same way. This keeps tests deterministic regardless of the
//! poll interval.
//!
//! ## Operations
//!
//! * **Create**:
//!     1. A client token seen before returns the application it created, at its
//!        latest version.
//!     2. A name already in use by another application is a conflict.
//!     3. Otherwise allocates `app-<n>` with version 1 in `Creating`.
//!
//! * **Update**:
//!     1. Rejects a version other than the latest with a conflict.
//!     2. Rejects updates while the application is still creating or deleting.
//!     3. Records a new version in `Creating`, carrying over any field not sent.
//!
//! * **Delete**:
//!     1. Moves the application to `Deleting` and forgets its client token; repeating
//!        it is harmless.
//!     2. The application disappears after [`ProvisioningPlan::delete_polls`] reads.

use super::message::ControlPlaneRequest;
use crate::model::{ApplicationId, ApplicationStatus, ApplicationVersionStatus, Definition};
use crate::remote::{
    ApiError, ApplicationSummary, ApplicationVersionDetail, CreateApplicationInput,
    CreateApplicationOutput, UpdateApplicationInput,
};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// How many reads each in-progress state survives, and whether creation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningPlan {
    pub create_polls: u32,
    pub update_polls: u32,
    pub delete_polls: u32,
    /// When set, creation ends in `Failed` with this reason.
    pub create_failure: Option<String>,
}

impl Default for ProvisioningPlan {
    fn default() -> Self {
        Self {
            create_polls: 1,
            update_polls: 1,
            delete_polls: 1,
            create_failure: None,
        }
    }
}

struct StoredVersion {
    detail: ApplicationVersionDetail,
    polls_left: u32,
}

struct StoredApplication {
    summary: ApplicationSummary,
    versions: BTreeMap<u32, StoredVersion>,
    polls_left: u32,
}

pub struct ControlPlaneActor {
    receiver: mpsc::Receiver<ControlPlaneRequest>,
    store: HashMap<ApplicationId, StoredApplication>,
    tokens: HashMap<String, ApplicationId>,
    next_id: u32,
    plan: ProvisioningPlan,
}

impl ControlPlaneActor {
    pub(crate) fn new(receiver: mpsc::Receiver<ControlPlaneRequest>, plan: ProvisioningPlan) -> Self {
        Self {
            receiver,
            store: HashMap::new(),
            tokens: HashMap::new(),
            next_id: 1,
            plan,
        }
    }

    /// Processes requests until every handle has been dropped.
    pub async fn run(mut self) {
        info!(plan = ?self.plan, "Control plane started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ControlPlaneRequest::Create { input, respond_to } => {
                    let _ = respond_to.send(self.create(input));
                }
                ControlPlaneRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(self.get(&id));
                }
                ControlPlaneRequest::GetVersion {
                    id,
                    version,
                    respond_to,
                } => {
                    let _ = respond_to.send(self.get_version(&id, version));
                }
                ControlPlaneRequest::Update { input, respond_to } => {
                    let _ = respond_to.send(self.update(input));
                }
                ControlPlaneRequest::Delete { id, respond_to } => {
                    let _ = respond_to.send(self.delete(&id));
                }
            }
        }

        info!(size = self.store.len(), "Control plane shutdown");
    }

    fn create(&mut self, input: CreateApplicationInput) -> Result<CreateApplicationOutput, ApiError> {
        debug!(name = %input.name, token = %input.client_token, "Create");
        if let Some(id) = self.tokens.get(&input.client_token) {
            if let Some(app) = self.store.get(id) {
                info!(%id, "Create replayed for known client token");
                return Ok(CreateApplicationOutput {
                    application_id: id.clone(),
                    application_arn: app.summary.application_arn.clone(),
                    application_version: app.summary.latest_version,
                });
            }
        }
        if input.name.is_empty() {
            return Err(ApiError::Validation("name must not be empty".to_string()));
        }
        if self.store.values().any(|app| app.summary.name == input.name) {
            warn!(name = %input.name, "Name already in use");
            return Err(ApiError::Conflict(format!(
                "application name {} already exists",
                input.name
            )));
        }

        let id = ApplicationId(format!("app-{}", self.next_id));
        self.next_id += 1;
        let summary = ApplicationSummary {
            application_id: id.clone(),
            application_arn: format!("arn:simulated:application/{id}"),
            name: input.name,
            engine_type: input.engine_type,
            description: input.description.filter(|d| !d.is_empty()),
            kms_key_id: input.kms_key_id,
            role_arn: input.role_arn,
            status: ApplicationStatus::Creating,
            status_reason: None,
            latest_version: 1,
        };
        let version = StoredVersion {
            detail: ApplicationVersionDetail {
                application_version: 1,
                definition_content: resolve(&input.definition),
                status: ApplicationVersionStatus::Creating,
                status_reason: None,
            },
            polls_left: self.plan.create_polls,
        };

        let output = CreateApplicationOutput {
            application_id: id.clone(),
            application_arn: summary.application_arn.clone(),
            application_version: 1,
        };
        self.tokens.insert(input.client_token, id.clone());
        self.store.insert(
            id.clone(),
            StoredApplication {
                summary,
                versions: BTreeMap::from([(1, version)]),
                polls_left: self.plan.create_polls,
            },
        );
        info!(%id, size = self.store.len(), "Created");
        Ok(output)
    }

    fn get(&mut self, id: &ApplicationId) -> Result<ApplicationSummary, ApiError> {
        let Some(app) = self.store.get_mut(id) else {
            debug!(%id, found = false, "Get");
            return Err(ApiError::NotFound(id.to_string()));
        };

        if app.polls_left > 0 {
            app.polls_left -= 1;
        } else {
            match app.summary.status {
                ApplicationStatus::Creating => {
                    let failure = self.plan.create_failure.clone();
                    settle_creation(app, failure);
                }
                ApplicationStatus::Deleting => {
                    self.store.remove(id);
                    info!(%id, size = self.store.len(), "Deleted");
                    return Err(ApiError::NotFound(id.to_string()));
                }
                _ => {}
            }
        }
        debug!(%id, status = %app.summary.status, "Get");
        Ok(app.summary.clone())
    }

    fn get_version(
        &mut self,
        id: &ApplicationId,
        version: u32,
    ) -> Result<ApplicationVersionDetail, ApiError> {
        let stored = self
            .store
            .get_mut(id)
            .and_then(|app| app.versions.get_mut(&version))
            .ok_or_else(|| ApiError::NotFound(format!("{id} version {version}")))?;

        if stored.detail.status == ApplicationVersionStatus::Creating {
            if stored.polls_left > 0 {
                stored.polls_left -= 1;
            } else {
                stored.detail.status = ApplicationVersionStatus::Available;
            }
        }
        debug!(%id, version, status = %stored.detail.status, "GetVersion");
        Ok(stored.detail.clone())
    }

    fn update(&mut self, input: UpdateApplicationInput) -> Result<u32, ApiError> {
        let id = &input.application_id;
        debug!(%id, version = input.current_application_version, "Update");
        let app = self
            .store
            .get_mut(id)
            .ok_or_else(|| ApiError::NotFound(id.to_string()))?;

        let latest = app.summary.latest_version;
        if input.current_application_version != latest {
            warn!(%id, sent = input.current_application_version, latest, "Stale version");
            return Err(ApiError::Conflict(format!(
                "version {} is not the latest version {latest}",
                input.current_application_version
            )));
        }
        if matches!(
            app.summary.status,
            ApplicationStatus::Creating | ApplicationStatus::Deleting
        ) {
            return Err(ApiError::Conflict(format!(
                "application is {}",
                app.summary.status
            )));
        }

        let content = match &input.definition {
            Some(definition) => resolve(definition),
            None => app
                .versions
                .get(&latest)
                .map(|v| v.detail.definition_content.clone())
                .unwrap_or_default(),
        };
        if let Some(description) = input.description {
            app.summary.description = Some(description).filter(|d| !d.is_empty());
        }

        let next = latest + 1;
        app.summary.latest_version = next;
        app.versions.insert(
            next,
            StoredVersion {
                detail: ApplicationVersionDetail {
                    application_version: next,
                    definition_content: content,
                    status: ApplicationVersionStatus::Creating,
                    status_reason: None,
                },
                polls_left: self.plan.update_polls,
            },
        );
        info!(%id, version = next, "Updated");
        Ok(next)
    }

    fn delete(&mut self, id: &ApplicationId) -> Result<(), ApiError> {
        let app = self
            .store
            .get_mut(id)
            .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
        if app.summary.status != ApplicationStatus::Deleting {
            app.summary.status = ApplicationStatus::Deleting;
            app.summary.status_reason = None;
            app.polls_left = self.plan.delete_polls;
        }
        self.tokens.retain(|_, owner| owner != id);
        info!(%id, "Deleting");
        Ok(())
    }
}

fn settle_creation(app: &mut StoredApplication, failure: Option<String>) {
    let (status, version_status) = match failure {
        Some(reason) => {
            app.summary.status_reason = Some(reason);
            (ApplicationStatus::Failed, ApplicationVersionStatus::Failed)
        }
        None => (ApplicationStatus::Available, ApplicationVersionStatus::Available),
    };
    app.summary.status = status;
    if let Some(first) = app.versions.get_mut(&1) {
        first.detail.status = version_status;
        first.detail.status_reason = app.summary.status_reason.clone();
    }
}

/// Definition content as the control plane stores it; locations are resolved to a
/// stub document naming the source.
fn resolve(definition: &Definition) -> String {
    match definition {
        Definition::Content(content) => content.clone(),
        Definition::S3Location(location) => format!("{{\"source\":\"{location}\"}}"),
    }
}
