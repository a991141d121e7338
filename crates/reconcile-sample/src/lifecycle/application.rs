//! # Application Lifecycle Orchestrator
//!
//! [`ApplicationLifecycle`] sequences Create, Read, Update, and Delete against the
//! control plane. Each mutating operation issues one call, then hands a refresher
//! and the operation's status sets to a [`StateWaiter`] and reconciles whatever the
//! wait observed back into the model.
//!
//! ## Operations
//!
//! * **Create**:
//!     1. Requires a definition (the union was validated when the model was built).
//!     2. Attaches a fresh idempotency token and calls `create_application`.
//!     3. Records the assigned id immediately.
//!     4. Waits for `Created`/`Available`. On failure the error is
//!        [`Tainted`](ApplicationError::Tainted) and carries the id.
//!
//! * **Read**:
//!     1. Fetches the summary; not-found means the application is gone (`Ok(None)`).
//!     2. Fetches the latest version, which holds the definition.
//!
//! * **Update**:
//!     1. Rejects replace-only field changes before touching the network.
//!     2. Returns the prior model untouched if no watched field changed.
//!     3. Sends the changed fields with the last observed version.
//!     4. Waits for the *new* version to become `Available`.
//!
//! * **Delete**:
//!     1. Calls `delete_application`; not-found counts as already deleted.
//!     2. Waits for the application to disappear.

use crate::error::{ApplicationError, Operation};
use crate::model::{
    ApplicationId, ApplicationModel, ApplicationStatus, ApplicationVersionStatus, Definition,
};
use crate::refresher::{
    find_application, find_application_version, ApplicationRefresher,
    ApplicationVersionRefresher,
};
use crate::remote::{ApplicationApi, CreateApplicationInput, UpdateApplicationInput};
use reconcile_framework::{PollPolicy, StateWaiter, StatusSets, TokenSource, UuidTokenSource};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Statuses for the create wait.
pub fn create_status_sets() -> StatusSets<ApplicationStatus> {
    StatusSets::new(
        [ApplicationStatus::Creating],
        [ApplicationStatus::Created, ApplicationStatus::Available],
    )
}

/// Statuses for the update wait, keyed on the new version.
pub fn update_status_sets() -> StatusSets<ApplicationVersionStatus> {
    StatusSets::new(
        [ApplicationVersionStatus::Creating],
        [ApplicationVersionStatus::Available],
    )
}

/// Statuses for the delete wait; success is disappearance.
pub fn delete_status_sets() -> StatusSets<ApplicationStatus> {
    StatusSets::until_gone([
        ApplicationStatus::Deleting,
        ApplicationStatus::DeletingFromEnvironment,
    ])
}

/// Drives application lifecycle operations against an injected control-plane client.
///
/// Cheap to clone and holds no per-application state, so one instance can
/// reconcile many applications concurrently.
#[derive(Clone)]
pub struct ApplicationLifecycle {
    api: Arc<dyn ApplicationApi>,
    tokens: Arc<dyn TokenSource>,
    poll: PollPolicy,
}

impl ApplicationLifecycle {
    pub fn new(api: Arc<dyn ApplicationApi>) -> Self {
        Self {
            api,
            tokens: Arc::new(UuidTokenSource),
            poll: PollPolicy::default(),
        }
    }

    pub fn with_tokens(mut self, tokens: Arc<dyn TokenSource>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Creates the application and waits for it to become usable.
    #[instrument(skip_all, fields(name = %model.name))]
    pub async fn create(
        &self,
        mut model: ApplicationModel,
        cancel: &CancellationToken,
    ) -> Result<ApplicationModel, ApplicationError> {
        debug!(?model, "create called");
        let definition = model
            .definition
            .clone()
            .ok_or(ApplicationError::MissingDefinition)?;

        let client_token = self.tokens.next_token();
        let input = CreateApplicationInput {
            name: model.name.clone(),
            engine_type: model.engine_type,
            description: model.description.clone(),
            definition,
            kms_key_id: model.kms_key_id.clone(),
            role_arn: model.role_arn.clone(),
            client_token: client_token.clone(),
        };

        let output = self.api.create_application(input).await.map_err(|source| {
            warn!(error = %source, "Create failed");
            ApplicationError::Api {
                operation: Operation::Create,
                id: model.name.clone(),
                source,
            }
        })?;

        let id = output.application_id;
        info!(application_id = %id, "Create accepted");
        model.application_id = Some(id.clone());
        model.arn = Some(output.application_arn);
        model.client_token = Some(client_token);

        let refresher = ApplicationRefresher::new(self.api.clone(), id.clone());
        let waiter = StateWaiter::new(model.timeouts.create(), self.poll);
        let outcome = match waiter.wait(&refresher, &create_status_sets(), cancel).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let err = ApplicationError::from_wait(Operation::Create, id.as_str(), e);
                warn!(application_id = %id, error = %err, "Create did not settle; recording id");
                return Err(err.tainted(model));
            }
        };

        let Some(summary) = outcome.payload else {
            return Err(ApplicationError::NotFound {
                operation: Operation::Create,
                id: id.to_string(),
            }
            .tainted(model));
        };
        model.reconcile_summary(&summary);
        model.current_version = Some(summary.latest_version);
        info!(application_id = %id, version = summary.latest_version, "Created");
        Ok(model)
    }

    /// Refreshes the model from the control plane.
    ///
    /// Returns `Ok(None)` when the application no longer exists; the caller should
    /// drop its record.
    #[instrument(skip_all, fields(application_id))]
    pub async fn read(
        &self,
        model: &ApplicationModel,
        cancel: &CancellationToken,
    ) -> Result<Option<ApplicationModel>, ApplicationError> {
        let id = model
            .application_id
            .clone()
            .ok_or(ApplicationError::MissingIdentifier)?;
        tracing::Span::current().record("application_id", tracing::field::display(&id));

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ApplicationError::Cancelled {
                operation: Operation::Read,
                id: id.to_string(),
            }),
            refreshed = self.fetch(model, &id) => refreshed,
        }
    }

    async fn fetch(
        &self,
        model: &ApplicationModel,
        id: &ApplicationId,
    ) -> Result<Option<ApplicationModel>, ApplicationError> {
        let summary = match find_application(self.api.as_ref(), id).await {
            Ok(summary) => summary,
            Err(e) if e.is_not_found() => {
                warn!("Application not found, removing from state");
                return Ok(None);
            }
            Err(source) => {
                return Err(ApplicationError::Api {
                    operation: Operation::Read,
                    id: id.to_string(),
                    source,
                })
            }
        };

        let version = summary.latest_version;
        let detail = find_application_version(self.api.as_ref(), id, version)
            .await
            .map_err(|source| ApplicationError::Api {
                operation: Operation::Read,
                id: format!("{id} version {version}"),
                source,
            })?;

        let mut refreshed = model.clone();
        refreshed.reconcile_summary(&summary);
        refreshed.current_version = Some(detail.application_version);
        refreshed.definition = Some(Definition::Content(detail.definition_content));
        debug!(version, "Read");
        Ok(Some(refreshed))
    }

    /// Applies watched-field changes from `old` to `new` in place.
    ///
    /// `old` must be the last reconciled state: its version is the one sent to the
    /// control plane.
    #[instrument(skip_all, fields(application_id))]
    pub async fn update(
        &self,
        old: &ApplicationModel,
        new: ApplicationModel,
        cancel: &CancellationToken,
    ) -> Result<ApplicationModel, ApplicationError> {
        let id = old
            .application_id
            .clone()
            .ok_or(ApplicationError::MissingIdentifier)?;
        tracing::Span::current().record("application_id", tracing::field::display(&id));

        if let Some(field) = old.replacement_field(&new) {
            return Err(ApplicationError::RequiresReplacement {
                id: id.to_string(),
                field,
            });
        }
        if new.definition.is_none() {
            return Err(ApplicationError::MissingDefinition);
        }

        let changes = old.changes_to(&new);
        if changes.is_empty() {
            debug!("No watched fields changed");
            let mut unchanged = old.clone();
            unchanged.timeouts = new.timeouts;
            return Ok(unchanged);
        }

        let version = old
            .current_version
            .ok_or_else(|| ApplicationError::MissingVersion(id.to_string()))?;
        debug!(version, ?changes, "Sending update");
        let input = UpdateApplicationInput {
            application_id: id.clone(),
            current_application_version: version,
            description: changes.description,
            definition: changes.definition,
        };

        let new_version = self.api.update_application(input).await.map_err(|source| {
            warn!(version, error = %source, "Update failed");
            if source.is_conflict() {
                ApplicationError::Conflict {
                    id: id.to_string(),
                    version,
                    source,
                }
            } else {
                ApplicationError::Api {
                    operation: Operation::Update,
                    id: id.to_string(),
                    source,
                }
            }
        })?;
        info!(version, new_version, "Update accepted");

        let refresher = ApplicationVersionRefresher::new(self.api.clone(), id.clone(), new_version);
        let waiter = StateWaiter::new(new.timeouts.update(), self.poll);
        if let Err(e) = waiter.wait(&refresher, &update_status_sets(), cancel).await {
            let err = ApplicationError::from_wait(Operation::Update, id.as_str(), e);
            warn!(new_version, error = %err, "Update did not settle; recording new version");
            let mut partial = old.clone();
            partial.current_version = Some(new_version);
            return Err(err.tainted(partial));
        }

        let mut updated = new;
        updated.application_id = old.application_id.clone();
        updated.arn = old.arn.clone();
        updated.status = old.status;
        updated.client_token = old.client_token.clone();
        updated.current_version = Some(new_version);
        info!(version = new_version, "Updated");
        Ok(updated)
    }

    /// Deletes the application and waits for it to disappear.
    #[instrument(skip_all, fields(application_id))]
    pub async fn delete(
        &self,
        model: &ApplicationModel,
        cancel: &CancellationToken,
    ) -> Result<(), ApplicationError> {
        let id = model
            .application_id
            .clone()
            .ok_or(ApplicationError::MissingIdentifier)?;
        tracing::Span::current().record("application_id", tracing::field::display(&id));

        match self.api.delete_application(&id).await {
            Ok(()) => info!("Delete accepted"),
            Err(e) if e.is_not_found() => {
                info!("Already deleted");
                return Ok(());
            }
            Err(source) => {
                warn!(error = %source, "Delete failed");
                return Err(ApplicationError::Api {
                    operation: Operation::Delete,
                    id: id.to_string(),
                    source,
                });
            }
        }

        let refresher = ApplicationRefresher::new(self.api.clone(), id.clone());
        let waiter = StateWaiter::new(model.timeouts.delete(), self.poll);
        waiter
            .wait(&refresher, &delete_status_sets(), cancel)
            .await
            .map_err(|e| ApplicationError::from_wait(Operation::Delete, id.as_str(), e))?;
        info!("Deleted");
        Ok(())
    }
}
