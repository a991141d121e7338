use reconcile_framework::{PollPolicy, SequentialTokenSource, TokenSource};
use reconcile_sample::control_plane::ProvisioningPlan;
use reconcile_sample::error::ApplicationError;
use reconcile_sample::lifecycle::ReconcileSystem;
use reconcile_sample::model::{ApplicationModel, ApplicationStatus, Definition, EngineType};
use reconcile_sample::remote::{ApplicationApi, CreateApplicationInput};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn system(plan: ProvisioningPlan) -> ReconcileSystem {
    ReconcileSystem::new(plan, PollPolicy::fixed(Duration::from_millis(100)))
        .with_tokens(Arc::new(SequentialTokenSource::new("tok")))
}

fn model(name: &str) -> ApplicationModel {
    ApplicationModel::new(
        name,
        EngineType::Microfocus,
        Definition::Content(r#"{"v":1}"#.to_string()),
    )
}

#[tokio::test(start_paused = true)]
async fn test_full_lifecycle() {
    let plan = ProvisioningPlan {
        create_polls: 2,
        update_polls: 2,
        delete_polls: 2,
        create_failure: None,
    };
    let system = system(plan);
    let cancel = CancellationToken::new();

    let created = system
        .lifecycle
        .create(model("APP1"), &cancel)
        .await
        .unwrap();
    assert_eq!(created.status, Some(ApplicationStatus::Available));
    assert_eq!(created.current_version, Some(1));

    let read = system
        .lifecycle
        .read(&created, &cancel)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(read.definition, created.definition);

    let mut desired = read.clone();
    desired.definition = Some(Definition::Content(r#"{"v":2}"#.to_string()));
    let updated = system
        .lifecycle
        .update(&read, desired, &cancel)
        .await
        .unwrap();
    assert_eq!(updated.current_version, Some(2));

    let reread = system
        .lifecycle
        .read(&updated, &cancel)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reread.current_version, Some(2));
    assert_eq!(
        reread.definition,
        Some(Definition::Content(r#"{"v":2}"#.to_string()))
    );

    system.lifecycle.delete(&reread, &cancel).await.unwrap();
    assert_eq!(system.lifecycle.read(&reread, &cancel).await.unwrap(), None);

    // Deleting twice is harmless.
    system.lifecycle.delete(&reread, &cancel).await.unwrap();

    system.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_failed_create_is_tainted_and_reported() {
    let plan = ProvisioningPlan {
        create_failure: Some("invalid definition".to_string()),
        ..Default::default()
    };
    let system = system(plan);

    let err = system
        .lifecycle
        .create(model("APP1"), &CancellationToken::new())
        .await
        .unwrap_err();

    let partial = err.tainted_model().expect("identifier recorded");
    assert!(partial.application_id.is_some());
    match err.root() {
        ApplicationError::TerminalStatus { reason, .. } => {
            assert_eq!(reason.as_deref(), Some("invalid definition"));
        }
        other => panic!("expected terminal status, got {other:?}"),
    }

    // The failed application can still be cleaned up.
    system
        .lifecycle
        .delete(partial, &CancellationToken::new())
        .await
        .unwrap();
    system.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_retried_create_with_same_token_is_deduplicated() {
    let system = system(ProvisioningPlan::default());
    let tokens = SequentialTokenSource::new("retry");
    let token = tokens.next_token();
    let input = CreateApplicationInput {
        name: "APP1".to_string(),
        engine_type: EngineType::Bluage,
        description: None,
        definition: Definition::Content("{}".to_string()),
        kms_key_id: None,
        role_arn: None,
        client_token: token,
    };

    let first = system
        .control_plane()
        .create_application(input.clone())
        .await
        .unwrap();
    let retried = system
        .control_plane()
        .create_application(input)
        .await
        .unwrap();

    assert_eq!(first.application_id, retried.application_id);
    system.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_stale_version_update_surfaces_conflict() {
    let system = system(ProvisioningPlan::default());
    let cancel = CancellationToken::new();
    let created = system
        .lifecycle
        .create(model("APP1"), &cancel)
        .await
        .unwrap();

    let first = system
        .lifecycle
        .update(&created, created.clone().with_description("one"), &cancel)
        .await
        .unwrap();
    assert_eq!(first.current_version, Some(2));

    // Reusing the pre-update model sends version 1 again.
    let err = system
        .lifecycle
        .update(&created, created.clone().with_description("two"), &cancel)
        .await
        .unwrap_err();

    assert!(err.is_conflict());
    match err {
        ApplicationError::Conflict { version, .. } => assert_eq!(version, 1),
        other => panic!("expected conflict, got {other:?}"),
    }
    system.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_creates_are_independent() {
    let system = system(ProvisioningPlan {
        create_polls: 3,
        ..Default::default()
    });
    let cancel = CancellationToken::new();

    let (a, b) = tokio::join!(
        system.lifecycle.create(model("APP-A"), &cancel),
        system.lifecycle.create(model("APP-B"), &cancel),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_ne!(a.application_id, b.application_id);
    assert_ne!(a.client_token, b.client_token);
    system.shutdown().await.unwrap();
}
