use async_trait::async_trait;
use reconcile_framework::{
    Observation, PollPolicy, StateWaiter, StatusReason, StatusRefresher, StatusSets, WaitError,
};
use std::fmt::Display;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

// --- Test Resource ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VolumeState {
    Provisioning,
    Ready,
    Releasing,
    Error,
}

impl Display for VolumeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Volume {
    id: String,
    state: VolumeState,
    message: Option<String>,
}

impl StatusReason for Volume {
    fn status_reason(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("volume api unavailable")]
struct VolumeApiError;

/// A fake remote volume that becomes ready after a fixed number of reads.
struct VolumeRefresher {
    reads: AtomicU32,
    ready_after: u32,
    gone_after: Option<u32>,
}

impl VolumeRefresher {
    fn provisioning(ready_after: u32) -> Self {
        Self {
            reads: AtomicU32::new(0),
            ready_after,
            gone_after: None,
        }
    }

    fn releasing(gone_after: u32) -> Self {
        Self {
            reads: AtomicU32::new(0),
            ready_after: u32::MAX,
            gone_after: Some(gone_after),
        }
    }
}

#[async_trait]
impl StatusRefresher for VolumeRefresher {
    type Payload = Volume;
    type Status = VolumeState;
    type Error = VolumeApiError;

    async fn refresh(&self) -> Result<Observation<Volume, VolumeState>, VolumeApiError> {
        let n = self.reads.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(gone_after) = self.gone_after {
            if n >= gone_after {
                return Ok(Observation::Absent);
            }
            return Ok(present(VolumeState::Releasing));
        }
        if n >= self.ready_after {
            Ok(present(VolumeState::Ready))
        } else {
            Ok(present(VolumeState::Provisioning))
        }
    }
}

fn present(state: VolumeState) -> Observation<Volume, VolumeState> {
    Observation::Present {
        payload: Volume {
            id: "vol-1".to_string(),
            state,
            message: None,
        },
        status: state,
    }
}

fn waiter(timeout: Duration) -> StateWaiter {
    StateWaiter::new(timeout, PollPolicy::fixed(Duration::from_secs(2)))
}

// --- Tests ---

#[tokio::test(start_paused = true)]
async fn test_waits_until_ready_and_returns_payload() {
    let refresher = VolumeRefresher::provisioning(4);
    let sets = StatusSets::new([VolumeState::Provisioning], [VolumeState::Ready]);

    let outcome = waiter(Duration::from_secs(60))
        .wait(&refresher, &sets, &CancellationToken::new())
        .await
        .expect("volume should become ready");

    assert_eq!(outcome.polls, 4);
    let volume = outcome.payload.expect("payload");
    assert_eq!(volume.id, "vol-1");
    assert_eq!(volume.state, VolumeState::Ready);
}

#[tokio::test(start_paused = true)]
async fn test_release_wait_succeeds_on_disappearance() {
    let refresher = VolumeRefresher::releasing(3);
    let sets = StatusSets::until_gone([VolumeState::Releasing]);

    let outcome = waiter(Duration::from_secs(60))
        .wait(&refresher, &sets, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.polls, 3);
    assert!(outcome.payload.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_slow_volume_times_out_with_last_payload() {
    let refresher = VolumeRefresher::provisioning(1_000);
    let sets = StatusSets::new([VolumeState::Provisioning], [VolumeState::Ready]);
    let started = tokio::time::Instant::now();

    let err = waiter(Duration::from_secs(30))
        .wait(&refresher, &sets, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(started.elapsed() >= Duration::from_secs(30));
    match err {
        WaitError::Timeout {
            last_status, last, ..
        } => {
            assert_eq!(last_status.as_deref(), Some("Provisioning"));
            assert_eq!(last.unwrap().id, "vol-1");
        }
        other => panic!("expected timeout, got {other}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_many_waits_run_concurrently_on_one_waiter() {
    let waiter = waiter(Duration::from_secs(120));
    let sets = StatusSets::new([VolumeState::Provisioning], [VolumeState::Ready]);
    let cancel = CancellationToken::new();

    let mut handles = Vec::new();
    for ready_after in 1..=8 {
        let sets = sets.clone();
        let cancel = cancel.clone();
        handles.push(tokio::spawn(async move {
            let refresher = VolumeRefresher::provisioning(ready_after);
            waiter.wait(&refresher, &sets, &cancel).await.map(|o| o.polls)
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let polls = handle.await.unwrap().unwrap();
        assert_eq!(polls, i as u32 + 1);
    }
}

#[tokio::test(start_paused = true)]
async fn test_error_state_is_terminal() {
    struct Broken;

    #[async_trait]
    impl StatusRefresher for Broken {
        type Payload = Volume;
        type Status = VolumeState;
        type Error = VolumeApiError;

        async fn refresh(&self) -> Result<Observation<Volume, VolumeState>, VolumeApiError> {
            Ok(Observation::Present {
                payload: Volume {
                    id: "vol-9".to_string(),
                    state: VolumeState::Error,
                    message: Some("disk controller offline".to_string()),
                },
                status: VolumeState::Error,
            })
        }
    }

    let sets = StatusSets::new([VolumeState::Provisioning], [VolumeState::Ready]);
    let err = waiter(Duration::from_secs(60))
        .wait(&Broken, &sets, &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.last_status(), Some("Error"));
    assert_eq!(err.reason(), Some("disk controller offline"));
    assert_eq!(err.last_payload().map(|v| v.id.as_str()), Some("vol-9"));
}
