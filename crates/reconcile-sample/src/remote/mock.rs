//! # Mock Control Plane Client
//!
//! [`MockApplicationApi`] implements [`ApplicationApi`] from a queue of expectations,
//! in the same fluent style as the other mocks in this workspace:
//!
//! ```rust
//! use reconcile_sample::model::ApplicationId;
//! use reconcile_sample::remote::mock::MockApplicationApi;
//! use reconcile_sample::remote::{ApiError, ApplicationApi};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mock = MockApplicationApi::new();
//!     mock.expect_delete().return_err(ApiError::NotFound("app-1".into()));
//!
//!     let result = mock.delete_application(&ApplicationId::from("app-1")).await;
//!     assert!(result.unwrap_err().is_not_found());
//!     mock.verify();
//! }
//! ```
//!
//! Every call is recorded, so tests can also assert on *how many* calls were made
//! and with which arguments (see [`MockApplicationApi::calls`]).

use crate::model::ApplicationId;
use crate::remote::{
    ApiError, ApplicationApi, ApplicationSummary, ApplicationVersionDetail,
    CreateApplicationInput, CreateApplicationOutput, UpdateApplicationInput,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A call received by the mock, with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Create(CreateApplicationInput),
    Get(ApplicationId),
    GetVersion(ApplicationId, u32),
    Update(UpdateApplicationInput),
    Delete(ApplicationId),
}

impl ApiCall {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            ApiCall::Create(_) | ApiCall::Update(_) | ApiCall::Delete(_)
        )
    }
}

enum Expectation {
    Create(Result<CreateApplicationOutput, ApiError>),
    Get(Result<ApplicationSummary, ApiError>),
    GetVersion(Result<ApplicationVersionDetail, ApiError>),
    Update(Result<u32, ApiError>),
    Delete(Result<(), ApiError>),
}

type Queue = Arc<Mutex<VecDeque<Expectation>>>;

/// A mock control-plane client with expectation tracking.
#[derive(Default)]
pub struct MockApplicationApi {
    expectations: Queue,
    calls: Mutex<Vec<ApiCall>>,
}

impl MockApplicationApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_create(&self) -> ExpectationBuilder<CreateApplicationOutput> {
        ExpectationBuilder::new(self.expectations.clone(), Expectation::Create)
    }

    pub fn expect_get(&self) -> ExpectationBuilder<ApplicationSummary> {
        ExpectationBuilder::new(self.expectations.clone(), Expectation::Get)
    }

    pub fn expect_get_version(&self) -> ExpectationBuilder<ApplicationVersionDetail> {
        ExpectationBuilder::new(self.expectations.clone(), Expectation::GetVersion)
    }

    pub fn expect_update(&self) -> ExpectationBuilder<u32> {
        ExpectationBuilder::new(self.expectations.clone(), Expectation::Update)
    }

    pub fn expect_delete(&self) -> ExpectationBuilder<()> {
        ExpectationBuilder::new(self.expectations.clone(), Expectation::Delete)
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }

    fn next(&self, call: ApiCall) -> Expectation {
        let expectation = self.expectations.lock().unwrap().pop_front();
        self.calls.lock().unwrap().push(call.clone());
        match expectation {
            Some(expectation) => expectation,
            None => panic!("Unexpected call with no remaining expectations: {call:?}"),
        }
    }
}

/// Fluent builder returned by the `expect_*` methods.
pub struct ExpectationBuilder<T> {
    expectations: Queue,
    wrap: fn(Result<T, ApiError>) -> Expectation,
}

impl<T> ExpectationBuilder<T> {
    fn new(expectations: Queue, wrap: fn(Result<T, ApiError>) -> Expectation) -> Self {
        Self { expectations, wrap }
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: T) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back((self.wrap)(Ok(value)));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: ApiError) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back((self.wrap)(Err(error)));
    }
}

#[async_trait]
impl ApplicationApi for MockApplicationApi {
    async fn create_application(
        &self,
        input: CreateApplicationInput,
    ) -> Result<CreateApplicationOutput, ApiError> {
        match self.next(ApiCall::Create(input)) {
            Expectation::Create(response) => response,
            _ => panic!("Unexpected request or expectation mismatch: create_application"),
        }
    }

    async fn get_application(&self, id: &ApplicationId) -> Result<ApplicationSummary, ApiError> {
        match self.next(ApiCall::Get(id.clone())) {
            Expectation::Get(response) => response,
            _ => panic!("Unexpected request or expectation mismatch: get_application"),
        }
    }

    async fn get_application_version(
        &self,
        id: &ApplicationId,
        version: u32,
    ) -> Result<ApplicationVersionDetail, ApiError> {
        match self.next(ApiCall::GetVersion(id.clone(), version)) {
            Expectation::GetVersion(response) => response,
            _ => panic!("Unexpected request or expectation mismatch: get_application_version"),
        }
    }

    async fn update_application(&self, input: UpdateApplicationInput) -> Result<u32, ApiError> {
        match self.next(ApiCall::Update(input)) {
            Expectation::Update(response) => response,
            _ => panic!("Unexpected request or expectation mismatch: update_application"),
        }
    }

    async fn delete_application(&self, id: &ApplicationId) -> Result<(), ApiError> {
        match self.next(ApiCall::Delete(id.clone())) {
            Expectation::Delete(response) => response,
            _ => panic!("Unexpected request or expectation mismatch: delete_application"),
        }
    }
}
