//! Tokio runtime and mock server shared by the steps of one scenario.

use std::cell::RefCell;
use std::rc::Rc;

use roster::IntakeError;
use rstest_bdd::Slot;
use tokio::runtime::Runtime;
use wiremock::{Mock, MockServer};

/// Runtime handle that can live in an `rstest-bdd` slot.
#[derive(Clone)]
pub struct SharedRuntime(Rc<RefCell<Runtime>>);

impl SharedRuntime {
    pub fn new(runtime: Runtime) -> Self {
        Self(Rc::new(RefCell::new(runtime)))
    }

    pub fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.0.borrow().block_on(future)
    }
}

/// Starts the runtime and the mock server on first use.
///
/// # Errors
///
/// Returns [`IntakeError::Io`] when the runtime cannot be created.
pub fn ensure_runtime_and_server(
    runtime: &Slot<SharedRuntime>,
    server: &Slot<MockServer>,
) -> Result<SharedRuntime, IntakeError> {
    if runtime.with_ref(|_| ()).is_none() {
        let created = Runtime::new().map_err(|error| IntakeError::Io {
            message: format!("failed to create Tokio runtime: {error}"),
        })?;
        runtime.set(SharedRuntime::new(created));
    }

    let shared_runtime = runtime.get().ok_or_else(|| IntakeError::Api {
        message: "runtime not initialised".to_owned(),
    })?;

    if server.with_ref(|_| ()).is_none() {
        server.set(shared_runtime.block_on(MockServer::start()));
    }

    Ok(shared_runtime)
}

/// Mounts mocks on the scenario's server.
///
/// # Errors
///
/// Returns [`IntakeError::Api`] when the server has not been started.
pub fn mount_all(
    runtime: &Slot<SharedRuntime>,
    server: &Slot<MockServer>,
    mocks: Vec<Mock>,
) -> Result<(), IntakeError> {
    let shared_runtime = ensure_runtime_and_server(runtime, server)?;
    server
        .with_ref(|mock_server| {
            for mock in mocks {
                shared_runtime.block_on(mock.mount(mock_server));
            }
        })
        .ok_or_else(|| IntakeError::Api {
            message: "mock server not initialised".to_owned(),
        })
}
