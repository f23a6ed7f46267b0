//! Project persistence collaborators.
//!
//! The editor core only needs the CRUD calls of [`ProjectStore`] and a
//! [`IdentityProvider`] telling it who is signed in. Without an identity
//! editing stays local and nothing is saved.

mod autosave;
mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use autosave::{AutoSaver, SaveRequest, SaveStatus, SaveTicket};
pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Project not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Opaque identity of a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A stored project. `content` is the encoded graph (see [`crate::codec`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub owner: UserId,
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Tells the core who is signed in.
pub trait IdentityProvider {
    fn current_user(&self) -> Option<UserId>;
}

impl IdentityProvider for Option<UserId> {
    fn current_user(&self) -> Option<UserId> {
        self.clone()
    }
}

/// Trait for project storage backends.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait ProjectStore: Send + Sync {
    /// Create a project with a fresh id.
    fn create_project(&self, owner: &UserId, title: &str, content: &str) -> BoxFuture<'_, StorageResult<Project>>;

    fn get_project(&self, id: &str) -> BoxFuture<'_, StorageResult<Project>>;

    /// Replace a project's title and content.
    fn update_project(&self, id: &str, title: &str, content: &str) -> BoxFuture<'_, StorageResult<Project>>;

    /// Delete a project. Deleting a missing project is not an error.
    fn delete_project(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// Projects owned by `owner`, sorted by title.
    fn list_projects(&self, owner: &UserId) -> BoxFuture<'_, StorageResult<Vec<Project>>>;
}

/// Trait for project storage backends (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait ProjectStore {
    /// Create a project with a fresh id.
    fn create_project(&self, owner: &UserId, title: &str, content: &str) -> BoxFuture<'_, StorageResult<Project>>;

    fn get_project(&self, id: &str) -> BoxFuture<'_, StorageResult<Project>>;

    /// Replace a project's title and content.
    fn update_project(&self, id: &str, title: &str, content: &str) -> BoxFuture<'_, StorageResult<Project>>;

    /// Delete a project. Deleting a missing project is not an error.
    fn delete_project(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// Projects owned by `owner`, sorted by title.
    fn list_projects(&self, owner: &UserId) -> BoxFuture<'_, StorageResult<Vec<Project>>>;
}

fn sort_projects(projects: &mut [Project]) {
    projects.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));
}

#[cfg(test)]
pub(crate) fn block_on<F: std::future::Future>(f: F) -> F::Output {
    // Simple blocking executor for tests
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        match f.as_mut().poll(&mut cx) {
            Poll::Ready(result) => return result,
            Poll::Pending => {}
        }
    }
}
