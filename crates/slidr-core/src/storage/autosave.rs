//! Debounced project autosave.
//!
//! Edits mark the project dirty; once no edit has happened for the
//! configured delay a save becomes due. Every save carries a
//! [`SaveTicket`]. A result whose ticket belongs to another project, or
//! to a save older than the newest one issued, is discarded so it can
//! never overwrite the status of newer work.

use super::{IdentityProvider, Project, ProjectStore, StorageResult};
use crate::input::Instant;
use std::time::Duration;

/// What the save indicator shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    /// No signed-in user or no project: edits stay in memory.
    #[default]
    LocalOnly,
    Idle,
    /// Edited, waiting for the quiet period to end.
    Pending,
    Saving,
    Saved,
    Error(String),
}

/// Identifies one issued save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveTicket {
    epoch: u64,
    sequence: u64,
}

/// A save the host should run against its [`ProjectStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub ticket: SaveTicket,
    pub project_id: String,
    pub title: String,
    pub content: String,
}

impl SaveRequest {
    /// Run the request against `store`.
    pub async fn execute<S: ProjectStore + ?Sized>(&self, store: &S) -> StorageResult<Project> {
        store
            .update_project(&self.project_id, &self.title, &self.content)
            .await
    }
}

/// Schedules saves for the open project.
#[derive(Debug, Clone)]
pub struct AutoSaver {
    delay: Duration,
    /// Id of the project saves go to; `None` while local-only.
    project: Option<String>,
    title: String,
    /// Bumped whenever the open project changes.
    epoch: u64,
    /// Sequence of the newest issued save.
    sequence: u64,
    edited_at: Option<Instant>,
    status: SaveStatus,
}

impl AutoSaver {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            project: None,
            title: String::new(),
            epoch: 0,
            sequence: 0,
            edited_at: None,
            status: SaveStatus::LocalOnly,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn status(&self) -> &SaveStatus {
        &self.status
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Whether edits are waiting to be saved.
    pub fn is_pending(&self) -> bool {
        self.edited_at.is_some()
    }

    /// Switch to another project (or to none).
    ///
    /// Saves are only scheduled while someone is signed in. Results of
    /// saves issued for the previous project are ignored from now on.
    pub fn attach(&mut self, project: Option<&Project>, identity: &dyn IdentityProvider) {
        self.epoch += 1;
        self.edited_at = None;
        match (identity.current_user(), project) {
            (Some(user), Some(project)) => {
                log::info!("Autosave attached to project {} for {}", project.id, user);
                self.title = project.title.clone();
                self.project = Some(project.id.clone());
                self.status = SaveStatus::Idle;
            }
            _ => {
                log::debug!("Autosave disabled: no signed-in user or no project");
                self.title = project.map(|p| p.title.clone()).unwrap_or_default();
                self.project = None;
                self.status = SaveStatus::LocalOnly;
            }
        }
    }

    /// Record an edit. Restarts the quiet period.
    pub fn mark_edited(&mut self, now: Instant) {
        if self.project.is_none() {
            return;
        }
        self.edited_at = Some(now);
        if self.status != SaveStatus::Saving {
            self.status = SaveStatus::Pending;
        }
    }

    /// Rename the project. Counts as an edit.
    pub fn set_title(&mut self, title: &str, now: Instant) {
        if self.title == title {
            return;
        }
        self.title = title.to_string();
        self.mark_edited(now);
    }

    /// Whether the quiet period after the last edit has passed.
    pub fn is_due(&self, now: Instant) -> bool {
        self.project.is_some()
            && self
                .edited_at
                .is_some_and(|at| now.saturating_duration_since(at) >= self.delay)
    }

    /// Issue a save of `content` now, regardless of the quiet period.
    pub fn begin_save(&mut self, content: String) -> Option<SaveRequest> {
        let project_id = self.project.as_ref()?;
        self.sequence += 1;
        self.edited_at = None;
        self.status = SaveStatus::Saving;
        Some(SaveRequest {
            ticket: SaveTicket {
                epoch: self.epoch,
                sequence: self.sequence,
            },
            project_id: project_id.clone(),
            title: self.title.clone(),
            content,
        })
    }

    /// Issue a save if one is due. `content` is only called when it is.
    pub fn poll(&mut self, now: Instant, content: impl FnOnce() -> String) -> Option<SaveRequest> {
        if !self.is_due(now) {
            return None;
        }
        self.begin_save(content())
    }

    /// Report the outcome of a save. Returns `false` if the result was
    /// stale and discarded.
    pub fn finish_save<T>(&mut self, ticket: SaveTicket, result: &StorageResult<T>) -> bool {
        if ticket.epoch != self.epoch {
            log::warn!("Discarding save result for a project that is no longer open");
            return false;
        }
        if ticket.sequence != self.sequence {
            log::warn!(
                "Discarding result of save #{}, newer save #{} was issued",
                ticket.sequence,
                self.sequence
            );
            return false;
        }
        self.status = match result {
            Ok(_) if self.edited_at.is_some() => SaveStatus::Pending,
            Ok(_) => {
                log::info!("Saved project {}", self.project_id().unwrap_or_default());
                SaveStatus::Saved
            }
            Err(e) => {
                log::error!("Failed to save project: {}", e);
                SaveStatus::Error(e.to_string())
            }
        };
        true
    }

    /// Issue, run and finish a save in one go.
    pub async fn save_now<S: ProjectStore + ?Sized>(&mut self, store: &S, content: String) -> StorageResult<bool> {
        let Some(request) = self.begin_save(content) else {
            return Ok(false);
        };
        let result = request.execute(store).await;
        self.finish_save(request.ticket, &result);
        result.map(|_| true)
    }
}
