//! Slid'R Core Library
//!
//! Platform-agnostic core of a non-linear slide-deck editor: slides are
//! nodes of a directed graph, edges are the paths a presenter may take.
//!
//! - [`graph`] holds the slides and links of one project.
//! - [`session`] edits the graph (selection, clipboard, undo).
//! - [`content`] models what is on a slide, with its own [`content::editor`].
//! - [`presentation`] walks the graph during a show.
//! - [`codec`] reads and writes the persisted project format.
//! - [`storage`] persists projects and schedules autosaves.
//! - [`controller`] ties the views together for a host.

pub mod codec;
pub mod config;
pub mod content;
pub mod controller;
pub mod graph;
pub mod history;
pub mod input;
pub mod presentation;
pub mod selection;
pub mod session;
pub mod storage;
pub mod viewport;

pub use codec::ProjectData;
pub use config::{ConfigError, EditorConfig};
pub use content::{ContentEditor, Element, ElementId, ElementKind, Paint, SlideContent};
pub use controller::{View, Workspace, WorkspaceAction};
pub use graph::{Edge, EdgeDirection, EdgeId, GraphStore, NodeId, SlideNode};
pub use history::History;
pub use input::{EditorCommand, InputFocus, Key, KeyPress, Modifiers, PresentationCommand};
pub use presentation::{NavigationError, Notice, PlaybackStatus, PresentationEngine};
pub use session::{Clipboard, EdgeAction, EdgeMenu, EditSession, EditorMode};
pub use storage::{AutoSaver, MemoryStorage, Project, ProjectStore, SaveStatus, StorageError, UserId};
pub use viewport::{SlideViewport, Zoom};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
