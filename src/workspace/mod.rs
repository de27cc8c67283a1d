//! Documents, snapshots, loading and atomic change application.
//!
//! - [`Document`] / [`Solution`]: immutable snapshots shared by every rule
//! - [`ProjectLoader`]: opens `.csproj` and `.sln` targets
//! - [`Workspace`]: the live snapshot, replaced only by compare-and-swap
//! - [`ChangeCoordinator`]: stages a [`ChangeSet`] and commits it all-or-nothing

pub mod coordinator;
pub mod document;
pub mod live;
pub mod loader;
pub mod solution;
pub mod store;

pub use coordinator::{ChangeCoordinator, ChangeSet, CommitReport, StagedChanges};
pub use document::{Document, DocumentId};
pub use live::Workspace;
pub use loader::{LoadResult, ProjectLoader};
pub use solution::{Project, Solution, SolutionBuilder};
pub use store::{DocumentStore, FileSystemStore, MemoryStore, PendingWrite};
