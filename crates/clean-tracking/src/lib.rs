//! Artifact tracking for the basic cleaning step.
//!
//! Provides the [`ArtifactStore`] interface used by the step together with a
//! filesystem-backed store ([`LocalArtifactStore`]) and an in-memory store for
//! tests ([`InMemoryArtifactStore`]). Every artifact version is content
//! addressed by SHA-256 and every resolve/publish records a lineage edge on
//! the calling run.

pub mod error;
pub mod hash;
pub mod local;
pub mod memory;
pub mod store;

// === Store ===
pub use local::{ARTIFACTS_DIR, LocalArtifactStore, MANIFEST_FILE, RUNS_DIR};
pub use memory::InMemoryArtifactStore;
pub use store::{ArtifactStore, ResolvedArtifact};

// === Hashing ===
pub use hash::{compute_digest, compute_file_digest};

// === Errors ===
pub use error::{PublishError, ResolutionError, RunRecordError};
