//! libgit2-backed checkpoints

mod service;

pub use service::{GitError, GitVersionControl};
