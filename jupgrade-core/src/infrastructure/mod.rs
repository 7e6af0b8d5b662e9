//! Infrastructure Layer - External concerns and implementations
//!
//! Manifest files, the Maven Central and NVD HTTP APIs, child processes and
//! the persisted state file.

pub mod api_clients;
pub mod manifest;
pub mod parsers;
pub mod process;
pub mod registries;
pub mod state;

pub use api_clients::{NvdClient, VulnerabilityApiClient};
pub use parsers::ParserFactory;
pub use parsers::traits::ManifestParser;
pub use process::{CommandOutput, CommandSpec, ProcessError, run_command};
pub use registries::{MavenCentralClient, PackageRegistryClient};
pub use state::{FileStateStore, InMemoryStateStore, StateStore};
