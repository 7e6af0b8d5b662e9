//! Build manifest parsers

pub mod gradle;
pub mod maven;
pub mod traits;

pub use gradle::GradleParser;
pub use maven::MavenParser;
pub use traits::{ManifestParser, ParsedManifest, ParserFactory};
