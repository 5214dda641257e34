//! Page and style compilation for incremental builds.
//!
//! # Module Structure
//!
//! ```text
//! compiler/
//! ├── include.rs       # IncludeBundler: nested template includes
//! ├── style.rs         # SCSS → CSS, dependency capture, content hash
//! ├── inject.rs        # <link>/<script> injection
//! ├── dependency.rs    # DependencyIndex
//! ├── hashes.rs        # StyleHashIndex
//! ├── write.rs         # output writing
//! └── orchestrator/    # full and incremental passes
//! ```

pub mod dependency;
mod error;
mod hashes;
pub mod include;
pub mod inject;
mod orchestrator;
pub mod style;
mod write;

pub use dependency::DependencyIndex;
pub use error::CompileError;
pub use hashes::StyleHashIndex;
pub use include::IncludeBundler;
pub use orchestrator::Orchestrator;
pub use write::write_output;
