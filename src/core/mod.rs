//! Core types shared by the host and the pipeline.

mod compilation;
mod driver;
mod state;

pub use compilation::{ChunkMap, Compilation};
pub use driver::BuildMode;
pub use state::{is_shutdown, set_watching, setup_shutdown_handler};
