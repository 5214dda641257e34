//! Process state for watch mode.
//!
//! - `WATCHING`: Has the watch loop started?
//! - `SHUTDOWN`: Has shutdown been requested? (Ctrl+C received)

use std::sync::atomic::{AtomicBool, Ordering};

/// The watch loop is running and polls `SHUTDOWN` between batches.
static WATCHING: AtomicBool = AtomicBool::new(false);

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Setup the global Ctrl+C handler. Call once at program start.
///
/// - Before `set_watching()`: exits immediately, there is nothing to drain
/// - After `set_watching()`: sets `SHUTDOWN` so the loop stops after the
///   current pass
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        SHUTDOWN.store(true, Ordering::SeqCst);

        if is_watching() {
            crate::log!("watch"; "shutting down...");
        } else {
            std::process::exit(0);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

pub fn set_watching() {
    WATCHING.store(true, Ordering::SeqCst);
}

pub fn is_watching() -> bool {
    WATCHING.load(Ordering::SeqCst)
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watching_flag() {
        set_watching();
        assert!(is_watching());
        assert!(!is_shutdown());
    }
}
