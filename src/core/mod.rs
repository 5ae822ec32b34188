//! Core infrastructure shared by every other module: fundamental types,
//! defaults, error handling and logging initialisation.
//!
//! - [`types`]: score aliases and the objective/metric/importance enums
//! - [`constants`]: configuration defaults and file format constants
//! - [`error`]: the crate error type and [`Result`] alias

pub mod constants;
pub mod error;
pub mod types;

pub use constants::*;
pub use error::{BoostError, Result};
pub use types::*;

use std::sync::atomic::{AtomicBool, Ordering};

static CORE_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initialize logging.
///
/// Installs `env_logger` (honouring `RUST_LOG`) the first time it is called.
/// Repeated calls, or a logger installed by the host application, are not
/// treated as errors.
pub fn initialize_core() -> Result<()> {
    if CORE_INITIALIZED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    // Try to initialize env_logger, ignore if already initialized
    let _ = env_logger::try_init();
    log::debug!("boost-ensemble {} initialized", BOOST_ENSEMBLE_VERSION);
    Ok(())
}

/// Check whether [`initialize_core`] has run.
pub fn is_core_initialized() -> bool {
    CORE_INITIALIZED.load(Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_is_idempotent() {
        assert!(initialize_core().is_ok());
        assert!(initialize_core().is_ok());
        assert!(is_core_initialized());
    }
}
