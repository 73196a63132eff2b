//! Maps `Box<dyn Error>` from trait boundaries to typed `CaneError`.
//!
//! The traits in `cane_traits` use `Box<dyn Error + Send + Sync>` so that any
//! backend can plug in; this module converts those to our typed error enum,
//! with an optional feature-gated path for `cane_hardware::HwError` downcasting.

use crate::error::CaneError;

/// Map a trait-boundary error to a typed `CaneError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> CaneError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<cane_hardware::error::HwError>() {
            return match hw {
                cane_hardware::error::HwError::EchoTimeout => CaneError::Timeout,
                other => CaneError::HardwareFault(other.to_string()),
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        CaneError::Timeout
    } else {
        CaneError::Hardware(s)
    }
}

/// Owned variant for `map_err` on peripheral results.
#[inline]
pub fn hw(e: Box<dyn std::error::Error + Send + Sync>) -> CaneError {
    map_hw_error(e.as_ref())
}
