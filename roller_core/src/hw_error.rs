//! Maps `Box<dyn Error>` from trait boundaries to typed `RollerError`.
//!
//! The traits in `roller_traits` use `Box<dyn Error + Send + Sync>` so any
//! backend can plug in; this module converts those to our typed error enum,
//! with an optional feature-gated path for `roller_hardware::HwError` downcasting.

use crate::error::RollerError;

/// Map a trait-boundary error to `RollerError::Device`, prefixed with what was being done.
pub fn map_hw_error(context: &str, e: &(dyn std::error::Error + 'static)) -> RollerError {
    // Feature-gated: try to downcast to HwError for precise mapping
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<roller_hardware::error::HwError>() {
            return match hw {
                roller_hardware::error::HwError::Released => {
                    RollerError::State(format!("{context}: feedback bus already released"))
                }
                other => RollerError::Device(format!("{context}: {other}")),
            };
        }
    }

    RollerError::Device(format!("{context}: {e}"))
}

/// Adapter for `map_err` on trait calls.
pub(crate) fn device(
    context: &'static str,
) -> impl Fn(Box<dyn std::error::Error + Send + Sync>) -> RollerError {
    move |e| map_hw_error(context, &*e)
}
