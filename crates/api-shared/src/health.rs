use crate::types::HealthRes;

/// Simple health service shared by every API surface
///
/// This service provides a standardised way to check that the service is up.
/// Model loading happens before the server binds, so a running process always
/// has its full registry.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Static method to check health without creating an instance
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Clinical risk engine is alive".into(),
        }
    }
}
