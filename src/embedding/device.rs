use candle_core::Device;
use tracing::{debug, warn};

#[cfg(any(feature = "metal", feature = "cuda"))]
use tracing::info;

use super::error::EmbeddingError;

/// Picks the compute device for `component` (first GPU backend that opens, else CPU).
///
/// The encoder, reranker and generator each call this once at load time.
pub fn select_device(component: &str) -> Result<Device, EmbeddingError> {
    #[allow(unused_mut)]
    let mut failures: Vec<String> = Vec::new();

    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(device) => {
                info!(component, "Using Metal GPU acceleration");
                return Ok(device);
            }
            Err(e) => {
                warn!(component, error = %e, "Metal device unavailable");
                failures.push(format!("metal: {e}"));
            }
        }
    }

    #[cfg(feature = "cuda")]
    {
        match Device::new_cuda(0) {
            Ok(device) => {
                info!(component, "Using CUDA GPU acceleration");
                return Ok(device);
            }
            Err(e) => {
                warn!(component, error = %e, "CUDA device unavailable");
                failures.push(format!("cuda: {e}"));
            }
        }
    }

    if failures.is_empty() {
        debug!(component, "No GPU backend compiled, using CPU");
    } else {
        warn!(component, reason = %failures.join("; "), "Falling back to CPU device");
    }

    Ok(Device::Cpu)
}
