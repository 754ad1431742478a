//! Audio output backends.

mod simulated;
#[cfg(feature = "speaker")]
mod speaker;

use std::path::Path;
use std::sync::Arc;

use parley_core::{AudioOutputError, AudioOutputPort};

pub use simulated::SimulatedOutput;
#[cfg(feature = "speaker")]
pub use speaker::SpeakerOutput;

/// The output the CLI plays through.
///
/// With the `speaker` feature this is the default output device, falling
/// back to simulated playback when no device can be opened.
#[cfg(feature = "speaker")]
pub fn default_output(assets_dir: &Path) -> Arc<dyn AudioOutputPort> {
    match SpeakerOutput::spawn(assets_dir) {
        Ok(speaker) => Arc::new(speaker),
        Err(e) => {
            tracing::warn!(error = %e, "No audio device, simulating playback");
            Arc::new(SimulatedOutput::new(assets_dir))
        }
    }
}

/// The output the CLI plays through.
#[cfg(not(feature = "speaker"))]
pub fn default_output(assets_dir: &Path) -> Arc<dyn AudioOutputPort> {
    Arc::new(SimulatedOutput::new(assets_dir))
}

/// Resolve an application asset path (e.g. `/intro.wav`) against `dir`.
pub(crate) fn read_asset(dir: &Path, url: &str) -> Result<Vec<u8>, AudioOutputError> {
    let relative = url.trim_start_matches('/');
    if relative.is_empty() || relative.contains("://") {
        return Err(AudioOutputError::Unsupported(url.to_string()));
    }
    let path = dir.join(relative);
    std::fs::read(&path).map_err(|e| AudioOutputError::Load(format!("{}: {e}", path.display())))
}
