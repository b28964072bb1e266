//! Transient microphone grants.

use crate::backend::{CaptureDevice, CaptureTrack};
use crate::error::VoiceError;

/// Exclusive, short-lived hold on the capture device.
///
/// Every track is stopped when the grant is dropped, so the device is never
/// left held whichever way the caller exits.
pub struct CaptureGrant {
    tracks: Vec<Box<dyn CaptureTrack>>,
}

impl CaptureGrant {
    pub async fn acquire(device: &dyn CaptureDevice) -> Result<Self, VoiceError> {
        let tracks = device.acquire().await?;
        tracing::debug!(tracks = tracks.len(), "Microphone grant acquired");
        Ok(Self { tracks })
    }

    #[must_use]
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Stop every track now.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for CaptureGrant {
    fn drop(&mut self) {
        for track in &mut self.tracks {
            track.stop();
        }
        tracing::debug!(tracks = self.tracks.len(), "Microphone grant released");
    }
}

impl std::fmt::Debug for CaptureGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureGrant")
            .field("tracks", &self.tracks.len())
            .finish()
    }
}
