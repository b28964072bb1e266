use async_trait::async_trait;

use crate::error::VoiceError;

/// Microphone access.
///
/// Used only to verify that permission is granted and a device is present;
/// the audio itself is never read.
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Acquire every track of a fresh capture stream.
    ///
    /// May suspend while the platform asks the user for permission. Fails
    /// with [`VoiceError::PermissionDenied`] or
    /// [`VoiceError::DeviceUnavailable`].
    async fn acquire(&self) -> Result<Vec<Box<dyn CaptureTrack>>, VoiceError>;
}

/// One live track of a capture stream.
pub trait CaptureTrack: Send {
    /// Release the track. Must be safe to call more than once.
    fn stop(&mut self);
}
