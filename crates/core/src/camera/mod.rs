/// Why a camera stream could not be acquired.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CameraError {
    #[error("camera access is not supported on this system")]
    Unsupported,
    #[error("could not access camera, check permissions and try again")]
    Denied,
}

/// Handle to an acquired video stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraStream {
    pub id: String,
}

/// Device acquisition lives outside the switcher; the core only attaches the
/// stream it is handed to the preview and live surfaces.
pub trait CameraService {
    fn acquire(&mut self) -> Result<CameraStream, CameraError>;
    fn release(&mut self, stream: &CameraStream);
}

/// Camera service for hosts without capture devices.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCamera;

impl CameraService for NoCamera {
    fn acquire(&mut self) -> Result<CameraStream, CameraError> {
        Err(CameraError::Unsupported)
    }

    fn release(&mut self, _stream: &CameraStream) {}
}
