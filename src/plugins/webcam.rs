//! Webcam backend
//!
//! With the `webcam` feature cameras are opened through nokhwa. Without it the
//! device is reported as unavailable and capture falls back to "neutral".

use crate::core::{Camera, CameraOpener, CaptureError};

/// Whether this build can open a camera at all
pub const fn is_available() -> bool {
    cfg!(feature = "webcam")
}

/// Opens the platform's native cameras
#[derive(Debug, Default, Clone, Copy)]
pub struct WebcamOpener;

impl CameraOpener for WebcamOpener {
    #[cfg(feature = "webcam")]
    fn open(&self, index: u32) -> Result<Box<dyn Camera>, CaptureError> {
        let camera = native::NokhwaCamera::open(index)?;
        Ok(Box::new(camera))
    }

    #[cfg(not(feature = "webcam"))]
    fn open(&self, _index: u32) -> Result<Box<dyn Camera>, CaptureError> {
        Err(CaptureError::DeviceUnavailable)
    }
}

#[cfg(feature = "webcam")]
mod native {
    use image::RgbImage;
    use nokhwa::pixel_format::RgbFormat;
    use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};

    use crate::core::{Camera, CaptureError};

    fn device_error(e: nokhwa::NokhwaError) -> CaptureError {
        CaptureError::Device(e.to_string())
    }

    pub struct NokhwaCamera {
        inner: nokhwa::Camera,
    }

    impl NokhwaCamera {
        pub fn open(index: u32) -> Result<Self, CaptureError> {
            let format =
                RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
            let mut inner =
                nokhwa::Camera::new(CameraIndex::Index(index), format).map_err(device_error)?;
            inner.open_stream().map_err(device_error)?;

            tracing::debug!("Opened camera: {}", inner.info().human_name());
            Ok(Self { inner })
        }
    }

    impl Camera for NokhwaCamera {
        fn read_frame(&mut self) -> Result<RgbImage, CaptureError> {
            let buffer = self.inner.frame().map_err(device_error)?;
            let decoded = buffer
                .decode_image::<RgbFormat>()
                .map_err(device_error)?;
            let (width, height) = (decoded.width(), decoded.height());

            // nokhwa links its own image version, so go through raw pixels
            RgbImage::from_raw(width, height, decoded.into_raw())
                .ok_or_else(|| CaptureError::Device("frame size mismatch".to_string()))
        }
    }

    impl Drop for NokhwaCamera {
        fn drop(&mut self) {
            if let Err(e) = self.inner.stop_stream() {
                tracing::warn!("Failed to release camera: {}", e);
            }
        }
    }
}
