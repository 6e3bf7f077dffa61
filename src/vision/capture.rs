//! Screen capture handling
//!
//! Grabs the pixels under a screen rectangle. The desktop implementation
//! captures the monitor that contains the rectangle's origin with xcap and
//! crops it; alpha is always dropped so callers only ever see RGB.

use image::{DynamicImage, RgbImage, RgbaImage};

use super::region::Rect;

/// Capture errors
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("capture region {0:?} is empty")]
    EmptyRegion(Rect),
    #[error("no monitor contains ({x}, {y})")]
    NoMonitor { x: i32, y: i32 },
    #[error("capture region {region:?} does not overlap monitor {monitor:?}")]
    OffScreen { region: Rect, monitor: Rect },
    #[error("screen capture failed: {0}")]
    Backend(String),
    #[error("screen capture is not supported on this platform")]
    Unsupported,
}

/// Source of screen pixels
pub trait CaptureProvider {
    /// Capture `region` (screen coordinates) as RGB
    fn capture(&mut self, region: Rect) -> Result<RgbImage, CaptureError>;
}

/// Drop the alpha channel of a captured frame
pub fn drop_alpha(frame: RgbaImage) -> RgbImage {
    DynamicImage::ImageRgba8(frame).to_rgb8()
}

/// Crop rectangle of `region` relative to a monitor's own origin
pub fn monitor_crop(region: Rect, monitor: Rect) -> Result<(u32, u32, u32, u32), CaptureError> {
    let visible = region
        .intersect(&monitor)
        .ok_or(CaptureError::OffScreen { region, monitor })?;

    Ok((
        (visible.left - monitor.left) as u32,
        (visible.top - monitor.top) as u32,
        visible.width,
        visible.height,
    ))
}

/// Desktop screen capture
pub struct ScreenCapture {
    /// Frames captured so far
    frame_count: u64,
}

impl ScreenCapture {
    /// Create a new screen capture handler
    pub fn new() -> Self {
        Self { frame_count: 0 }
    }

    /// Get the frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    #[cfg(windows)]
    fn grab(&self, region: Rect) -> Result<RgbaImage, CaptureError> {
        use xcap::Monitor;

        let monitor = Monitor::from_point(region.left, region.top).map_err(|_| {
            CaptureError::NoMonitor {
                x: region.left,
                y: region.top,
            }
        })?;

        let backend = |e: xcap::XCapError| CaptureError::Backend(e.to_string());
        let bounds = Rect::new(
            monitor.x().map_err(backend)?,
            monitor.y().map_err(backend)?,
            monitor.width().map_err(backend)?,
            monitor.height().map_err(backend)?,
        );
        let (x, y, width, height) = monitor_crop(region, bounds)?;

        let screen = monitor.capture_image().map_err(backend)?;
        Ok(image::imageops::crop_imm(&screen, x, y, width, height).to_image())
    }

    #[cfg(not(windows))]
    fn grab(&self, _region: Rect) -> Result<RgbaImage, CaptureError> {
        Err(CaptureError::Unsupported)
    }
}

impl Default for ScreenCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureProvider for ScreenCapture {
    fn capture(&mut self, region: Rect) -> Result<RgbImage, CaptureError> {
        if region.is_empty() {
            return Err(CaptureError::EmptyRegion(region));
        }

        let frame = self.grab(region)?;
        self.frame_count += 1;
        log::trace!(
            "captured {}x{} at ({}, {})",
            frame.width(),
            frame.height(),
            region.left,
            region.top
        );
        Ok(drop_alpha(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_drop_alpha_keeps_rgb() {
        let frame = RgbaImage::from_fn(3, 2, |x, y| Rgba([x as u8, y as u8, 200, 17]));
        let rgb = drop_alpha(frame);
        assert_eq!(rgb.dimensions(), (3, 2));
        assert_eq!(rgb.get_pixel(2, 1).0, [2, 1, 200]);
    }

    #[test]
    fn test_monitor_crop_secondary_monitor() {
        let monitor = Rect::new(1920, 0, 2560, 1440);
        let region = Rect::new(3456, 1008, 1024, 432);
        assert_eq!(monitor_crop(region, monitor).unwrap(), (1536, 1008, 1024, 432));
    }

    #[test]
    fn test_monitor_crop_trims_overhang() {
        let monitor = Rect::new(0, 0, 1920, 1080);
        let region = Rect::new(1800, 900, 400, 400);
        assert_eq!(monitor_crop(region, monitor).unwrap(), (1800, 900, 120, 180));
    }

    #[test]
    fn test_monitor_crop_off_screen() {
        let monitor = Rect::new(0, 0, 1920, 1080);
        let region = Rect::new(2000, 0, 10, 10);
        assert!(matches!(
            monitor_crop(region, monitor),
            Err(CaptureError::OffScreen { .. })
        ));
    }

    #[test]
    fn test_empty_region_rejected() {
        let mut capture = ScreenCapture::new();
        let result = capture.capture(Rect::new(0, 0, 0, 10));
        assert!(matches!(result, Err(CaptureError::EmptyRegion(_))));
        assert_eq!(capture.frame_count(), 0);
    }
}
