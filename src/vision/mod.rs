//! Vision and image processing module
//!
//! Handles capture-region mapping, screen capture, template loading and
//! template matching for scene classification.

pub mod capture;
mod correlation;
pub mod matching;
pub mod recognition;
pub mod region;
pub mod templates;

pub use capture::{CaptureError, CaptureProvider, ScreenCapture};
pub use matching::MatchError;
pub use recognition::{SceneClassifier, SceneSource};
pub use region::{capture_region, AreaType, Rect};
pub use templates::{default_specs, TemplateSpec, TemplateStore};

/// Vision system errors
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Match(#[from] MatchError),
}
