//! Scene recognition
//!
//! Locates the game window, captures each template's area and reports the
//! first scene whose template matches with enough confidence.

use std::sync::Arc;

use super::capture::CaptureProvider;
use super::matching::best_match;
use super::region::{capture_region, Rect};
use super::templates::{TemplateEntry, TemplateStore};
use super::VisionError;
use crate::game::scene::Scene;
use crate::platform::WindowLocator;

/// Default minimum correlation for a template to count as matched
pub const DEFAULT_THRESHOLD: f32 = 0.8;

/// Anything that can report the scene currently on screen
pub trait SceneSource {
    /// Scene on screen right now, or `None` if nothing is recognised
    fn detect(&mut self) -> Option<Scene>;
}

/// Template-matching scene classifier
pub struct SceneClassifier {
    locator: Box<dyn WindowLocator>,
    capture: Box<dyn CaptureProvider>,
    templates: Arc<TemplateStore>,
    window_title: String,
    /// Confidence threshold for a template match
    threshold: f32,
}

impl SceneClassifier {
    /// Create a classifier for the window titled `window_title`
    pub fn new(
        locator: Box<dyn WindowLocator>,
        capture: Box<dyn CaptureProvider>,
        templates: Arc<TemplateStore>,
        window_title: &str,
    ) -> Self {
        Self {
            locator,
            capture,
            templates,
            window_title: window_title.to_string(),
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Set the confidence threshold
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Best score of one template inside its area of the window
    fn score(&mut self, window: Rect, entry: &TemplateEntry) -> Result<Option<f32>, VisionError> {
        let Some(template) = entry.image.as_ref() else {
            return Ok(None);
        };

        let region = capture_region(window, entry.spec.area);
        let frame = self.capture.capture(region)?;
        let result = best_match(&frame, template)?;
        Ok(Some(result.score))
    }
}

impl SceneSource for SceneClassifier {
    fn detect(&mut self) -> Option<Scene> {
        let window = self.locator.find(&self.window_title)?;

        // Order of the store is match priority: first hit wins
        let templates = Arc::clone(&self.templates);
        for entry in templates.entries() {
            match self.score(window, entry) {
                Ok(Some(score)) if score >= self.threshold => {
                    log::trace!("{} matched with {:.3}", entry.spec.name, score);
                    return Some(entry.spec.scene);
                }
                Ok(_) => {}
                Err(e) => {
                    log::debug!("skipping template {}: {}", entry.spec.name, e);
                }
            }
        }

        None
    }
}
