//! Reference images for scene matching
//!
//! Each known scene has one template image searched inside one area of the
//! game window. The store keeps the configured order, which is also the
//! match priority.

use std::path::{Path, PathBuf};

use image::RgbImage;

use super::region::AreaType;
use crate::game::scene::Scene;

/// Static description of one template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSpec {
    /// Lookup key
    pub name: String,
    /// File name inside the template directory
    pub file: String,
    /// Window area the template is searched in
    pub area: AreaType,
    /// Scene reported when the template matches
    pub scene: Scene,
}

impl TemplateSpec {
    pub fn new(name: &str, file: &str, area: AreaType, scene: Scene) -> Self {
        Self {
            name: name.to_string(),
            file: file.to_string(),
            area,
            scene,
        }
    }
}

/// The built-in template list, in match priority order
pub fn default_specs() -> Vec<TemplateSpec> {
    vec![
        TemplateSpec::new(
            "story_mode",
            "story_mode.png",
            AreaType::FullScreen,
            Scene::StoryMode,
        ),
        TemplateSpec::new(
            "joining_online",
            "joining_online.png",
            AreaType::BottomRight,
            Scene::JoiningOnline,
        ),
        TemplateSpec::new(
            "transaction",
            "transaction.png",
            AreaType::BottomRight,
            Scene::Transaction,
        ),
    ]
}

/// Template loading errors
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("template not found: {0}")]
    Missing(PathBuf),
    #[error("failed to read template {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// A template and its image, if it could be loaded
#[derive(Debug, Clone)]
pub struct TemplateEntry {
    pub spec: TemplateSpec,
    pub image: Option<RgbImage>,
}

/// Immutable set of loaded templates
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    entries: Vec<TemplateEntry>,
}

impl TemplateStore {
    /// Load every template in `specs` from `dir`.
    ///
    /// Missing or unreadable files are logged and kept as entries without an
    /// image; their scene can then never be matched.
    pub fn load(dir: &Path, specs: Vec<TemplateSpec>) -> Self {
        log::info!("Loading template images from {}", dir.display());

        let entries: Vec<TemplateEntry> = specs
            .into_iter()
            .map(|spec| {
                let path = dir.join(&spec.file);
                let image = match load_image(&path) {
                    Ok(image) => Some(image),
                    Err(e) => {
                        log::warn!("{e}");
                        None
                    }
                };
                TemplateEntry { spec, image }
            })
            .collect();

        let store = Self { entries };
        log::info!(
            "Loaded {}/{} templates",
            store.loaded_count(),
            store.len()
        );
        store
    }

    /// Build a store from in-memory images
    pub fn from_entries(entries: Vec<TemplateEntry>) -> Self {
        Self { entries }
    }

    /// Entries in priority order
    pub fn entries(&self) -> &[TemplateEntry] {
        &self.entries
    }

    /// Image for a template name
    pub fn get(&self, name: &str) -> Option<&RgbImage> {
        self.entries
            .iter()
            .find(|entry| entry.spec.name == name)
            .and_then(|entry| entry.image.as_ref())
    }

    /// Number of templates with a usable image
    pub fn loaded_count(&self) -> usize {
        self.entries.iter().filter(|e| e.image.is_some()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn load_image(path: &Path) -> Result<RgbImage, TemplateError> {
    if !path.is_file() {
        return Err(TemplateError::Missing(path.to_path_buf()));
    }

    let image = image::open(path).map_err(|source| TemplateError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::patterned_image;

    #[test]
    fn test_default_specs_order() {
        let scenes: Vec<Scene> = default_specs().iter().map(|s| s.scene).collect();
        assert_eq!(
            scenes,
            vec![Scene::StoryMode, Scene::JoiningOnline, Scene::Transaction]
        );
    }

    #[test]
    fn test_load_skips_missing_and_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        patterned_image(8, 6, 4)
            .save(dir.path().join("story_mode.png"))
            .unwrap();
        std::fs::write(dir.path().join("transaction.png"), b"not a png").unwrap();

        let store = TemplateStore::load(dir.path(), default_specs());

        assert_eq!(store.len(), 3);
        assert_eq!(store.loaded_count(), 1);
        assert_eq!(store.get("story_mode").unwrap().dimensions(), (8, 6));
        assert!(store.get("joining_online").is_none());
        assert!(store.get("transaction").is_none());

        // order is preserved even for entries without an image
        let names: Vec<&str> = store.entries().iter().map(|e| e.spec.name.as_str()).collect();
        assert_eq!(names, vec!["story_mode", "joining_online", "transaction"]);
    }

    #[test]
    fn test_loaded_image_matches_saved_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let original = patterned_image(5, 5, 9);
        original.save(dir.path().join("joining_online.png")).unwrap();

        let store = TemplateStore::load(dir.path(), default_specs());
        assert_eq!(store.get("joining_online"), Some(&original));
    }

    #[test]
    fn test_missing_directory() {
        let store = TemplateStore::load(Path::new("/definitely/not/here"), default_specs());
        assert_eq!(store.len(), 3);
        assert_eq!(store.loaded_count(), 0);
    }
}
