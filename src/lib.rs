//! Scene Cycler - template-matching automation for the GTA V session loop
//!
//! This library watches the game window, classifies what is on screen by
//! template matching, and cycles the game between story mode and an online
//! session while a firewall rule keeps the cloud save from completing.
//!
//! ## Safety net
//!
//! The `network` module owns the block rule. A [`network::ShutdownHook`]
//! removes it on every exit path, including Ctrl+C and panics.

pub mod config;
pub mod game;
pub mod input;
pub mod network;
pub mod platform;
pub mod timing;
pub mod vision;

#[cfg(test)]
mod testing;

use std::path::Path;
use std::sync::Arc;

use crate::config::{resource_path, Settings};
use crate::game::CycleController;
use crate::input::{system_keyboard, InputError, MacroPlayer};
use crate::network::NetworkGuard;
use crate::platform::DesktopWindows;
use crate::timing::{Clock, SystemClock};
use crate::vision::{default_specs, SceneClassifier, ScreenCapture, TemplateStore};

/// Wire the desktop components into a controller.
///
/// Templates are read from the profile's template directory, relative to
/// `base` unless absolute.
pub fn desktop_controller(
    settings: &Settings,
    base: &Path,
    guard: Arc<NetworkGuard>,
) -> Result<CycleController, InputError> {
    let target = &settings.target;
    let template_dir = resource_path(base, &target.template_dir);
    let templates = Arc::new(TemplateStore::load(&template_dir, default_specs()));
    if templates.loaded_count() == 0 {
        log::warn!("No templates loaded, no scene can be recognised");
    }

    let classifier = SceneClassifier::new(
        Box::new(DesktopWindows),
        Box::new(ScreenCapture::new()),
        templates,
        &target.window_title,
    )
    .with_threshold(target.match_threshold);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let player = MacroPlayer::new(
        system_keyboard()?,
        Arc::clone(&clock),
        settings.macro_hold,
        settings.macro_wait,
    );

    Ok(CycleController::new(
        Box::new(classifier),
        player,
        guard,
        clock,
        settings,
    ))
}
