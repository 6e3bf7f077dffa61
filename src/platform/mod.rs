//! Operating system glue
//!
//! Window lookup and the elevation check. Everything here is a thin wrapper
//! over Win32; other platforms get inert fallbacks so the crate still builds
//! and tests there.

pub mod privilege;
pub mod window;

pub use privilege::is_elevated;
pub use window::{DesktopWindows, WindowLocator};
