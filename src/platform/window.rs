//! Window lookup by title

use crate::vision::Rect;

/// Finds a top-level window and reports its screen rectangle
pub trait WindowLocator {
    /// Bounding rectangle of the window titled `title`, if it exists
    fn find(&self, title: &str) -> Option<Rect>;
}

/// Desktop window lookup (Win32 on Windows, nothing elsewhere)
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopWindows;

#[cfg(windows)]
impl WindowLocator for DesktopWindows {
    fn find(&self, title: &str) -> Option<Rect> {
        use windows_sys::Win32::Foundation::RECT;
        use windows_sys::Win32::UI::WindowsAndMessaging::{FindWindowW, GetWindowRect};

        let wide: Vec<u16> = title.encode_utf16().chain(std::iter::once(0)).collect();

        unsafe {
            let hwnd = FindWindowW(std::ptr::null(), wide.as_ptr());
            if hwnd.is_null() {
                return None;
            }

            let mut rect: RECT = std::mem::zeroed();
            if GetWindowRect(hwnd, &mut rect) == 0 {
                log::debug!("GetWindowRect failed for \"{title}\"");
                return None;
            }

            Some(Rect::from_edges(rect.left, rect.top, rect.right, rect.bottom))
        }
    }
}

#[cfg(not(windows))]
impl WindowLocator for DesktopWindows {
    fn find(&self, title: &str) -> Option<Rect> {
        log::trace!("window lookup for \"{title}\" is not supported on this platform");
        None
    }
}
