//! Elevation check

/// Whether the process runs with administrator rights.
///
/// Firewall rules can only be changed from an elevated process.
#[cfg(windows)]
pub fn is_elevated() -> bool {
    unsafe { windows_sys::Win32::UI::Shell::IsUserAnAdmin() != 0 }
}

/// Whether the process runs with administrator rights.
///
/// Always false off Windows: the firewall backend only exists there.
#[cfg(not(windows))]
pub fn is_elevated() -> bool {
    false
}
