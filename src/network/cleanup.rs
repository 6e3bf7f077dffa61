//! Last-resort network restore
//!
//! A [`ShutdownHook`] restores the network exactly once: when the process is
//! interrupted (Ctrl+C, console close), when the handle is dropped at the
//! end of `main`, or while unwinding from a panic, whichever happens first.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::guard::NetworkGuard;

/// Exit status used after an interrupt
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

static REGISTERED: OnceCell<Arc<HookState>> = OnceCell::new();

struct HookState {
    guard: Arc<NetworkGuard>,
    fired: AtomicBool,
}

impl HookState {
    fn fire(&self) -> bool {
        if self.fired.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.guard.restore();
        true
    }
}

/// Hook registration errors
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("a shutdown hook is already registered")]
    AlreadyInstalled,
    #[error("failed to register interrupt handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

/// Handle that restores the network once, on whichever exit path runs first
pub struct ShutdownHook {
    state: Arc<HookState>,
}

impl ShutdownHook {
    /// Unregistered hook; it still fires on drop
    pub fn new(guard: Arc<NetworkGuard>) -> Self {
        Self {
            state: Arc::new(HookState {
                guard,
                fired: AtomicBool::new(false),
            }),
        }
    }

    /// Create the process-wide hook and route interrupts to it.
    ///
    /// Only one hook can be installed per process.
    pub fn install(guard: Arc<NetworkGuard>) -> Result<Self, HookError> {
        let state = Arc::new(HookState {
            guard,
            fired: AtomicBool::new(false),
        });
        REGISTERED
            .set(Arc::clone(&state))
            .map_err(|_| HookError::AlreadyInstalled)?;
        let hook = Self { state };

        ctrlc::set_handler(|| {
            log::warn!("Interrupted, cleaning up before exit");
            fire_registered();
            std::process::exit(INTERRUPTED_EXIT_CODE);
        })?;

        Ok(hook)
    }

    /// Run the restore now. Returns false if it already ran.
    pub fn trigger(&self) -> bool {
        self.state.fire()
    }

    pub fn has_fired(&self) -> bool {
        self.state.fired.load(Ordering::SeqCst)
    }
}

/// Fire the installed hook, if any. Returns false if nothing ran.
fn fire_registered() -> bool {
    REGISTERED.get().is_some_and(|state| state.fire())
}

impl Drop for ShutdownHook {
    fn drop(&mut self) {
        self.state.fire();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetProfile;
    use crate::testing::{FakeFirewall, FakeProcesses, FakeResolver};
    use std::path::PathBuf;

    fn guard(firewall: FakeFirewall) -> Arc<NetworkGuard> {
        Arc::new(NetworkGuard::new(
            &TargetProfile::default(),
            Box::new(FakeResolver(None)),
            Box::new(FakeProcesses(Some(PathBuf::from("GTA5.exe")))),
            Box::new(firewall),
        ))
    }

    #[test]
    fn test_interrupt_mid_cycle_restores_once() {
        let firewall = FakeFirewall::new();
        let log = firewall.log();
        let guard = guard(firewall);
        let hook = ShutdownHook::new(Arc::clone(&guard));

        assert!(guard.block());
        assert_eq!(log.installed_rules(), 2);

        // interrupt arrives, then the handle is torn down
        assert!(hook.trigger());
        assert!(!hook.trigger());
        drop(hook);

        assert_eq!(log.deletes(), 1);
        assert_eq!(log.installed_rules(), 0);
    }

    #[test]
    fn test_installed_hook_restores_once() {
        let firewall = FakeFirewall::new();
        let log = firewall.log();
        let guard = guard(firewall);

        let hook = ShutdownHook::install(Arc::clone(&guard)).unwrap();
        // a second registration is refused without touching the network
        assert!(matches!(
            ShutdownHook::install(Arc::clone(&guard)),
            Err(HookError::AlreadyInstalled)
        ));
        assert_eq!(log.deletes(), 0);

        assert!(guard.block());
        // what the interrupt handler runs
        assert!(fire_registered());
        assert!(hook.has_fired());
        assert!(!fire_registered());
        drop(hook);

        assert_eq!(log.deletes(), 1);
        assert_eq!(log.installed_rules(), 0);
    }

    #[test]
    fn test_drop_restores() {
        let firewall = FakeFirewall::new();
        let log = firewall.log();
        let guard = guard(firewall);

        {
            let hook = ShutdownHook::new(Arc::clone(&guard));
            guard.block();
            assert!(!hook.has_fired());
        }

        assert_eq!(log.deletes(), 1);
        assert_eq!(log.installed_rules(), 0);
    }

    #[test]
    fn test_panic_unwinding_restores() {
        let firewall = FakeFirewall::new();
        let log = firewall.log();
        let guard = guard(firewall);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _hook = ShutdownHook::new(Arc::clone(&guard));
            guard.block();
            panic!("mid-cycle failure");
        }));

        assert!(result.is_err());
        assert_eq!(log.deletes(), 1);
    }
}
