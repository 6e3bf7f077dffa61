//! Network blocking
//!
//! Firewall rule execution, block-target discovery, the guard that owns the
//! block rule and the shutdown hook that always removes it.

pub mod cleanup;
pub mod firewall;
pub mod guard;
pub mod resolve;

pub use cleanup::ShutdownHook;
pub use firewall::{BlockRule, Direction, FirewallBackend, NetshFirewall, RuleScope};
pub use guard::NetworkGuard;

/// Network guard errors
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("failed to run firewall command: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("firewall rejected rule {name} (exit code {code:?})")]
    RuleRejected { name: String, code: Option<i32> },
}
