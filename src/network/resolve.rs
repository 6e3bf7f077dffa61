//! Block-target discovery: DNS lookups and process executable paths

use std::net::{IpAddr, ToSocketAddrs};
use std::path::PathBuf;

use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};

/// Resolves a host name to one address
pub trait HostResolver: Send + Sync {
    fn resolve(&self, host: &str) -> Option<IpAddr>;
}

/// Finds the executable of a running process
pub trait ProcessLocator: Send + Sync {
    /// Path of the first running process whose name is in `names`
    fn executable_path(&self, names: &[String]) -> Option<PathBuf>;
}

/// System resolver; prefers IPv4 since the firewall rule is IPv4-only in
/// practice
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl HostResolver for SystemResolver {
    fn resolve(&self, host: &str) -> Option<IpAddr> {
        let addresses: Vec<IpAddr> = match (host, 0).to_socket_addrs() {
            Ok(iter) => iter.map(|a| a.ip()).collect(),
            Err(e) => {
                log::warn!("Failed to resolve {host}: {e}");
                return None;
            }
        };

        let chosen = addresses
            .iter()
            .find(|a| a.is_ipv4())
            .or_else(|| addresses.first())
            .copied();
        if let Some(ip) = chosen {
            log::info!("Resolved {host} to {ip}");
        }
        chosen
    }
}

/// Process lookup through sysinfo
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessLocator;

impl ProcessLocator for SystemProcessLocator {
    fn executable_path(&self, names: &[String]) -> Option<PathBuf> {
        let mut sys = System::new();
        sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_exe(UpdateKind::OnlyIfNotSet),
        );

        sys.processes().values().find_map(|process| {
            let name = process.name().to_string_lossy();
            if names.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
                process.exe().map(|p| p.to_path_buf())
            } else {
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_ip_literal() {
        assert_eq!(
            SystemResolver.resolve("127.0.0.1"),
            Some("127.0.0.1".parse().unwrap())
        );
    }

    #[test]
    fn test_unknown_process_not_found() {
        let names = vec!["no-such-process-3f9a1c.exe".to_string()];
        assert_eq!(SystemProcessLocator.executable_path(&names), None);
    }
}
