//! Network guard
//!
//! Owns the lifecycle of the named block rule. `block` picks the narrowest
//! rule it can build: the cloud-save addresses when DNS works, otherwise the
//! whole game executable. `restore` removes the rule whether or not it
//! exists.

use std::net::IpAddr;
use std::sync::{Mutex, PoisonError};

use super::firewall::{BlockRule, Direction, FirewallBackend, NetshFirewall, RuleScope};
use super::resolve::{HostResolver, ProcessLocator, SystemProcessLocator, SystemResolver};
use crate::config::TargetProfile;

/// Installs and removes the block rule for the game
pub struct NetworkGuard {
    rule_name: String,
    cloud_save_host: String,
    fallback_ip: IpAddr,
    process_names: Vec<String>,
    resolver: Box<dyn HostResolver>,
    processes: Box<dyn ProcessLocator>,
    firewall: Mutex<Box<dyn FirewallBackend>>,
}

impl NetworkGuard {
    pub fn new(
        target: &TargetProfile,
        resolver: Box<dyn HostResolver>,
        processes: Box<dyn ProcessLocator>,
        firewall: Box<dyn FirewallBackend>,
    ) -> Self {
        Self {
            rule_name: target.rule_name.clone(),
            cloud_save_host: target.cloud_save_host.clone(),
            fallback_ip: target.cloud_save_fallback_ip,
            process_names: target.process_names.clone(),
            resolver,
            processes,
            firewall: Mutex::new(firewall),
        }
    }

    /// Guard wired to DNS, sysinfo and netsh
    pub fn system(target: &TargetProfile) -> Self {
        Self::new(
            target,
            Box::new(SystemResolver),
            Box::new(SystemProcessLocator),
            Box::new(NetshFirewall::new()),
        )
    }

    pub fn rule_name(&self) -> &str {
        &self.rule_name
    }

    /// Rules `block` would install right now, or `None` if there is no
    /// target to block
    pub fn plan(&self) -> Option<Vec<BlockRule>> {
        if let Some(resolved) = self.resolver.resolve(&self.cloud_save_host) {
            let mut addresses = vec![resolved];
            if resolved != self.fallback_ip {
                addresses.push(self.fallback_ip);
            }
            log::info!(
                "Blocking cloud save addresses: {}",
                addresses
                    .iter()
                    .map(|a| a.to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            );
            return Some(vec![BlockRule {
                name: self.rule_name.clone(),
                direction: Direction::Outbound,
                scope: RuleScope::RemoteAddresses(addresses),
            }]);
        }

        log::warn!("Could not resolve cloud save host, blocking the game executable instead");
        let Some(path) = self.processes.executable_path(&self.process_names) else {
            log::warn!("Game process not found ({})", self.process_names.join(", "));
            return None;
        };

        Some(
            [Direction::Outbound, Direction::Inbound]
                .into_iter()
                .map(|direction| BlockRule {
                    name: self.rule_name.clone(),
                    direction,
                    scope: RuleScope::Program(path.clone()),
                })
                .collect(),
        )
    }

    /// Install the block rule. Returns whether the network is now blocked.
    pub fn block(&self) -> bool {
        log::info!("Attempting to block network connection...");

        let Some(rules) = self.plan() else {
            return false;
        };

        let mut firewall = self.firewall.lock().unwrap_or_else(PoisonError::into_inner);
        for rule in &rules {
            if let Err(e) = firewall.add_rule(rule) {
                log::warn!("Failed to install block rule: {e}");
                // the rule name is shared, so this also drops earlier directions
                if let Err(e) = firewall.delete_rule(&self.rule_name) {
                    log::warn!("Failed to roll back partial block rule: {e}");
                }
                return false;
            }
        }

        log::info!("Network blocked");
        true
    }

    /// Remove the block rule. Safe to call when nothing is blocked.
    pub fn restore(&self) {
        log::info!("Restoring network connection...");
        let mut firewall = self.firewall.lock().unwrap_or_else(PoisonError::into_inner);
        match firewall.delete_rule(&self.rule_name) {
            Ok(()) => log::info!("Firewall rules cleaned up, network restored"),
            Err(e) => log::warn!("Failed to remove block rule: {e}"),
        }
    }
}
