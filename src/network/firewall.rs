//! Firewall rule execution
//!
//! Rules are described as data ([`BlockRule`]) and applied by a
//! [`FirewallBackend`]. The Windows backend drives `netsh advfirewall`.

use std::net::IpAddr;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use super::NetworkError;

/// Traffic direction of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    fn netsh_value(&self) -> &'static str {
        match self {
            Direction::Inbound => "in",
            Direction::Outbound => "out",
        }
    }
}

/// What a rule applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleScope {
    /// TCP traffic to any of these remote addresses
    RemoteAddresses(Vec<IpAddr>),
    /// All traffic of one executable
    Program(PathBuf),
}

/// A named blocking rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRule {
    pub name: String,
    pub direction: Direction,
    pub scope: RuleScope,
}

impl BlockRule {
    /// Arguments for `netsh` that add this rule
    pub fn netsh_add_args(&self) -> Vec<String> {
        let mut args = vec![
            "advfirewall".to_string(),
            "firewall".to_string(),
            "add".to_string(),
            "rule".to_string(),
            format!("name={}", self.name),
            format!("dir={}", self.direction.netsh_value()),
            "action=block".to_string(),
        ];

        match &self.scope {
            RuleScope::RemoteAddresses(addresses) => {
                let list: Vec<String> = addresses.iter().map(|a| a.to_string()).collect();
                args.push("protocol=TCP".to_string());
                args.push(format!("remoteip={}", list.join(",")));
            }
            RuleScope::Program(path) => {
                args.push(format!("program={}", path.display()));
            }
        }

        args.push("enable=yes".to_string());
        args
    }
}

/// Arguments for `netsh` that delete every rule called `name`
pub fn netsh_delete_args(name: &str) -> Vec<String> {
    vec![
        "advfirewall".to_string(),
        "firewall".to_string(),
        "delete".to_string(),
        "rule".to_string(),
        format!("name={name}"),
    ]
}

/// Installs and removes firewall rules
pub trait FirewallBackend: Send {
    fn add_rule(&mut self, rule: &BlockRule) -> Result<(), NetworkError>;

    /// Remove every rule called `name`; a missing rule is not an error
    fn delete_rule(&mut self, name: &str) -> Result<(), NetworkError>;
}

/// `netsh advfirewall` backend
#[derive(Debug, Clone)]
pub struct NetshFirewall {
    program: PathBuf,
}

impl NetshFirewall {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("netsh"),
        }
    }

    fn run(&self, args: &[String]) -> Result<std::process::ExitStatus, NetworkError> {
        log::debug!("netsh {}", args.join(" "));
        Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(NetworkError::Spawn)
    }
}

impl Default for NetshFirewall {
    fn default() -> Self {
        Self::new()
    }
}

impl FirewallBackend for NetshFirewall {
    fn add_rule(&mut self, rule: &BlockRule) -> Result<(), NetworkError> {
        let status = self.run(&rule.netsh_add_args())?;
        if status.success() {
            Ok(())
        } else {
            Err(NetworkError::RuleRejected {
                name: rule.name.clone(),
                code: status.code(),
            })
        }
    }

    fn delete_rule(&mut self, name: &str) -> Result<(), NetworkError> {
        // netsh exits non-zero when no rule matched
        self.run(&netsh_delete_args(name))?;
        Ok(())
    }
}
