//! Init parameters for node backends.
use std::path::PathBuf;

use super::VmGeneration;

/// Parameters shared by every node type.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommonInitParams {
    /// Skip generation probing and use this value instead
    pub vm_generation: Option<VmGeneration>,
}

/// Connection parameters for the ssh node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshInitParams {
    pub host: String,
    pub user: Option<String>,
    pub port: Option<u16>,
    pub identity: Option<PathBuf>,
}

impl SshInitParams {
    pub fn new(host: &str) -> Self {
        SshInitParams {
            host: host.to_string(),
            user: None,
            port: None,
            identity: None,
        }
    }

    /// `user@host`, or just `host` when no user is set.
    pub fn destination(&self) -> String {
        match &self.user {
            Some(user) => format!("{}@{}", user, self.host),
            None => self.host.clone(),
        }
    }
}

/// This struct is used to specify the initialization parameters for all nodes
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NodeInitParams {
    pub common: Option<CommonInitParams>,
    pub ssh: Option<SshInitParams>,
}

impl NodeInitParams {
    pub fn vm_generation(&self) -> Option<VmGeneration> {
        self.common.as_ref().and_then(|c| c.vm_generation)
    }
}
