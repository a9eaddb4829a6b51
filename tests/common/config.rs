use std::env;
use std::path::PathBuf;

use vmbuscheck::api::VmGeneration;

#[derive(Debug, Clone)]
pub struct CommonConfig {
    pub vm_generation: Option<VmGeneration>,
    pub timeout: u64,
}

impl Default for CommonConfig {
    fn default() -> Self {
        CommonConfig {
            vm_generation: env::var("TEST_VM_GENERATION")
                .ok()
                .map(|g| g.parse().unwrap()),
            timeout: env::var("TEST_TIMEOUT")
                .unwrap_or("60".to_string())
                .parse()
                .unwrap(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SshConfig {
    pub common: CommonConfig,
    pub host: Option<String>,
    pub user: Option<String>,
    pub port: Option<u16>,
    pub identity: Option<PathBuf>,
}

impl Default for SshConfig {
    fn default() -> Self {
        SshConfig {
            common: CommonConfig::default(),
            host: env::var("TEST_SSH_HOST").ok(),
            user: env::var("TEST_SSH_USER").ok(),
            port: env::var("TEST_SSH_PORT").ok().map(|p| p.parse().unwrap()),
            identity: env::var("TEST_SSH_IDENTITY").ok().map(PathBuf::from),
        }
    }
}
