use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::debug;
use vmbuscheck::api::params::{CommonInitParams, NodeInitParams, SshInitParams};
use vmbuscheck::api::{Node, NodeType};
use vmbuscheck::init;

use super::config::{CommonConfig, SshConfig};
use crate::common::context::Context;

/// Runs the tests against a guest reachable over ssh.
#[derive(Default, Clone)]
pub struct Ssh {
    config: SshConfig,
}

impl Ssh {
    fn params(&self) -> SshInitParams {
        SshInitParams {
            host: self.config.host.clone().expect("TEST_SSH_HOST is not set"),
            user: self.config.user.clone(),
            port: self.config.port,
            identity: self.config.identity.clone(),
        }
    }

    fn reachable(&self) -> bool {
        let params = self.params();
        let mut cmd = Command::new("ssh");
        cmd.args(&["-o", "BatchMode=yes", "-o", "ConnectTimeout=5"]);
        if let Some(port) = params.port {
            cmd.arg("-p").arg(port.to_string());
        }
        if let Some(identity) = &params.identity {
            cmd.arg("-i").arg(identity);
        }
        cmd.arg(params.destination())
            .arg("true")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .expect("Failed to start ssh")
            .success()
    }
}

impl Context for Ssh {
    fn unavailable(&self) -> Option<String> {
        match self.config.host {
            Some(_) => None,
            None => Some("TEST_SSH_HOST is not set".to_string()),
        }
    }

    /// wait until the guest accepts ssh connections
    fn setup(&self) {
        debug!("setup test");
        let deadline = Instant::now() + Duration::from_secs(self.config.common.timeout);
        while !self.reachable() {
            if Instant::now() >= deadline {
                panic!("guest {} is not reachable over ssh", self.params().destination());
            }
            thread::sleep(Duration::from_secs(2));
        }
    }

    fn init_node(&self) -> Box<dyn Node> {
        init(
            Some(NodeType::Ssh),
            Some(NodeInitParams {
                common: Some(CommonInitParams {
                    vm_generation: self.config.common.vm_generation,
                }),
                ssh: Some(self.params()),
            }),
        )
        .expect("Failed to init ssh node")
    }

    fn teardown(&self) {
        debug!("teardown test");
    }

    fn config(&self) -> &CommonConfig {
        &self.config.common
    }
}
