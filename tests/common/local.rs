use std::path::Path;

use log::debug;
use vmbuscheck::api::params::{CommonInitParams, NodeInitParams};
use vmbuscheck::api::{Node, NodeType};
use vmbuscheck::init;

use super::config::CommonConfig;
use crate::common::context::Context;

const VMBUS_SYSFS: &str = "/sys/bus/vmbus/devices";

/// Runs the tests against the machine the harness runs on.
#[derive(Default, Clone)]
pub struct Local {
    config: CommonConfig,
}

impl Context for Local {
    fn unavailable(&self) -> Option<String> {
        if Path::new(VMBUS_SYSFS).is_dir() {
            None
        } else {
            Some(format!("{} not found, not a Hyper-V guest", VMBUS_SYSFS))
        }
    }

    fn setup(&self) {
        debug!("setup test on local node");
    }

    fn init_node(&self) -> Box<dyn Node> {
        init(
            Some(NodeType::Local),
            Some(NodeInitParams {
                common: Some(CommonInitParams {
                    vm_generation: self.config.vm_generation,
                }),
                ..Default::default()
            }),
        )
        .expect("Failed to init local node")
    }

    fn teardown(&self) {
        debug!("teardown test on local node");
    }

    fn config(&self) -> &CommonConfig {
        &self.config
    }
}
