use crate::common::config::CommonConfig;

use super::IntegrationTest;
use vmbuscheck::api::{Node, OsFamily};

fn node_information(node: Box<dyn Node>, cfg: CommonConfig) {
    let info = node.get_node_information().unwrap();
    assert_eq!(info.os, OsFamily::Linux);
    if let Some(generation) = cfg.vm_generation {
        assert_eq!(info.vm_generation, generation);
    }
}

inventory::submit!(IntegrationTest {
    name: "node_information",
    test_fn: node_information
});
