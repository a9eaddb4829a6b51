use crate::common::config::CommonConfig;

use super::IntegrationTest;
use vmbuscheck::api::Node;
use vmbuscheck::suite::{lsvmbus_channel_counting, TestResult};
use vmbuscheck::tools::{Lscpu, Lsvmbus};

fn get_core_count(node: Box<dyn Node>, _cfg: CommonConfig) {
    assert!(Lscpu::new(node.as_ref()).get_core_count().unwrap() >= 1);
}

fn get_vmbuses(node: Box<dyn Node>, _cfg: CommonConfig) {
    let devices = Lsvmbus::new(node.as_ref()).get_vmbuses().unwrap();
    assert!(!devices.is_empty());
    for device in devices {
        assert!(!device.channel_vp_map.is_empty(), "{} has no channels", device.vmbus_name);
    }
}

fn channel_counting(node: Box<dyn Node>, _cfg: CommonConfig) {
    let result = lsvmbus_channel_counting(node.as_ref()).unwrap();
    assert_eq!(result, TestResult::Passed);
}

inventory::submit!(IntegrationTest {
    name: "get_core_count",
    test_fn: get_core_count
});

inventory::submit!(IntegrationTest {
    name: "get_vmbuses",
    test_fn: get_vmbuses
});

inventory::submit!(IntegrationTest {
    name: "lsvmbus_channel_counting",
    test_fn: channel_counting
});
