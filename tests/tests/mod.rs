use vmbuscheck::api::Node;

use crate::common::config::CommonConfig;

mod init;
mod lsvmbus;

pub struct IntegrationTest {
    pub name: &'static str,
    pub test_fn: fn(Box<dyn Node>, CommonConfig),
}

inventory::collect!(IntegrationTest);
