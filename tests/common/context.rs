use std::env;

use super::config::CommonConfig;
use super::local::Local;
use super::ssh::Ssh;
use vmbuscheck::api::Node;

pub trait Context: Send {
    /// Why the tests cannot run in this environment, if they cannot
    fn unavailable(&self) -> Option<String>;
    fn setup(&self) -> ();
    fn init_node(&self) -> Box<dyn Node>;
    fn teardown(&self) -> ();
    fn config(&self) -> &CommonConfig;
}

pub fn init_context() -> Box<dyn Context> {
    match env::var("TEST_NODE").as_deref() {
        Ok("ssh") => Box::new(Ssh::default()),
        Ok("local") | Err(_) => Box::new(Local::default()),
        Ok(other) => panic!("unknown TEST_NODE '{}', expected 'local' or 'ssh'", other),
    }
}
