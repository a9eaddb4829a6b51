//! The VMBus channel-counting test case.
use std::fmt;

use log::{info, warn};

use crate::api::{Node, OsFamily};
use crate::check::{self, Checks};
use crate::errors::NodeError;
use crate::tools::{Lscpu, Lsvmbus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestResult {
    Passed,
    Failed(String),
    Skipped(String),
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestResult::Passed => write!(f, "PASSED"),
            TestResult::Failed(msg) => write!(f, "FAILED: {}", msg),
            TestResult::Skipped(reason) => write!(f, "SKIPPED: {}", reason),
        }
    }
}

#[derive(Debug)]
pub struct TestCaseMetadata {
    pub name: &'static str,
    pub area: &'static str,
    pub category: &'static str,
    pub priority: u8,
    pub description: &'static str,
    pub unsupported_os: &'static [OsFamily],
}

impl TestCaseMetadata {
    /// Reason the test case cannot run on `os`, if any.
    pub fn skip_reason(&self, os: &OsFamily) -> Option<String> {
        if self.unsupported_os.contains(os) {
            Some(format!("{} is not supported on {:?}", self.name, os))
        } else {
            None
        }
    }
}

pub static LSVMBUS_CHANNEL_COUNTING: TestCaseMetadata = TestCaseMetadata {
    name: "lsvmbus_channel_counting",
    area: "core",
    category: "functional",
    priority: 1,
    description: "\
Checks that the expected VMBus devices exist: Operating system shutdown, \
Time Synchronization, Heartbeat, Data Exchange, Synthetic mouse, \
Synthetic keyboard, Synthetic network adapter, Synthetic SCSI Controller, \
and Synthetic IDE Controller on generation 1 guests. \
Each netvsc device must have min(vCPUs, 8) channels and each storvsc SCSI \
device must have ceil(min(vCPUs, 256) / 4) channels.",
    unsupported_os: &[OsFamily::Windows],
};

/// Runs the channel-counting test case with every check enabled.
pub fn lsvmbus_channel_counting<N: Node + ?Sized>(node: &N) -> Result<TestResult, NodeError> {
    run_with_checks(node, Checks::default())
}

/// Runs the channel-counting test case.
///
/// Only inventory problems become [`TestResult::Failed`]. Errors from the node
/// or its tools are returned as-is.
pub fn run_with_checks<N: Node + ?Sized>(node: &N, checks: Checks) -> Result<TestResult, NodeError> {
    let information = node.get_node_information()?;
    if let Some(reason) = LSVMBUS_CHANNEL_COUNTING.skip_reason(&information.os) {
        info!("{}", reason);
        return Ok(TestResult::Skipped(reason));
    }
    info!(
        "vm generation {}, kernel {}",
        information.vm_generation,
        information.kernel_release.as_deref().unwrap_or("unknown")
    );

    let devices = Lsvmbus::new(node).get_vmbuses()?;
    if checks.contains(Checks::NAMES) {
        if let Some(violation) = first_violation(check::check_names(information.vm_generation, &devices)) {
            return Ok(TestResult::Failed(violation));
        }
    }

    if !checks.intersects(Checks::NETWORK_CHANNELS | Checks::SCSI_CHANNELS) {
        return Ok(TestResult::Passed);
    }
    let core_count = Lscpu::new(node).get_core_count()?;
    info!(
        "core count {}: expecting {} network and {} scsi channels",
        core_count,
        check::expected_network_channel_count(core_count),
        check::expected_scsi_channel_count(core_count)
    );
    match first_violation(check::check_channels(&devices, core_count, checks)) {
        Some(violation) => Ok(TestResult::Failed(violation)),
        None => Ok(TestResult::Passed),
    }
}

fn first_violation(violations: Vec<check::Violation>) -> Option<String> {
    for violation in &violations {
        warn!("{}", violation);
    }
    violations.first().map(|v| v.to_string())
}
