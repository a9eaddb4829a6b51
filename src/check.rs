//! Expected VMBus inventory and channel scaling.
//!
//! Everything here is pure: the inputs come from the node tools and the
//! output is the list of violations found.
use std::fmt;

use bitflags::bitflags;

use crate::api::VmGeneration;
use crate::tools::VmBusDevice;

pub const NETWORK_ADAPTER: &str = "Synthetic network adapter";
pub const SCSI_CONTROLLER: &str = "Synthetic SCSI Controller";
pub const IDE_CONTROLLER: &str = "Synthetic IDE Controller";

const BASE_NAMES: [&str; 8] = [
    "Operating system shutdown",
    "Time Synchronization",
    "Heartbeat",
    "Data Exchange",
    "Synthetic mouse",
    "Synthetic keyboard",
    NETWORK_ADAPTER,
    SCSI_CONTROLLER,
];

const MAX_NETWORK_CHANNELS: u32 = 8;
const MAX_SCSI_CORES: u32 = 256;
const CORES_PER_SCSI_CHANNEL: u32 = 4;

bitflags! {
    /// Selects which parts of the inventory are verified.
    pub struct Checks: u32 {
        const NAMES = 0b001;
        const NETWORK_CHANNELS = 0b010;
        const SCSI_CHANNELS = 0b100;
    }
}

impl Default for Checks {
    fn default() -> Self {
        Checks::all()
    }
}

/// Device names every guest of `generation` must expose.
///
/// Generation 1 guests additionally expose the legacy IDE controller.
pub fn expected_vmbus_names(generation: VmGeneration) -> Vec<&'static str> {
    let mut names = BASE_NAMES.to_vec();
    if generation == VmGeneration::Gen1 {
        names.push(IDE_CONTROLLER);
    }
    names
}

/// netvsc opens one channel per vCPU, capped at 8.
pub fn expected_network_channel_count(core_count: u32) -> u32 {
    core_count.min(MAX_NETWORK_CHANNELS)
}

/// storvsc opens one channel per 4 vCPUs, rounded up, capped at 64.
pub fn expected_scsi_channel_count(core_count: u32) -> u32 {
    let cores = core_count.min(MAX_SCSI_CORES);
    (cores + CORES_PER_SCSI_CHANNEL - 1) / CORES_PER_SCSI_CHANNEL
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeviceClass {
    Network,
    Scsi,
}

impl DeviceClass {
    pub fn device_name(self) -> &'static str {
        match self {
            DeviceClass::Network => NETWORK_ADAPTER,
            DeviceClass::Scsi => SCSI_CONTROLLER,
        }
    }

    pub fn expected_channel_count(self, core_count: u32) -> u32 {
        match self {
            DeviceClass::Network => expected_network_channel_count(core_count),
            DeviceClass::Scsi => expected_scsi_channel_count(core_count),
        }
    }

    fn check(self) -> Checks {
        match self {
            DeviceClass::Network => Checks::NETWORK_CHANNELS,
            DeviceClass::Scsi => Checks::SCSI_CHANNELS,
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceClass::Network => write!(f, "network"),
            DeviceClass::Scsi => write!(f, "scsi"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    MissingDevice {
        name: &'static str,
    },
    ChannelCountMismatch {
        class: DeviceClass,
        actual: usize,
        expected: u32,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingDevice { name } => {
                write!(f, "expected vmbus_name '{}' doesn't exist.", name)
            }
            Violation::ChannelCountMismatch {
                class,
                actual,
                expected,
            } => write!(
                f,
                "actual {} channel count '{}' doesn't match expected channel count '{}'",
                class, actual, expected
            ),
        }
    }
}

/// Expected names missing from `devices`. Unlisted devices are ignored.
pub fn check_names(generation: VmGeneration, devices: &[VmBusDevice]) -> Vec<Violation> {
    expected_vmbus_names(generation)
        .into_iter()
        .filter(|name| !devices.iter().any(|d| d.vmbus_name == *name))
        .map(|name| Violation::MissingDevice { name })
        .collect()
}

/// Channel count mismatches of every network and SCSI device, in device order.
pub fn check_channels(devices: &[VmBusDevice], core_count: u32, checks: Checks) -> Vec<Violation> {
    let classes: Vec<DeviceClass> = [DeviceClass::Network, DeviceClass::Scsi]
        .iter()
        .copied()
        .filter(|class| checks.contains(class.check()))
        .collect();

    devices
        .iter()
        .filter_map(|device| {
            let class = classes
                .iter()
                .copied()
                .find(|class| class.device_name() == device.vmbus_name)?;
            let expected = class.expected_channel_count(core_count);
            let actual = device.channel_vp_map.len();
            if actual as u64 == u64::from(expected) {
                None
            } else {
                Some(Violation::ChannelCountMismatch {
                    class,
                    actual,
                    expected,
                })
            }
        })
        .collect()
}

/// Every violation of the expected inventory, names first.
pub fn check_vmbuses(
    generation: VmGeneration,
    devices: &[VmBusDevice],
    core_count: u32,
    checks: Checks,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    if checks.contains(Checks::NAMES) {
        violations.extend(check_names(generation, devices));
    }
    violations.extend(check_channels(devices, core_count, checks));
    violations
}
