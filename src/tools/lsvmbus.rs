use std::collections::BTreeMap;

use log::{debug, trace};

use crate::api::Node;
use crate::errors::NodeError;

const TOOL: &str = "lsvmbus";
const VMBUS_DEVICES_PATH: &str = "/sys/bus/vmbus/devices";
pub const UNKNOWN_DEVICE_NAME: &str = "Unknown";

/// Symbolic names of the VMBus device classes, keyed by class GUID.
const KNOWN_CLASSES: &[(&str, &str)] = &[
    ("0e0b6031-5213-4934-818b-38d90ced39db", "Operating system shutdown"),
    ("9527e630-d0ae-497b-adce-e80ab0175caf", "Time Synchronization"),
    ("57164f39-9115-4e78-ab55-382f3bd5422d", "Heartbeat"),
    ("a9a0f4e7-5a45-4d96-b827-8a841e8c03e6", "Data Exchange"),
    ("35fa2e29-ea23-4236-96ae-3a6ebacba440", "Backup (volume checkpoint)"),
    ("34d14be3-dee4-41c8-9ae7-6b174977c192", "Guest services"),
    ("525074dc-8985-46e2-8057-a307dc18a502", "Dynamic Memory"),
    ("cfa8b69e-5b4a-4cc0-b98b-8ba1a1f3f95a", "Synthetic mouse"),
    ("f912ad6d-2b17-48ea-bd65-f927a61c7684", "Synthetic keyboard"),
    ("da0a7802-e377-4aac-8e77-0558eb1073f8", "Synthetic framebuffer adapter"),
    ("f8615163-df3e-46c5-913f-f2d2f965ed0e", "Synthetic network adapter"),
    ("32412632-86cb-44a2-9b5c-50d1417354f5", "Synthetic IDE Controller"),
    ("ba6163d9-04a1-4d29-b605-72e2ffb1dc7f", "Synthetic SCSI Controller"),
    ("2f9bcc4a-0069-4af3-b76b-6fd0be528cda", "Synthetic fiber channel adapter"),
    ("8c2eaf3d-32a7-4b09-ab99-bd1f1c86b501", "Synthetic RDMA adapter"),
    ("44c4f61d-4444-4400-9d52-802e27ede19f", "PCI Express pass-through"),
    ("276aacf4-ac15-426c-98dd-7521ad3f01fe", "Reserved system device"),
    ("f8e65716-3cb3-4a06-9a60-1889c5cccab5", "Reserved system device"),
    ("3375baf4-9e15-4b30-b765-67acb10d607b", "Reserved system device"),
];

/// Returns the symbolic name of a VMBus class GUID, braces optional.
pub fn class_name(class_id: &str) -> &'static str {
    let class_id = strip_braces(class_id).to_ascii_lowercase();
    KNOWN_CLASSES
        .iter()
        .find(|(guid, _)| *guid == class_id)
        .map(|(_, name)| *name)
        .unwrap_or(UNKNOWN_DEVICE_NAME)
}

fn strip_braces(guid: &str) -> &str {
    guid.trim().trim_start_matches('{').trim_end_matches('}')
}

/// A device offered on the VMBus, with the virtual processor each of its
/// channels is bound to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VmBusDevice {
    pub vmbus_id: u32,
    pub class_id: String,
    pub device_id: String,
    pub vmbus_name: String,
    pub sysfs_path: String,
    /// channel relid -> target VP
    pub channel_vp_map: BTreeMap<u32, u32>,
}

pub struct Lsvmbus<'a, N: Node + ?Sized> {
    node: &'a N,
}

impl<'a, N: Node + ?Sized> Lsvmbus<'a, N> {
    pub fn new(node: &'a N) -> Self {
        Lsvmbus { node }
    }

    /// Enumerates the VMBus devices of the node.
    ///
    /// Uses `lsvmbus -vv` when installed, and walks sysfs otherwise.
    pub fn get_vmbuses(&self) -> Result<Vec<VmBusDevice>, NodeError> {
        let devices = match self.node.execute(TOOL, &["-vv"]) {
            Ok(output) => parse_lsvmbus(&output.into_stdout(TOOL)?)?,
            Err(NodeError::CommandNotFound(_)) => {
                debug!("lsvmbus not installed, walking {}", VMBUS_DEVICES_PATH);
                self.get_vmbuses_from_sysfs()?
            }
            Err(e) => return Err(e),
        };
        debug!("found {} vmbus devices", devices.len());
        Ok(devices)
    }

    fn get_vmbuses_from_sysfs(&self) -> Result<Vec<VmBusDevice>, NodeError> {
        let mut devices = Vec::new();
        for entry in self.node.read_dir(VMBUS_DEVICES_PATH)? {
            let sysfs_path = format!("{}/{}", VMBUS_DEVICES_PATH, entry);
            let attr = |name: &str| self.node.read_file(&format!("{}/{}", sysfs_path, name));

            let class_id = strip_braces(&attr("class_id")?).to_string();
            let device_id = strip_braces(&attr("device_id")?).to_string();
            let id = attr("id")?;
            let vmbus_id: u32 = id
                .trim()
                .parse()
                .map_err(|_| NodeError::parse(TOOL, format!("bad id '{}' in {}", id.trim(), sysfs_path)))?;
            let channel_vp_map = parse_channel_vp_mapping(&attr("channel_vp_mapping")?)?;
            trace!("{}: class {} with {} channels", sysfs_path, class_id, channel_vp_map.len());

            devices.push(VmBusDevice {
                vmbus_id,
                vmbus_name: class_name(&class_id).to_string(),
                class_id,
                device_id,
                sysfs_path,
                channel_vp_map,
            });
        }
        devices.sort_by_key(|d| d.vmbus_id);
        Ok(devices)
    }
}

/// Parses the `relid:cpu` pairs of a sysfs `channel_vp_mapping` attribute.
pub fn parse_channel_vp_mapping(mapping: &str) -> Result<BTreeMap<u32, u32>, NodeError> {
    mapping
        .split_whitespace()
        .map(|pair| -> Result<(u32, u32), NodeError> {
            let bad = || NodeError::parse(TOOL, format!("bad channel_vp_mapping entry '{}'", pair));
            let (rel_id, cpu) = pair.split_once(':').ok_or_else(bad)?;
            Ok((
                rel_id.parse::<u32>().map_err(|_| bad())?,
                cpu.parse::<u32>().map_err(|_| bad())?,
            ))
        })
        .collect()
}

/// Parses the output of `lsvmbus -vv`.
///
/// ```text
/// VMBUS ID 14: Class_ID = {f8615163-df3e-46c5-913f-f2d2f965ed0e} - Synthetic network adapter
///         Device_ID = {000d3a6e-4548-000d-3a6e-4548000d3a6e}
///         Sysfs path: /sys/bus/vmbus/devices/000d3a6e-4548-000d-3a6e-4548000d3a6e
///         Rel_ID=14, target_cpu=0
///         Rel_ID=17, target_cpu=1
/// ```
pub fn parse_lsvmbus(output: &str) -> Result<Vec<VmBusDevice>, NodeError> {
    let mut devices = Vec::new();
    let mut current: Option<VmBusDevice> = None;

    for line in output.lines().map(str::trim) {
        if line.starts_with("VMBUS ID") {
            devices.extend(current.take());
            current = Some(parse_header(line)?);
            continue;
        }
        let device = match current.as_mut() {
            Some(device) => device,
            None => continue,
        };
        if let Some(value) = line.strip_prefix("Device_ID") {
            device.device_id = strip_braces(value.trim_start().trim_start_matches('=')).to_string();
        } else if let Some(value) = line.strip_prefix("Sysfs path:") {
            device.sysfs_path = value.trim().to_string();
        } else if line.starts_with("Rel_ID") {
            let (rel_id, cpu) = parse_channel(line)?;
            device.channel_vp_map.insert(rel_id, cpu);
        }
    }
    devices.extend(current);
    Ok(devices)
}

fn parse_header(line: &str) -> Result<VmBusDevice, NodeError> {
    let bad = || NodeError::parse(TOOL, format!("bad device header '{}'", line));
    let rest = line.strip_prefix("VMBUS ID").ok_or_else(bad)?;
    let (id, rest) = rest.split_once(':').ok_or_else(bad)?;
    let vmbus_id: u32 = id.trim().parse().map_err(|_| bad())?;
    let rest = rest.trim().strip_prefix("Class_ID").ok_or_else(bad)?;
    let rest = rest.trim_start().strip_prefix('=').ok_or_else(bad)?;
    let (class_id, name) = rest.split_once(" - ").ok_or_else(bad)?;
    Ok(VmBusDevice {
        vmbus_id,
        class_id: strip_braces(class_id).to_string(),
        vmbus_name: name.trim().to_string(),
        ..Default::default()
    })
}

fn parse_channel(line: &str) -> Result<(u32, u32), NodeError> {
    let bad = || NodeError::parse(TOOL, format!("bad channel line '{}'", line));
    let mut rel_id = None;
    let mut cpu = None;
    for field in line.split(',') {
        match field.trim().split_once('=') {
            Some(("Rel_ID", value)) => rel_id = Some(value.trim().parse::<u32>().map_err(|_| bad())?),
            Some(("target_cpu", value)) => cpu = Some(value.trim().parse::<u32>().map_err(|_| bad())?),
            _ => return Err(bad()),
        }
    }
    Ok((rel_id.ok_or_else(bad)?, cpu.ok_or_else(bad)?))
}
