//! Node backends and the probing they share.
use log::debug;

use crate::api::{Node, NodeInformation, OsFamily, VmGeneration};
use crate::errors::NodeError;

#[cfg(target_os = "linux")]
pub mod local;
pub mod ssh;

const EFI_FIRMWARE_DIR: &str = "/sys/firmware/efi";

/// Detects the operating system of a node from its command surface.
///
/// Returns the OS family and, when available, the kernel release.
pub fn probe_os<N: Node + ?Sized>(node: &N) -> Result<(OsFamily, Option<String>), NodeError> {
    match node.execute("uname", &["-s"]) {
        Ok(output) if output.success() => {
            let os = OsFamily::from_sysname(&output.stdout);
            let release = match node.execute("uname", &["-r"]) {
                Ok(output) if output.success() => Some(output.stdout.trim().to_string())
                    .filter(|release| !release.is_empty()),
                _ => None,
            };
            Ok((os, release))
        }
        Ok(_) | Err(NodeError::CommandNotFound(_)) => {
            debug!("uname unavailable, trying `cmd /c ver`");
            match node.execute("cmd", &["/c", "ver"]) {
                Ok(output) if output.stdout.contains("Windows") => Ok((OsFamily::Windows, None)),
                Ok(output) => Ok((OsFamily::Other(output.stdout.trim().to_string()), None)),
                Err(NodeError::CommandNotFound(_)) => Ok((OsFamily::Other(String::new()), None)),
                Err(e) => Err(e),
            }
        }
        Err(e) => Err(e),
    }
}

/// Probes OS, kernel release and VM generation from the command surface.
///
/// Windows nodes have no sysfs to probe, their generation is the override or
/// generation 2.
pub fn probe_information<N: Node + ?Sized>(
    node: &N,
    override_generation: Option<VmGeneration>,
) -> Result<NodeInformation, NodeError> {
    let (os, kernel_release) = probe_os(node)?;
    let vm_generation = match os {
        OsFamily::Windows => override_generation.unwrap_or(VmGeneration::Gen2),
        _ => probe_generation(node, override_generation)?,
    };
    Ok(NodeInformation {
        vm_generation,
        os,
        kernel_release,
    })
}

/// Resolves the VM generation, preferring an explicit override.
///
/// Generation 2 guests boot through UEFI, so the EFI firmware directory is
/// present in sysfs. Its absence means generation 1.
pub fn probe_generation<N: Node + ?Sized>(
    node: &N,
    override_generation: Option<VmGeneration>,
) -> Result<VmGeneration, NodeError> {
    if let Some(generation) = override_generation {
        debug!("using configured vm generation {}", generation);
        return Ok(generation);
    }
    match node.read_dir(EFI_FIRMWARE_DIR) {
        Ok(_) => Ok(VmGeneration::Gen2),
        Err(NodeError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(VmGeneration::Gen1),
        // ssh reserves 255 for its own connection errors
        Err(NodeError::CommandFailed { status, .. }) if status != Some(255) => {
            Ok(VmGeneration::Gen1)
        }
        Err(e) => Err(e),
    }
}
