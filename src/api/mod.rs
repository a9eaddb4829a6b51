//! Node abstraction shared by every backend and tool.
use std::fmt;
use std::str::FromStr;

use enum_iterator::IntoEnumIterator;
#[cfg(test)]
use mockall::automock;

use crate::errors::NodeError;

pub mod params;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, IntoEnumIterator)]
pub enum NodeType {
    /// The machine this process runs on
    Local,
    /// A guest reached through the system `ssh` client
    Ssh,
}

/// Hyper-V firmware model of the guest.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VmGeneration {
    /// BIOS firmware, exposes the legacy IDE controller
    Gen1,
    /// UEFI firmware
    Gen2,
}

impl FromStr for VmGeneration {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(VmGeneration::Gen1),
            "2" => Ok(VmGeneration::Gen2),
            other => Err(NodeError::parse(
                "vm_generation",
                format!("unknown generation '{}'", other),
            )),
        }
    }
}

impl fmt::Display for VmGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmGeneration::Gen1 => write!(f, "1"),
            VmGeneration::Gen2 => write!(f, "2"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OsFamily {
    Linux,
    Windows,
    Other(String),
}

impl OsFamily {
    /// Maps a `uname -s` style system name.
    pub fn from_sysname(sysname: &str) -> Self {
        match sysname.trim() {
            "Linux" => OsFamily::Linux,
            s if s.starts_with("Windows") || s.starts_with("MINGW") || s.starts_with("CYGWIN") => {
                OsFamily::Windows
            }
            s => OsFamily::Other(s.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInformation {
    pub vm_generation: VmGeneration,
    pub os: OsFamily,
    pub kernel_release: Option<String>,
}

/// Captured result of a command run on a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` if the process was killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Returns stdout, or a `CommandFailed` error naming `command` when the exit status is non-zero.
    pub fn into_stdout(self, command: &str) -> Result<String, NodeError> {
        if self.success() {
            Ok(self.stdout)
        } else {
            Err(NodeError::CommandFailed {
                command: command.to_string(),
                status: self.status,
                stderr: self.stderr.trim().to_string(),
            })
        }
    }
}

#[cfg_attr(test, automock)]
pub trait Node {
    /// Reports the VM generation and operating system of the node.
    fn get_node_information(&self) -> Result<NodeInformation, NodeError>;

    /// Runs `cmd` with `args` and captures its output.
    ///
    /// A non-zero exit status is not an error. A command that does not exist
    /// on the node is reported as [`NodeError::CommandNotFound`].
    fn execute<'a>(&self, cmd: &str, args: &[&'a str]) -> Result<CommandOutput, NodeError>;

    fn read_file(&self, path: &str) -> Result<String, NodeError>;

    /// Lists the entry names of a directory, sorted.
    fn read_dir(&self, path: &str) -> Result<Vec<String>, NodeError>;

    fn node_type(&self) -> NodeType;
}
