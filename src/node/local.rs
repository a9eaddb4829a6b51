use std::fs;
use std::io::ErrorKind;
use std::process::Command;

use log::{debug, trace};
use nix::sys::utsname::uname;

use crate::api::params::NodeInitParams;
use crate::api::{CommandOutput, Node, NodeInformation, NodeType, OsFamily, VmGeneration};
use crate::errors::NodeError;
use crate::node::probe_generation;

/// The machine this process runs on, usually the guest under test itself.
#[derive(Debug, Default)]
pub struct Local {
    vm_generation: Option<VmGeneration>,
}

impl Local {
    pub fn new(init_params: &NodeInitParams) -> Result<Self, NodeError> {
        debug!("local node init");
        Ok(Local {
            vm_generation: init_params.vm_generation(),
        })
    }
}

impl Node for Local {
    fn get_node_information(&self) -> Result<NodeInformation, NodeError> {
        let uts = uname();
        let vm_generation = probe_generation(self, self.vm_generation)?;
        Ok(NodeInformation {
            vm_generation,
            os: OsFamily::from_sysname(uts.sysname()),
            kernel_release: Some(uts.release().to_string()),
        })
    }

    fn execute<'a>(&self, cmd: &str, args: &[&'a str]) -> Result<CommandOutput, NodeError> {
        trace!("local exec: {} {:?}", cmd, args);
        let output = Command::new(cmd).args(args).output().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                NodeError::CommandNotFound(cmd.to_string())
            } else {
                NodeError::Io(e)
            }
        })?;
        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn read_file(&self, path: &str) -> Result<String, NodeError> {
        Ok(fs::read_to_string(path)?)
    }

    fn read_dir(&self, path: &str) -> Result<Vec<String>, NodeError> {
        let mut entries = fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
            .collect::<Result<Vec<_>, _>>()?;
        entries.sort();
        Ok(entries)
    }

    fn node_type(&self) -> NodeType {
        NodeType::Local
    }
}
