use std::io::ErrorKind;
use std::process::{Command, Stdio};

use log::{debug, trace};

use crate::api::params::{NodeInitParams, SshInitParams};
use crate::api::{CommandOutput, Node, NodeInformation, NodeType};
use crate::errors::NodeError;
use crate::node::probe_information;

const SSH_CONNECTION_ERROR: i32 = 255;
const SHELL_COMMAND_NOT_FOUND: i32 = 127;

/// A guest reached through the system `ssh` client.
///
/// Key-based authentication must already be set up, the client runs in batch
/// mode and never prompts.
#[derive(Debug)]
pub struct Ssh {
    params: SshInitParams,
    vm_generation: Option<crate::api::VmGeneration>,
}

impl Ssh {
    /// Builds the node and checks that the guest is reachable.
    pub fn new(init_params: &NodeInitParams) -> Result<Self, NodeError> {
        let params = init_params
            .ssh
            .clone()
            .ok_or(NodeError::MissingParams(NodeType::Ssh))?;
        debug!("ssh node init: {}", params.destination());
        let node = Ssh {
            params,
            vm_generation: init_params.vm_generation(),
        };
        node.execute("true", &[])?.into_stdout("true")?;
        Ok(node)
    }

    fn ssh_args(&self, cmd: &str, args: &[&str]) -> Vec<String> {
        let mut ssh_args = vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            "ConnectTimeout=10".to_string(),
        ];
        if let Some(port) = self.params.port {
            ssh_args.push("-p".to_string());
            ssh_args.push(port.to_string());
        }
        if let Some(identity) = &self.params.identity {
            ssh_args.push("-i".to_string());
            ssh_args.push(identity.to_string_lossy().into_owned());
        }
        ssh_args.push(self.params.destination());
        ssh_args.push("--".to_string());
        ssh_args.push(shell_quote(cmd));
        ssh_args.extend(args.iter().map(|arg| shell_quote(arg)));
        ssh_args
    }
}

/// Quotes `arg` for the remote shell. Plain words are passed unchanged so that
/// non-POSIX remote shells still see them as-is.
fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=,@+%".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Maps the exit status of `ssh <destination> -- <cmd>` to the node contract:
/// 255 is a connection failure, 127 is a missing remote command, anything else
/// is the command's own result.
fn into_result(
    cmd: &str,
    destination: &str,
    output: CommandOutput,
) -> Result<CommandOutput, NodeError> {
    match output.status {
        Some(SSH_CONNECTION_ERROR) => Err(NodeError::CommandFailed {
            command: format!("ssh {}", destination),
            status: output.status,
            stderr: output.stderr.trim().to_string(),
        }),
        Some(SHELL_COMMAND_NOT_FOUND) => Err(NodeError::CommandNotFound(cmd.to_string())),
        _ => Ok(output),
    }
}

impl Node for Ssh {
    fn get_node_information(&self) -> Result<NodeInformation, NodeError> {
        probe_information(self, self.vm_generation)
    }

    fn execute<'a>(&self, cmd: &str, args: &[&'a str]) -> Result<CommandOutput, NodeError> {
        let ssh_args = self.ssh_args(cmd, args);
        trace!("ssh {:?}", ssh_args);
        let output = Command::new("ssh")
            .args(&ssh_args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    NodeError::CommandNotFound("ssh".to_string())
                } else {
                    NodeError::Io(e)
                }
            })?;
        let output = CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        into_result(cmd, &self.params.destination(), output)
    }

    fn read_file(&self, path: &str) -> Result<String, NodeError> {
        self.execute("cat", &[path])?.into_stdout("cat")
    }

    fn read_dir(&self, path: &str) -> Result<Vec<String>, NodeError> {
        let listing = self.execute("ls", &["-1A", path])?.into_stdout("ls")?;
        let mut entries: Vec<String> = listing
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        entries.sort();
        Ok(entries)
    }

    fn node_type(&self) -> NodeType {
        NodeType::Ssh
    }
}
