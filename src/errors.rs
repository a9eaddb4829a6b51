use std::io;

use crate::api::NodeType;

#[derive(thiserror::Error, Debug)]
pub enum NodeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("command not found on node: {0}")]
    CommandNotFound(String),
    #[error("command `{command}` exited with {status:?}: {stderr}")]
    CommandFailed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },
    #[error("failed to parse {tool} output: {message}")]
    Parse { tool: &'static str, message: String },
    #[error("node type {0:?} has not been compiled")]
    NodeNotCompiled(NodeType),
    #[error("node type {0:?} requires init parameters that were not provided")]
    MissingParams(NodeType),
    #[error("no suitable node available")]
    NoNodeAvailable,
}

impl NodeError {
    pub(crate) fn parse(tool: &'static str, message: impl Into<String>) -> Self {
        NodeError::Parse {
            tool,
            message: message.into(),
        }
    }
}
