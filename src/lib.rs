pub mod api;
pub mod check;
pub mod errors;
pub mod node;
pub mod suite;
pub mod tools;

use enum_iterator::IntoEnumIterator;
use log::{debug, info};

use api::params::NodeInitParams;
use api::{Node, NodeType};
use errors::NodeError;
#[cfg(target_os = "linux")]
use node::local::Local;
use node::ssh::Ssh;

/// Builds the node the checks run against.
///
/// Without an explicit `node_type`, every node type is tried in declaration
/// order and the first one that initializes is returned. The local node is
/// not a candidate when ssh parameters are given.
pub fn init(
    node_type: Option<NodeType>,
    init_params: Option<NodeInitParams>,
) -> Result<Box<dyn Node>, NodeError> {
    info!("vmbuscheck init");
    let init_params = init_params.unwrap_or_default();
    match node_type {
        None => {
            let candidates = NodeType::into_enum_iter()
                .filter(|t| *t != NodeType::Local || init_params.ssh.is_none());
            for node_type in candidates {
                match init_node(node_type, &init_params) {
                    Ok(node) => return Ok(node),
                    Err(e) => debug!("{:?} node not available: {}", node_type, e),
                }
            }
            Err(NodeError::NoNodeAvailable)
        }
        Some(node_type) => init_node(node_type, &init_params),
    }
}

fn init_node(node_type: NodeType, init_params: &NodeInitParams) -> Result<Box<dyn Node>, NodeError> {
    debug!("init {:?} node", node_type);
    match node_type {
        NodeType::Local => {
            #[cfg(target_os = "linux")]
            {
                Ok(Box::new(Local::new(init_params)?))
            }
            #[cfg(not(target_os = "linux"))]
            {
                Err(NodeError::NodeNotCompiled(NodeType::Local))
            }
        }
        NodeType::Ssh => Ok(Box::new(Ssh::new(init_params)?)),
    }
}
