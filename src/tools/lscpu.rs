use log::{debug, trace};

use crate::api::Node;
use crate::errors::NodeError;

const TOOL: &str = "lscpu";
const CPU_ONLINE_PATH: &str = "/sys/devices/system/cpu/online";

pub struct Lscpu<'a, N: Node + ?Sized> {
    node: &'a N,
}

impl<'a, N: Node + ?Sized> Lscpu<'a, N> {
    pub fn new(node: &'a N) -> Self {
        Lscpu { node }
    }

    /// Returns the number of logical CPUs of the node.
    ///
    /// Falls back to the kernel's online CPU list when `lscpu` is not installed.
    pub fn get_core_count(&self) -> Result<u32, NodeError> {
        let count = match self.node.execute(TOOL, &[]) {
            Ok(output) => parse_core_count(&output.into_stdout(TOOL)?)?,
            Err(NodeError::CommandNotFound(_)) => {
                debug!("lscpu not installed, reading {}", CPU_ONLINE_PATH);
                parse_cpu_list(&self.node.read_file(CPU_ONLINE_PATH)?)?
            }
            Err(e) => return Err(e),
        };
        if count == 0 {
            return Err(NodeError::parse(TOOL, "core count is 0"));
        }
        debug!("core count: {}", count);
        Ok(count)
    }
}

/// Extracts the `CPU(s):` value from `lscpu` output.
pub fn parse_core_count(output: &str) -> Result<u32, NodeError> {
    for line in output.lines() {
        if let Some((key, value)) = line.split_once(':') {
            if key.trim() == "CPU(s)" {
                trace!("lscpu line: {}", line);
                return value
                    .trim()
                    .parse::<u32>()
                    .map_err(|e| NodeError::parse(TOOL, format!("bad CPU(s) value '{}': {}", value.trim(), e)));
            }
        }
    }
    Err(NodeError::parse(TOOL, "no CPU(s) line"))
}

/// Counts the CPUs in a kernel cpu list such as `0-3,5,7-8`.
pub fn parse_cpu_list(list: &str) -> Result<u32, NodeError> {
    let bad = |part: &str| NodeError::parse(TOOL, format!("bad cpu list entry '{}'", part));
    let mut count: u32 = 0;
    for part in list.trim().split(',').filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((first, last)) => {
                let first: u32 = first.parse().map_err(|_| bad(part))?;
                let last: u32 = last.parse().map_err(|_| bad(part))?;
                let span = last
                    .checked_sub(first)
                    .and_then(|span| span.checked_add(1))
                    .ok_or_else(|| bad(part))?;
                count = count.checked_add(span).ok_or_else(|| bad(part))?;
            }
            None => {
                part.parse::<u32>().map_err(|_| bad(part))?;
                count = count.checked_add(1).ok_or_else(|| bad(part))?;
            }
        }
    }
    Ok(count)
}
