//! Tools that query a [`Node`](crate::api::Node) and parse what it reports.
pub mod lscpu;
pub mod lsvmbus;

pub use lscpu::Lscpu;
pub use lsvmbus::{Lsvmbus, VmBusDevice};
