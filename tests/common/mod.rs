pub mod config;
pub mod context;
pub mod local;
pub mod ssh;
