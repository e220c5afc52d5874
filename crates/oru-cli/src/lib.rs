//! Library components of the ORU lab result processor CLI.

pub mod config;
pub mod event;
pub mod logging;
pub mod pipeline;
