//! Shared models for `asnrecon`: scan configuration, IPv4 range descriptors and
//! ignore intervals.

pub mod config;
pub mod network;
