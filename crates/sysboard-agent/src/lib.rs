//! sysboard agent: samples the host and keeps one dashboard message current.

pub mod config;
pub mod refresher;
