//! Command implementations for the Skillet CLI

pub mod check;
pub mod completions;
pub mod config;
pub mod context;
pub mod freeze;
pub mod install;
pub mod list;
pub mod scan;
pub mod search;
pub mod uninstall;
pub mod update;
