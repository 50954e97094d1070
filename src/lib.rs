//! Shared library modules for the peerbet prediction-market client.
//!
//! The binary wires these together; everything testable lives here.

pub mod actions;
pub mod catalog;
pub mod chains;
pub mod codec;
pub mod config;
pub mod gateway;
pub mod reconcile;
pub mod session;
pub mod slots;
