//! Relay control panel client.
//!
//! Pushed relay state is reconciled onto a page of relay controls; clicks
//! on relays flagged `confirmOff` go through a confirmation dialog before
//! the switch command is sent.

pub mod bus;
pub mod cli;
pub mod config;
pub mod error;
pub mod gate;
pub mod panel;
pub mod reconciler;
pub mod render;
pub mod session;
pub mod surface;
pub mod transport;
