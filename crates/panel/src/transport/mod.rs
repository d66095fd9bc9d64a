//! Push socket client and outgoing command dispatch.

pub mod commands;
pub mod push;

pub use commands::{command_channel, run_dispatcher, CommandClient, CommandQueue};
pub use push::run_push_client;
