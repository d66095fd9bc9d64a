//! Shared wire types for the relay control panel.

mod models;

// Explicit re-exports (avoids rust-analyzer issues with `pub use models::*`)
pub use models::push_types;
pub use models::{
    ActiveFlag, DecodedBatch, PluginCommand, PluginMessage, PushEnvelope, RelayKey, RelayUpdate,
    UpdateBatch, UPDATE_VERB,
};
