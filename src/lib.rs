//! Multi-branch feature-fusion network for poker decisions.
//!
//! A [`PokerNet`] encodes the card grid, the betting vector and the recurrent
//! hand/game state in separate branches, fuses them in a shared trunk, and
//! emits fold/call/raise logits, a value estimate and the next recurrent state.

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod ml;

pub use crate::checkpoint::NetworkCheckpoint;
pub use crate::config::{NetworkConfig, StateMode};
pub use crate::error::{CheckpointError, NetworkError};
pub use crate::ml::{
    Action, CARD_CELLS, DecisionBatch, DecisionRow, DecisionSample, Evaluation, PokerNet,
    STATE_BOUND, StateFusion,
};
