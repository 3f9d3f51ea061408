use std::fmt;
use std::str::FromStr;

use burn::tensor::backend::Backend;
use serde::{Deserialize, Serialize};

use crate::error::NetworkError;
use crate::ml::PokerNet;

pub const DEFAULT_BETS_IN: usize = 128;
pub const DEFAULT_BETS_HIDDEN: usize = 64;
pub const DEFAULT_BETS_OUT: usize = 32;
pub const DEFAULT_CARDS_OUT: usize = 64;
pub const DEFAULT_HAND_STATE: usize = 32;
pub const DEFAULT_GAME_STATE: usize = 32;
pub const DEFAULT_STATE_HIDDEN: usize = 64;
pub const DEFAULT_STATE_OUT: usize = 32;
pub const DEFAULT_TRUNK_HIDDEN: usize = 128;

/// How the hand and game state vectors are fused before reaching the trunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StateMode {
    /// Concatenate hand and game first, then one two-layer transform.
    #[default]
    Simple,
    /// Separate sub-networks for hand and game, fused afterwards.
    Branched,
}

impl StateMode {
    pub const ALL: [StateMode; 2] = [StateMode::Simple, StateMode::Branched];

    pub fn as_str(self) -> &'static str {
        match self {
            StateMode::Simple => "simple",
            StateMode::Branched => "branched",
        }
    }
}

impl fmt::Display for StateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StateMode {
    type Err = NetworkError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "simple" => Ok(StateMode::Simple),
            "branched" => Ok(StateMode::Branched),
            other => Err(NetworkError::InvalidConfiguration(format!(
                "invalid state_mode {other:?}, use \"simple\" or \"branched\""
            ))),
        }
    }
}

impl TryFrom<String> for StateMode {
    type Error = NetworkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StateMode> for String {
    fn from(mode: StateMode) -> Self {
        mode.as_str().to_string()
    }
}

/// Construction record for a [`PokerNet`]. Every option is independently defaulted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub bets_in_dim: usize,
    pub bets_hidden_dim: usize,
    pub bets_out_dim: usize,
    pub cards_out_dim: usize,
    pub hand_state_dim: usize,
    pub game_state_dim: usize,
    pub state_hidden_dim: usize,
    pub state_out_dim: usize,
    pub trunk_hidden_dim: usize,
    pub state_mode: StateMode,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bets_in_dim: DEFAULT_BETS_IN,
            bets_hidden_dim: DEFAULT_BETS_HIDDEN,
            bets_out_dim: DEFAULT_BETS_OUT,
            cards_out_dim: DEFAULT_CARDS_OUT,
            hand_state_dim: DEFAULT_HAND_STATE,
            game_state_dim: DEFAULT_GAME_STATE,
            state_hidden_dim: DEFAULT_STATE_HIDDEN,
            state_out_dim: DEFAULT_STATE_OUT,
            trunk_hidden_dim: DEFAULT_TRUNK_HIDDEN,
            state_mode: StateMode::Simple,
        }
    }
}

impl NetworkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bets_in_dim(mut self, dim: usize) -> Self {
        self.bets_in_dim = dim;
        self
    }

    pub fn with_bets_hidden_dim(mut self, dim: usize) -> Self {
        self.bets_hidden_dim = dim;
        self
    }

    pub fn with_bets_out_dim(mut self, dim: usize) -> Self {
        self.bets_out_dim = dim;
        self
    }

    pub fn with_cards_out_dim(mut self, dim: usize) -> Self {
        self.cards_out_dim = dim;
        self
    }

    pub fn with_hand_state_dim(mut self, dim: usize) -> Self {
        self.hand_state_dim = dim;
        self
    }

    pub fn with_game_state_dim(mut self, dim: usize) -> Self {
        self.game_state_dim = dim;
        self
    }

    pub fn with_state_hidden_dim(mut self, dim: usize) -> Self {
        self.state_hidden_dim = dim;
        self
    }

    pub fn with_state_out_dim(mut self, dim: usize) -> Self {
        self.state_out_dim = dim;
        self
    }

    pub fn with_trunk_hidden_dim(mut self, dim: usize) -> Self {
        self.trunk_hidden_dim = dim;
        self
    }

    pub fn with_state_mode(mut self, mode: StateMode) -> Self {
        self.state_mode = mode;
        self
    }

    /// Parse the state mode from text, failing on anything but `simple`/`branched`.
    pub fn with_state_mode_str(self, mode: &str) -> Result<Self, NetworkError> {
        Ok(self.with_state_mode(mode.parse()?))
    }

    pub fn validate(&self) -> Result<(), NetworkError> {
        let dims = [
            ("bets_in_dim", self.bets_in_dim),
            ("bets_hidden_dim", self.bets_hidden_dim),
            ("bets_out_dim", self.bets_out_dim),
            ("cards_out_dim", self.cards_out_dim),
            ("hand_state_dim", self.hand_state_dim),
            ("game_state_dim", self.game_state_dim),
            ("state_hidden_dim", self.state_hidden_dim),
            ("state_out_dim", self.state_out_dim),
            ("trunk_hidden_dim", self.trunk_hidden_dim),
        ];
        for (name, value) in dims {
            if value == 0 {
                return Err(NetworkError::InvalidConfiguration(format!(
                    "{name} must be positive"
                )));
            }
        }
        Ok(())
    }

    /// Width of the concatenated encoder outputs fed into the trunk.
    pub fn fused_dim(&self) -> usize {
        self.cards_out_dim + self.bets_out_dim + self.state_out_dim
    }

    /// Validate and allocate a freshly initialized network on `device`.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<PokerNet<B>, NetworkError> {
        self.validate()?;
        Ok(PokerNet::from_config(self, device))
    }
}
