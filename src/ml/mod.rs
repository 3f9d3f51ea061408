pub mod batch;
pub mod bets;
pub mod cards;
pub mod heads;
pub mod network;
pub mod state;
pub mod trunk;

pub use batch::{Action, DecisionBatch, DecisionRow, DecisionSample, Evaluation};
pub use bets::BettingEncoder;
pub use cards::{CARD_CELLS, CARD_CHANNELS, CARD_COLS, CARD_ROWS, CardGridEncoder};
pub use heads::{OutputHeads, STATE_BOUND};
pub use network::PokerNet;
pub use state::{BranchedStateFusion, SimpleStateFusion, StateFusion, StateFusionEncoder};
pub use trunk::FusionTrunk;
