use burn::module::{Ignored, Module};
use burn::tensor::Tensor;
use burn::tensor::backend::Backend;

use super::batch::{DecisionBatch, Evaluation};
use super::bets::BettingEncoder;
use super::cards::{CARD_CHANNELS, CARD_COLS, CARD_ROWS, CardGridEncoder};
use super::heads::OutputHeads;
use super::state::{StateFusion, StateFusionEncoder};
use super::trunk::FusionTrunk;
use crate::config::{NetworkConfig, StateMode};
use crate::error::NetworkError;

/// Cards, bets and recurrent state in; policy logits, value and the next
/// recurrent state out.
///
/// The network holds parameters only. Callers thread `next_hand_state` and
/// `next_game_state` back in as the following turn's `hand_state` and
/// `game_state`.
///
/// A network is `Send` but not `Sync`. To evaluate from several threads, give
/// each thread its own `clone()`; clones share the parameter storage.
#[derive(Module, Debug)]
pub struct PokerNet<B: Backend> {
    cards_branch: CardGridEncoder<B>,
    bets_branch: BettingEncoder<B>,
    state_branch: StateFusionEncoder<B>,
    trunk: FusionTrunk<B>,
    heads: OutputHeads<B>,
    config: Ignored<NetworkConfig>,
}

impl<B: Backend> PokerNet<B> {
    /// Allocates parameters without validating; use [`NetworkConfig::init`].
    pub(crate) fn from_config(config: &NetworkConfig, device: &B::Device) -> Self {
        let net = Self {
            cards_branch: CardGridEncoder::new(config.cards_out_dim, device),
            bets_branch: BettingEncoder::new(
                config.bets_in_dim,
                config.bets_hidden_dim,
                config.bets_out_dim,
                device,
            ),
            state_branch: StateFusionEncoder::new(config, device),
            trunk: FusionTrunk::new(config.fused_dim(), config.trunk_hidden_dim, device),
            heads: OutputHeads::new(
                config.trunk_hidden_dim,
                config.hand_state_dim,
                config.game_state_dim,
                device,
            ),
            config: Ignored(*config),
        };
        log::debug!(
            "initialized poker network (state_mode={}, parameters={})",
            config.state_mode,
            net.num_params()
        );
        net
    }

    pub fn config(&self) -> &NetworkConfig {
        &self.config.0
    }

    pub fn state_mode(&self) -> StateMode {
        self.state_branch.mode()
    }

    /// Run one decision step for a batch.
    ///
    /// Shapes: `cards [B, 4, 4, 13]`, `bets [B, bets_in_dim]`,
    /// `hand_state [B, hand_state_dim]`, `game_state [B, game_state_dim]`.
    /// Any disagreement with the configuration, across batch sizes, or an
    /// empty batch is reported as [`NetworkError::ShapeMismatch`].
    pub fn evaluate(
        &self,
        cards: Tensor<B, 4>,
        bets: Tensor<B, 2>,
        hand_state: Tensor<B, 2>,
        game_state: Tensor<B, 2>,
    ) -> Result<Evaluation<B>, NetworkError> {
        self.check_shapes(&cards, &bets, &hand_state, &game_state)?;
        Ok(self.forward(cards, bets, hand_state, game_state))
    }

    pub fn evaluate_batch(&self, batch: DecisionBatch<B>) -> Result<Evaluation<B>, NetworkError> {
        self.evaluate(batch.cards, batch.bets, batch.hand_state, batch.game_state)
    }

    /// Only reached through `evaluate`, after the shapes are checked.
    fn forward(
        &self,
        cards: Tensor<B, 4>,
        bets: Tensor<B, 2>,
        hand_state: Tensor<B, 2>,
        game_state: Tensor<B, 2>,
    ) -> Evaluation<B> {
        let fa = self.cards_branch.forward(cards);
        let fb = self.bets_branch.forward(bets);
        let fs = self.state_branch.fuse(hand_state, game_state);
        let shared = self.trunk.forward(vec![fa, fb, fs]);
        let (action_logits, value, next_hand_state, next_game_state) = self.heads.forward(shared);
        Evaluation {
            action_logits,
            value,
            next_hand_state,
            next_game_state,
        }
    }

    fn check_shapes(
        &self,
        cards: &Tensor<B, 4>,
        bets: &Tensor<B, 2>,
        hand_state: &Tensor<B, 2>,
        game_state: &Tensor<B, 2>,
    ) -> Result<(), NetworkError> {
        let config = self.config();
        let batch = cards.dims()[0];
        if batch == 0 {
            return Err(NetworkError::shape(
                "cards",
                &[1, CARD_CHANNELS, CARD_ROWS, CARD_COLS],
                &cards.dims(),
            ));
        }
        expect_dims(
            "cards",
            &cards.dims(),
            &[batch, CARD_CHANNELS, CARD_ROWS, CARD_COLS],
        )?;
        expect_dims("bets", &bets.dims(), &[batch, config.bets_in_dim])?;
        expect_dims(
            "hand_state",
            &hand_state.dims(),
            &[batch, config.hand_state_dim],
        )?;
        expect_dims(
            "game_state",
            &game_state.dims(),
            &[batch, config.game_state_dim],
        )
    }
}

fn expect_dims(
    input: &'static str,
    actual: &[usize],
    expected: &[usize],
) -> Result<(), NetworkError> {
    if actual == expected {
        Ok(())
    } else {
        Err(NetworkError::shape(input, expected, actual))
    }
}
