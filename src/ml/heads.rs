use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::tensor::Tensor;
use burn::tensor::activation::tanh;
use burn::tensor::backend::Backend;

use super::batch::Action;

/// Largest magnitude a recurrent state component may take.
/// `tanh` rounds to exactly ±1 in single precision for inputs beyond roughly ±9.
pub const STATE_BOUND: f32 = 1.0 - f32::EPSILON;

/// Four independent projections of the trunk representation.
#[derive(Module, Debug)]
pub struct OutputHeads<B: Backend> {
    policy: Linear<B>,
    value: Linear<B>,
    hand_state: Linear<B>,
    game_state: Linear<B>,
}

/// Raw head outputs: `(action_logits, value, next_hand_state, next_game_state)`.
pub type HeadOutputs<B> = (Tensor<B, 2>, Tensor<B, 2>, Tensor<B, 2>, Tensor<B, 2>);

impl<B: Backend> OutputHeads<B> {
    pub fn new(
        trunk_dim: usize,
        hand_state_dim: usize,
        game_state_dim: usize,
        device: &B::Device,
    ) -> Self {
        Self {
            policy: LinearConfig::new(trunk_dim, Action::COUNT).init(device),
            value: LinearConfig::new(trunk_dim, 1).init(device),
            hand_state: LinearConfig::new(trunk_dim, hand_state_dim).init(device),
            game_state: LinearConfig::new(trunk_dim, game_state_dim).init(device),
        }
    }

    pub fn forward(&self, shared: Tensor<B, 2>) -> HeadOutputs<B> {
        let logits = self.policy.forward(shared.clone());
        let value = self.value.forward(shared.clone());
        let hand = bounded(self.hand_state.forward(shared.clone()));
        let game = bounded(self.game_state.forward(shared));
        (logits, value, hand, game)
    }
}

fn bounded<B: Backend>(x: Tensor<B, 2>) -> Tensor<B, 2> {
    tanh(x).clamp(-STATE_BOUND, STATE_BOUND)
}
