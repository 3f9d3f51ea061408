//! Encoders fusing the recurrent hand and game state vectors.

use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::tensor::Tensor;
use burn::tensor::activation::relu;
use burn::tensor::backend::Backend;

use crate::config::{NetworkConfig, StateMode};

/// Shared `(hand, game) -> embedding` interface of the fusion variants.
pub trait StateFusion<B: Backend> {
    fn fuse(&self, hand: Tensor<B, 2>, game: Tensor<B, 2>) -> Tensor<B, 2>;
}

/// Linear, ReLU, linear. No activation on the output.
#[derive(Module, Debug)]
pub struct TwoLayer<B: Backend> {
    input: Linear<B>,
    output: Linear<B>,
}

impl<B: Backend> TwoLayer<B> {
    pub fn new(in_dim: usize, hidden_dim: usize, out_dim: usize, device: &B::Device) -> Self {
        Self {
            input: LinearConfig::new(in_dim, hidden_dim).init(device),
            output: LinearConfig::new(hidden_dim, out_dim).init(device),
        }
    }

    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        self.output.forward(relu(self.input.forward(x)))
    }
}

/// Concatenates hand and game up front and mixes them with a single transform.
#[derive(Module, Debug)]
pub struct SimpleStateFusion<B: Backend> {
    net: TwoLayer<B>,
}

impl<B: Backend> SimpleStateFusion<B> {
    pub fn new(
        hand_in_dim: usize,
        game_in_dim: usize,
        hidden_dim: usize,
        out_dim: usize,
        device: &B::Device,
    ) -> Self {
        Self {
            net: TwoLayer::new(hand_in_dim + game_in_dim, hidden_dim, out_dim, device),
        }
    }
}

impl<B: Backend> StateFusion<B> for SimpleStateFusion<B> {
    fn fuse(&self, hand: Tensor<B, 2>, game: Tensor<B, 2>) -> Tensor<B, 2> {
        self.net.forward(Tensor::cat(vec![hand, game], 1))
    }
}

/// Models hand and game separately, each through its own sub-network, then fuses
/// the two `hidden_dim` embeddings.
#[derive(Module, Debug)]
pub struct BranchedStateFusion<B: Backend> {
    hand_branch: TwoLayer<B>,
    game_branch: TwoLayer<B>,
    net: TwoLayer<B>,
}

impl<B: Backend> BranchedStateFusion<B> {
    pub fn new(
        hand_in_dim: usize,
        game_in_dim: usize,
        hidden_dim: usize,
        out_dim: usize,
        device: &B::Device,
    ) -> Self {
        Self {
            hand_branch: TwoLayer::new(hand_in_dim, hidden_dim, hidden_dim, device),
            game_branch: TwoLayer::new(game_in_dim, hidden_dim, hidden_dim, device),
            net: TwoLayer::new(hidden_dim * 2, hidden_dim, out_dim, device),
        }
    }
}

impl<B: Backend> StateFusion<B> for BranchedStateFusion<B> {
    fn fuse(&self, hand: Tensor<B, 2>, game: Tensor<B, 2>) -> Tensor<B, 2> {
        let fh = self.hand_branch.forward(hand);
        let fg = self.game_branch.forward(game);
        self.net.forward(Tensor::cat(vec![fh, fg], 1))
    }
}

/// The variant picked by [`StateMode`] when the network is built.
#[derive(Module, Debug)]
pub enum StateFusionEncoder<B: Backend> {
    Simple(SimpleStateFusion<B>),
    Branched(BranchedStateFusion<B>),
}

impl<B: Backend> StateFusionEncoder<B> {
    pub fn new(config: &NetworkConfig, device: &B::Device) -> Self {
        let (hand, game, hidden, out) = (
            config.hand_state_dim,
            config.game_state_dim,
            config.state_hidden_dim,
            config.state_out_dim,
        );
        match config.state_mode {
            StateMode::Simple => {
                Self::Simple(SimpleStateFusion::new(hand, game, hidden, out, device))
            }
            StateMode::Branched => {
                Self::Branched(BranchedStateFusion::new(hand, game, hidden, out, device))
            }
        }
    }

    pub fn mode(&self) -> StateMode {
        match self {
            Self::Simple(_) => StateMode::Simple,
            Self::Branched(_) => StateMode::Branched,
        }
    }
}

impl<B: Backend> StateFusion<B> for StateFusionEncoder<B> {
    fn fuse(&self, hand: Tensor<B, 2>, game: Tensor<B, 2>) -> Tensor<B, 2> {
        match self {
            Self::Simple(inner) => inner.fuse(hand, game),
            Self::Branched(inner) => inner.fuse(hand, game),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn both_variants_share_the_same_contract() {
        let device = Default::default();
        for mode in StateMode::ALL {
            let config = NetworkConfig::new()
                .with_hand_state_dim(6)
                .with_game_state_dim(9)
                .with_state_hidden_dim(12)
                .with_state_out_dim(5)
                .with_state_mode(mode);
            let encoder = StateFusionEncoder::<TestBackend>::new(&config, &device);
            assert_eq!(encoder.mode(), mode);
            let hand = Tensor::<TestBackend, 2>::ones([2, 6], &device);
            let game = Tensor::<TestBackend, 2>::ones([2, 9], &device);
            assert_eq!(encoder.fuse(hand, game).dims(), [2, 5]);
        }
    }

    #[test]
    fn branched_variant_allocates_more_parameters() {
        let device = Default::default();
        let simple = StateFusionEncoder::<TestBackend>::new(&NetworkConfig::new(), &device);
        let branched = StateFusionEncoder::<TestBackend>::new(
            &NetworkConfig::new().with_state_mode(StateMode::Branched),
            &device,
        );
        // simple: (64 + 1) * 64 + (64 + 1) * 32
        assert_eq!(simple.num_params(), 65 * 64 + 65 * 32);
        assert!(branched.num_params() > simple.num_params());
    }
}
