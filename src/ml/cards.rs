use burn::module::Module;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig};
use burn::nn::{Linear, LinearConfig, PaddingConfig2d};
use burn::tensor::Tensor;
use burn::tensor::activation::relu;
use burn::tensor::backend::Backend;

/// Input planes of the card grid.
pub const CARD_CHANNELS: usize = 4;
pub const CARD_ROWS: usize = 4;
pub const CARD_COLS: usize = 13;
pub const CARD_CELLS: usize = CARD_CHANNELS * CARD_ROWS * CARD_COLS;

const CONV1_CHANNELS: usize = 16;
const CONV2_CHANNELS: usize = 32;
const KERNEL: usize = 3;

/// Convolutional encoder for the `[B, 4, 4, 13]` card grid.
///
/// Two same-padded 3x3 convolutions keep the 4x13 grid intact, then a global
/// average pool reduces each of the 32 feature maps to one value before the
/// final projection.
#[derive(Module, Debug)]
pub struct CardGridEncoder<B: Backend> {
    conv1: Conv2d<B>,
    conv2: Conv2d<B>,
    pool: AdaptiveAvgPool2d,
    proj: Linear<B>,
}

impl<B: Backend> CardGridEncoder<B> {
    pub fn new(out_dim: usize, device: &B::Device) -> Self {
        let conv1 = Conv2dConfig::new([CARD_CHANNELS, CONV1_CHANNELS], [KERNEL, KERNEL])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init(device);
        let conv2 = Conv2dConfig::new([CONV1_CHANNELS, CONV2_CHANNELS], [KERNEL, KERNEL])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init(device);
        let pool = AdaptiveAvgPool2dConfig::new([1, 1]).init();
        let proj = LinearConfig::new(CONV2_CHANNELS, out_dim).init(device);
        Self {
            conv1,
            conv2,
            pool,
            proj,
        }
    }

    /// `[B, 4, 4, 13]` -> `[B, out_dim]`.
    pub fn forward(&self, cards: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = relu(self.conv1.forward(cards));
        let x = relu(self.conv2.forward(x));
        let pooled = self.pool.forward(x).flatten::<2>(1, 3);
        self.proj.forward(pooled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn forward_collapses_grid_to_embedding() {
        let device = Default::default();
        let encoder = CardGridEncoder::<TestBackend>::new(64, &device);
        let cards =
            Tensor::<TestBackend, 4>::ones([3, CARD_CHANNELS, CARD_ROWS, CARD_COLS], &device);
        let out = encoder.forward(cards);
        assert_eq!(out.dims(), [3, 64]);
    }

    #[test]
    fn empty_grid_yields_finite_embedding() {
        let device = Default::default();
        let encoder = CardGridEncoder::<TestBackend>::new(16, &device);
        let cards =
            Tensor::<TestBackend, 4>::zeros([1, CARD_CHANNELS, CARD_ROWS, CARD_COLS], &device);
        let values = encoder.forward(cards).into_data().to_vec::<f32>().expect("vec");
        assert_eq!(values.len(), 16);
        assert!(values.iter().all(|v| v.is_finite()));
    }
}
