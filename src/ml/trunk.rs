use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::tensor::Tensor;
use burn::tensor::activation::relu;
use burn::tensor::backend::Backend;

/// Projects the concatenated encoder outputs to the representation shared by all heads.
#[derive(Module, Debug)]
pub struct FusionTrunk<B: Backend> {
    expand: Linear<B>,
    mix: Linear<B>,
}

impl<B: Backend> FusionTrunk<B> {
    pub fn new(in_dim: usize, hidden_dim: usize, device: &B::Device) -> Self {
        Self {
            expand: LinearConfig::new(in_dim, hidden_dim).init(device),
            mix: LinearConfig::new(hidden_dim, hidden_dim).init(device),
        }
    }

    /// Concatenates `branches` along the feature axis and runs both layers.
    /// The output is left linear for the heads.
    pub fn forward(&self, branches: Vec<Tensor<B, 2>>) -> Tensor<B, 2> {
        let x = Tensor::cat(branches, 1);
        self.mix.forward(relu(self.expand.forward(x)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn concatenates_branches_before_projection() {
        let device = Default::default();
        let trunk = FusionTrunk::<TestBackend>::new(3 + 4 + 5, 16, &device);
        let branches = vec![
            Tensor::<TestBackend, 2>::ones([2, 3], &device),
            Tensor::<TestBackend, 2>::ones([2, 4], &device),
            Tensor::<TestBackend, 2>::ones([2, 5], &device),
        ];
        assert_eq!(trunk.forward(branches).dims(), [2, 16]);
    }
}
