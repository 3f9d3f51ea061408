use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::tensor::Tensor;
use burn::tensor::activation::relu;
use burn::tensor::backend::Backend;

/// Two-layer encoder for the flat betting vector. Its output is rectified, so never negative.
#[derive(Module, Debug)]
pub struct BettingEncoder<B: Backend> {
    hidden: Linear<B>,
    output: Linear<B>,
}

impl<B: Backend> BettingEncoder<B> {
    pub fn new(in_dim: usize, hidden_dim: usize, out_dim: usize, device: &B::Device) -> Self {
        Self {
            hidden: LinearConfig::new(in_dim, hidden_dim).init(device),
            output: LinearConfig::new(hidden_dim, out_dim).init(device),
        }
    }

    pub fn forward(&self, bets: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.hidden.forward(bets));
        relu(self.output.forward(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn output_is_non_negative() {
        let device = Default::default();
        let encoder = BettingEncoder::<TestBackend>::new(10, 8, 4, &device);
        let bets = Tensor::<TestBackend, 2>::random(
            [5, 10],
            burn::tensor::Distribution::Uniform(-3.0, 3.0),
            &device,
        );
        let out = encoder.forward(bets);
        assert_eq!(out.dims(), [5, 4]);
        let values = out.into_data().to_vec::<f32>().expect("vec");
        assert!(values.iter().all(|v| *v >= 0.0));
    }
}
