use std::fs;
use std::path::Path;

use burn::module::{Module, ModuleVisitor, Param};
use burn::record::{BinBytesRecorder, FullPrecisionSettings, Recorder};
use burn::tensor::Tensor;
use burn::tensor::backend::Backend;
use serde::{Deserialize, Serialize};

use crate::config::NetworkConfig;
use crate::error::CheckpointError;
use crate::ml::PokerNet;

type NetRecord<B> = <PokerNet<B> as Module<B>>::Record;

/// Construction record plus recorded parameters, enough to rebuild a network.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NetworkCheckpoint {
    pub config: NetworkConfig,
    pub weights: Vec<u8>,
}

impl NetworkCheckpoint {
    pub fn capture<B: Backend>(net: &PokerNet<B>) -> Result<Self, CheckpointError> {
        let record: NetRecord<B> = net.clone().into_record();
        let weights = BinBytesRecorder::<FullPrecisionSettings>::new().record(record, ())?;
        Ok(Self {
            config: *net.config(),
            weights,
        })
    }

    /// Rebuild the network from the stored config, then load the weights into it.
    /// Every loaded parameter must have the shape the config allocates.
    pub fn restore<B: Backend>(&self, device: &B::Device) -> Result<PokerNet<B>, CheckpointError> {
        let net = self.config.init::<B>(device)?;
        let expected = param_shapes(&net);
        let record = BinBytesRecorder::<FullPrecisionSettings>::new()
            .load::<NetRecord<B>>(self.weights.clone(), device)?;
        let net = net.load_record(record);
        let actual = param_shapes(&net);
        if expected.len() != actual.len() {
            return Err(CheckpointError::ParameterCount {
                expected: expected.len(),
                actual: actual.len(),
            });
        }
        let mismatch = expected
            .into_iter()
            .zip(actual)
            .enumerate()
            .find(|(_, (expected, actual))| expected != actual);
        if let Some((index, (expected, actual))) = mismatch {
            return Err(CheckpointError::ParameterShape {
                index,
                expected,
                actual,
            });
        }
        Ok(net)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        Ok(bincode::serde::encode_to_vec(self, bincode::config::standard())?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let (checkpoint, _): (Self, usize) =
            bincode::serde::decode_from_slice(bytes, bincode::config::standard())?;
        Ok(checkpoint)
    }

    pub fn save(&self, path: &Path) -> Result<(), CheckpointError> {
        let bytes = self.to_bytes()?;
        fs::write(path, bytes)?;
        log::info!("saved checkpoint -> {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, CheckpointError> {
        let bytes = fs::read(path)?;
        let checkpoint = Self::from_bytes(&bytes)?;
        log::info!(
            "loaded checkpoint <- {} (state_mode={})",
            path.display(),
            checkpoint.config.state_mode
        );
        Ok(checkpoint)
    }
}

/// Collects parameter shapes in visiting order.
struct ParamShapes(Vec<Vec<usize>>);

impl<B: Backend> ModuleVisitor<B> for ParamShapes {
    fn visit_float<const D: usize>(&mut self, param: &Param<Tensor<B, D>>) {
        self.0.push(param.lazy_shape().dims);
    }
}

fn param_shapes<B: Backend>(net: &PokerNet<B>) -> Vec<Vec<usize>> {
    let mut shapes = ParamShapes(Vec::new());
    net.visit(&mut shapes);
    shapes.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StateMode;
    use crate::error::NetworkError;
    use crate::ml::DecisionBatch;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn restored_network_reproduces_outputs() {
        let device = Default::default();
        let config = NetworkConfig::new()
            .with_bets_in_dim(16)
            .with_trunk_hidden_dim(24)
            .with_state_mode(StateMode::Branched);
        let net = config.init::<TestBackend>(&device).expect("valid config");
        let bytes = NetworkCheckpoint::capture(&net)
            .and_then(|ckpt| ckpt.to_bytes())
            .expect("encode checkpoint");
        let restored = NetworkCheckpoint::from_bytes(&bytes)
            .and_then(|ckpt| ckpt.restore::<TestBackend>(&device))
            .expect("restore checkpoint");
        assert_eq!(restored.config(), &config);

        let batch = DecisionBatch::<TestBackend>::zeros(2, &config, &device);
        let before = net
            .evaluate_batch(batch.clone())
            .and_then(|out| out.to_rows())
            .expect("evaluate");
        let after = restored
            .evaluate_batch(batch)
            .and_then(|out| out.to_rows())
            .expect("evaluate");
        assert_eq!(before, after);
    }

    #[test]
    fn restoring_invalid_config_fails() {
        let device = Default::default();
        let checkpoint = NetworkCheckpoint {
            config: NetworkConfig::new().with_cards_out_dim(0),
            weights: Vec::new(),
        };
        let err = checkpoint.restore::<TestBackend>(&device).unwrap_err();
        assert!(matches!(
            err,
            CheckpointError::Network(NetworkError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn weights_from_another_config_are_rejected() {
        let device = Default::default();
        let wide = NetworkConfig::new().with_bets_in_dim(40);
        let narrow = NetworkConfig::new().with_bets_in_dim(16);
        let net = wide.init::<TestBackend>(&device).expect("valid config");
        let mut checkpoint = NetworkCheckpoint::capture(&net).expect("capture");
        checkpoint.config = narrow;
        let err = checkpoint.restore::<TestBackend>(&device).unwrap_err();
        match err {
            CheckpointError::ParameterShape {
                expected, actual, ..
            } => {
                assert!(expected.contains(&16));
                assert!(actual.contains(&40));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
