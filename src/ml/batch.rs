use burn::tensor::backend::Backend;
use burn::tensor::{Tensor, TensorData};

use super::cards::{CARD_CELLS, CARD_CHANNELS, CARD_COLS, CARD_ROWS};
use crate::config::NetworkConfig;
use crate::error::NetworkError;

/// Betting decisions in the order the policy head emits logits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Fold,
    Call,
    Raise,
}

impl Action {
    pub const COUNT: usize = 3;
    pub const ALL: [Action; Self::COUNT] = [Action::Fold, Action::Call, Action::Raise];

    pub fn index(self) -> usize {
        match self {
            Action::Fold => 0,
            Action::Call => 1,
            Action::Raise => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// One decision point as flat buffers. `cards` is laid out `[channel][row][col]`.
#[derive(Clone, Debug, PartialEq)]
pub struct DecisionSample {
    pub cards: Vec<f32>,
    pub bets: Vec<f32>,
    pub hand_state: Vec<f32>,
    pub game_state: Vec<f32>,
}

impl DecisionSample {
    /// The opening turn: empty cards, no bets, zeroed recurrent state.
    pub fn zeros(config: &NetworkConfig) -> Self {
        Self {
            cards: vec![0.0; CARD_CELLS],
            bets: vec![0.0; config.bets_in_dim],
            hand_state: vec![0.0; config.hand_state_dim],
            game_state: vec![0.0; config.game_state_dim],
        }
    }

    /// Replace the recurrent state with what the previous evaluation produced.
    pub fn with_state(mut self, row: &DecisionRow) -> Self {
        self.hand_state = row.next_hand_state.clone();
        self.game_state = row.next_game_state.clone();
        self
    }
}

/// The four batched input tensors of one `evaluate` call.
#[derive(Clone, Debug)]
pub struct DecisionBatch<B: Backend> {
    pub cards: Tensor<B, 4>,
    pub bets: Tensor<B, 2>,
    pub hand_state: Tensor<B, 2>,
    pub game_state: Tensor<B, 2>,
}

impl<B: Backend> DecisionBatch<B> {
    pub fn new(
        cards: Tensor<B, 4>,
        bets: Tensor<B, 2>,
        hand_state: Tensor<B, 2>,
        game_state: Tensor<B, 2>,
    ) -> Self {
        Self {
            cards,
            bets,
            hand_state,
            game_state,
        }
    }

    pub fn zeros(batch: usize, config: &NetworkConfig, device: &B::Device) -> Self {
        Self {
            cards: Tensor::zeros([batch, CARD_CHANNELS, CARD_ROWS, CARD_COLS], device),
            bets: Tensor::zeros([batch, config.bets_in_dim], device),
            hand_state: Tensor::zeros([batch, config.hand_state_dim], device),
            game_state: Tensor::zeros([batch, config.game_state_dim], device),
        }
    }

    /// Stack samples into tensors, checking every buffer against `config`.
    pub fn from_samples(
        samples: &[DecisionSample],
        config: &NetworkConfig,
        device: &B::Device,
    ) -> Result<Self, NetworkError> {
        if samples.is_empty() {
            return Err(NetworkError::shape("batch", &[1], &[0]));
        }
        let batch = samples.len();
        let mut cards = Vec::with_capacity(batch * CARD_CELLS);
        let mut bets = Vec::with_capacity(batch * config.bets_in_dim);
        let mut hand = Vec::with_capacity(batch * config.hand_state_dim);
        let mut game = Vec::with_capacity(batch * config.game_state_dim);
        for sample in samples {
            check_len("cards", &sample.cards, CARD_CELLS)?;
            check_len("bets", &sample.bets, config.bets_in_dim)?;
            check_len("hand_state", &sample.hand_state, config.hand_state_dim)?;
            check_len("game_state", &sample.game_state, config.game_state_dim)?;
            cards.extend_from_slice(&sample.cards);
            bets.extend_from_slice(&sample.bets);
            hand.extend_from_slice(&sample.hand_state);
            game.extend_from_slice(&sample.game_state);
        }
        Ok(Self {
            cards: Tensor::from_data(
                TensorData::new(cards, [batch, CARD_CHANNELS, CARD_ROWS, CARD_COLS]),
                device,
            ),
            bets: Tensor::from_data(TensorData::new(bets, [batch, config.bets_in_dim]), device),
            hand_state: Tensor::from_data(
                TensorData::new(hand, [batch, config.hand_state_dim]),
                device,
            ),
            game_state: Tensor::from_data(
                TensorData::new(game, [batch, config.game_state_dim]),
                device,
            ),
        })
    }

    pub fn batch_size(&self) -> usize {
        self.cards.dims()[0]
    }
}

fn check_len(input: &'static str, values: &[f32], expected: usize) -> Result<(), NetworkError> {
    if values.len() == expected {
        Ok(())
    } else {
        Err(NetworkError::shape(input, &[expected], &[values.len()]))
    }
}

/// Outputs of one `evaluate` call.
#[derive(Clone, Debug)]
pub struct Evaluation<B: Backend> {
    /// `[B, 3]` unnormalized fold/call/raise scores.
    pub action_logits: Tensor<B, 2>,
    /// `[B, 1]`
    pub value: Tensor<B, 2>,
    /// `[B, hand_state_dim]`, every component in (-1, 1).
    pub next_hand_state: Tensor<B, 2>,
    /// `[B, game_state_dim]`, every component in (-1, 1).
    pub next_game_state: Tensor<B, 2>,
}

/// A single row of an [`Evaluation`] copied out to host memory.
#[derive(Clone, Debug, PartialEq)]
pub struct DecisionRow {
    pub action_logits: [f32; Action::COUNT],
    pub value: f32,
    pub next_hand_state: Vec<f32>,
    pub next_game_state: Vec<f32>,
}

impl DecisionRow {
    /// Highest-scoring action. Ties resolve to the earliest action.
    pub fn greedy_action(&self) -> Action {
        let mut best = 0;
        for (index, logit) in self.action_logits.iter().enumerate() {
            if *logit > self.action_logits[best] {
                best = index;
            }
        }
        Action::ALL[best]
    }
}

impl<B: Backend> Evaluation<B> {
    pub fn batch_size(&self) -> usize {
        self.action_logits.dims()[0]
    }

    /// Feed the produced state back as the next turn's recurrent input.
    pub fn into_next_state(self) -> (Tensor<B, 2>, Tensor<B, 2>) {
        (self.next_hand_state, self.next_game_state)
    }

    /// Copy every row back to host memory.
    pub fn to_rows(&self) -> Result<Vec<DecisionRow>, NetworkError> {
        let batch = self.batch_size();
        let hand_dim = self.next_hand_state.dims()[1];
        let game_dim = self.next_game_state.dims()[1];
        let logits = host_values("action_logits", &self.action_logits)?;
        let values = host_values("value", &self.value)?;
        let hand = host_values("next_hand_state", &self.next_hand_state)?;
        let game = host_values("next_game_state", &self.next_game_state)?;
        let rows = (0..batch)
            .map(|row| {
                let mut action_logits = [0.0; Action::COUNT];
                action_logits
                    .copy_from_slice(&logits[row * Action::COUNT..(row + 1) * Action::COUNT]);
                DecisionRow {
                    action_logits,
                    value: values[row],
                    next_hand_state: hand[row * hand_dim..(row + 1) * hand_dim].to_vec(),
                    next_game_state: game[row * game_dim..(row + 1) * game_dim].to_vec(),
                }
            })
            .collect();
        Ok(rows)
    }
}

fn host_values<B: Backend>(
    output: &'static str,
    tensor: &Tensor<B, 2>,
) -> Result<Vec<f32>, NetworkError> {
    let expected: usize = tensor.dims().iter().product();
    let values = read_f32(output, tensor.clone().into_data().convert::<f32>())?;
    if values.len() != expected {
        return Err(NetworkError::shape(output, &[expected], &[values.len()]));
    }
    Ok(values)
}

fn read_f32(output: &'static str, data: TensorData) -> Result<Vec<f32>, NetworkError> {
    data.to_vec::<f32>()
        .map_err(|err| NetworkError::Readback(format!("{output}: {err:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn action_indices_follow_logit_order() {
        for (index, action) in Action::ALL.iter().enumerate() {
            assert_eq!(action.index(), index);
            assert_eq!(Action::from_index(index), Some(*action));
        }
        assert_eq!(Action::from_index(Action::COUNT), None);
    }

    #[test]
    fn from_samples_stacks_rows() {
        let device = Default::default();
        let config = NetworkConfig::new().with_bets_in_dim(5);
        let mut sample = DecisionSample::zeros(&config);
        sample.bets[4] = 2.0;
        let batch =
            DecisionBatch::<TestBackend>::from_samples(&[sample.clone(), sample], &config, &device)
                .expect("valid samples");
        assert_eq!(batch.batch_size(), 2);
        assert_eq!(batch.cards.dims(), [2, 4, 4, 13]);
        assert_eq!(batch.bets.dims(), [2, 5]);
        let bets = batch.bets.into_data().to_vec::<f32>().expect("vec");
        assert_eq!(bets[4], 2.0);
        assert_eq!(bets[9], 2.0);
    }

    #[test]
    fn from_samples_rejects_wrong_buffer_length() {
        let device = Default::default();
        let config = NetworkConfig::new();
        let mut sample = DecisionSample::zeros(&config);
        sample.hand_state.pop();
        let err = DecisionBatch::<TestBackend>::from_samples(&[sample], &config, &device)
            .unwrap_err();
        assert_eq!(
            err,
            NetworkError::ShapeMismatch {
                input: "hand_state",
                expected: vec![config.hand_state_dim],
                actual: vec![config.hand_state_dim - 1],
            }
        );
    }

    #[test]
    fn from_samples_rejects_empty_slice() {
        let device = Default::default();
        let result =
            DecisionBatch::<TestBackend>::from_samples(&[], &NetworkConfig::new(), &device);
        assert!(matches!(result, Err(NetworkError::ShapeMismatch { .. })));
    }

    #[test]
    fn to_rows_splits_outputs_per_row() {
        let device = Default::default();
        let evaluation = Evaluation::<TestBackend> {
            action_logits: Tensor::from_data(
                TensorData::new(vec![0.0f32, 1.0, 2.0, 3.0, 4.0, 5.0], [2, 3]),
                &device,
            ),
            value: Tensor::from_data(TensorData::new(vec![7.0f32, 8.0], [2, 1]), &device),
            next_hand_state: Tensor::from_data(
                TensorData::new(vec![0.1f32, 0.2, 0.3, 0.4], [2, 2]),
                &device,
            ),
            next_game_state: Tensor::zeros([2, 1], &device),
        };
        let rows = evaluation.to_rows().expect("readable outputs");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].action_logits, [3.0, 4.0, 5.0]);
        assert_eq!(rows[1].value, 8.0);
        assert_eq!(rows[1].next_hand_state, vec![0.3, 0.4]);
        assert_eq!(rows[0].next_game_state, vec![0.0]);
    }

    #[test]
    fn unreadable_output_is_reported_not_swallowed() {
        let data = TensorData::new(vec![1i32, 2, 3], [3]);
        let err = read_f32("value", data).unwrap_err();
        assert!(matches!(err, NetworkError::Readback(ref msg) if msg.starts_with("value")));
    }

    #[test]
    fn greedy_action_prefers_highest_logit() {
        let row = DecisionRow {
            action_logits: [0.1, -2.0, 0.7],
            value: 0.0,
            next_hand_state: vec![],
            next_game_state: vec![],
        };
        assert_eq!(row.greedy_action(), Action::Raise);
    }
}
