use std::error::Error;
use std::fs;
use std::path::PathBuf;

use burn::module::Module;
use burn_ndarray::NdArray;
use clap::Parser;

use pokernet::config::{
    DEFAULT_BETS_HIDDEN, DEFAULT_BETS_IN, DEFAULT_BETS_OUT, DEFAULT_CARDS_OUT, DEFAULT_GAME_STATE,
    DEFAULT_HAND_STATE, DEFAULT_STATE_HIDDEN, DEFAULT_STATE_OUT, DEFAULT_TRUNK_HIDDEN,
};
use pokernet::{NetworkCheckpoint, NetworkConfig, StateMode};

type InitBackend = NdArray<f32>;

#[derive(Parser, Debug)]
#[command(about = "Create a freshly initialized poker network checkpoint", version)]
struct InitArgs {
    /// Length of the betting feature vector.
    #[arg(long, default_value_t = DEFAULT_BETS_IN)]
    bets_in_dim: usize,
    /// Hidden width of the betting encoder.
    #[arg(long, default_value_t = DEFAULT_BETS_HIDDEN)]
    bets_hidden_dim: usize,
    /// Embedding width of the betting encoder.
    #[arg(long, default_value_t = DEFAULT_BETS_OUT)]
    bets_out_dim: usize,
    /// Embedding width of the card grid encoder.
    #[arg(long, default_value_t = DEFAULT_CARDS_OUT)]
    cards_out_dim: usize,
    /// Width of the recurrent hand state.
    #[arg(long, default_value_t = DEFAULT_HAND_STATE)]
    hand_state_dim: usize,
    /// Width of the recurrent game state.
    #[arg(long, default_value_t = DEFAULT_GAME_STATE)]
    game_state_dim: usize,
    /// Hidden width of the state fusion encoder.
    #[arg(long, default_value_t = DEFAULT_STATE_HIDDEN)]
    state_hidden_dim: usize,
    /// Embedding width of the state fusion encoder.
    #[arg(long, default_value_t = DEFAULT_STATE_OUT)]
    state_out_dim: usize,
    /// Width of the shared trunk.
    #[arg(long, default_value_t = DEFAULT_TRUNK_HIDDEN)]
    trunk_hidden_dim: usize,
    /// State fusion variant: simple or branched.
    #[arg(long, default_value_t = StateMode::Simple)]
    state_mode: StateMode,
    /// Where the checkpoint is written.
    #[arg(long, default_value = "checkpoints/pokernet.bin")]
    output: PathBuf,
}

impl InitArgs {
    fn config(&self) -> NetworkConfig {
        NetworkConfig::new()
            .with_bets_in_dim(self.bets_in_dim)
            .with_bets_hidden_dim(self.bets_hidden_dim)
            .with_bets_out_dim(self.bets_out_dim)
            .with_cards_out_dim(self.cards_out_dim)
            .with_hand_state_dim(self.hand_state_dim)
            .with_game_state_dim(self.game_state_dim)
            .with_state_hidden_dim(self.state_hidden_dim)
            .with_state_out_dim(self.state_out_dim)
            .with_trunk_hidden_dim(self.trunk_hidden_dim)
            .with_state_mode(self.state_mode)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = InitArgs::parse();
    let config = args.config();
    let device = Default::default();
    let net = config.init::<InitBackend>(&device)?;
    log::info!(
        "built {} network with {} parameters",
        net.state_mode(),
        net.num_params()
    );
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    NetworkCheckpoint::capture(&net)?.save(&args.output)?;
    Ok(())
}
