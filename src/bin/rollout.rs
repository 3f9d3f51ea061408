use std::error::Error;
use std::path::PathBuf;

use burn::backend::Wgpu;
use burn::backend::wgpu::WgpuDevice;
use burn::tensor::backend::Backend;
use burn_ndarray::{NdArray, NdArrayDevice};
use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pokernet::{
    CARD_CELLS, DecisionBatch, DecisionRow, DecisionSample, NetworkCheckpoint, NetworkConfig,
    PokerNet, StateMode,
};

const DEFAULT_SEED: u64 = 0xCA4D_5EED_F00D;

#[derive(Parser, Debug)]
#[command(
    about = "Run consecutive decision turns, feeding the recurrent state back in",
    version
)]
struct RolloutArgs {
    /// Checkpoint to evaluate. A fresh network is built when omitted.
    #[arg(long)]
    checkpoint: Option<PathBuf>,
    /// State fusion variant for a fresh network.
    #[arg(long, default_value_t = StateMode::Simple)]
    state_mode: StateMode,
    /// Number of parallel tables in the batch.
    #[arg(long, default_value_t = 2)]
    batch: usize,
    /// Number of consecutive turns per table.
    #[arg(long, default_value_t = 4)]
    turns: usize,
    /// Expected number of occupied cells in each card grid.
    #[arg(long, default_value_t = 7)]
    cards_shown: usize,
    /// Seed for the synthetic turn inputs.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    #[arg(long, value_enum, default_value_t = BackendKind::Ndarray)]
    backend: BackendKind,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum BackendKind {
    Ndarray,
    Wgpu,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = RolloutArgs::parse();
    if args.batch == 0 {
        return Err("batch must be positive".into());
    }
    match args.backend {
        BackendKind::Ndarray => rollout::<NdArray<f32>>(&args, &NdArrayDevice::default()),
        BackendKind::Wgpu => rollout::<Wgpu>(&args, &WgpuDevice::default()),
    }
}

fn rollout<B: Backend>(args: &RolloutArgs, device: &B::Device) -> Result<(), Box<dyn Error>> {
    let net: PokerNet<B> = match &args.checkpoint {
        Some(path) => NetworkCheckpoint::load(path)?.restore(device)?,
        None => NetworkConfig::new()
            .with_state_mode(args.state_mode)
            .init(device)?,
    };
    let config = *net.config();
    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut samples: Vec<DecisionSample> = (0..args.batch)
        .map(|_| DecisionSample::zeros(&config))
        .collect();

    println!(
        "Rolling out {} turns for {} tables ({} state fusion).",
        args.turns,
        args.batch,
        net.state_mode()
    );
    for turn in 0..args.turns {
        for sample in samples.iter_mut() {
            randomize_observation(sample, args.cards_shown, &mut rng);
        }
        let batch = DecisionBatch::<B>::from_samples(&samples, &config, device)?;
        let rows = net.evaluate_batch(batch)?.to_rows()?;
        for (table, row) in rows.iter().enumerate() {
            println!(
                "turn {:>3} | table {:>2} | logits [{:>8.4}, {:>8.4}, {:>8.4}] -> {:?} | value {:>8.4} | state norm {:.4}",
                turn + 1,
                table,
                row.action_logits[0],
                row.action_logits[1],
                row.action_logits[2],
                row.greedy_action(),
                row.value,
                state_norm(row),
            );
        }
        samples = samples
            .into_iter()
            .zip(rows.iter())
            .map(|(sample, row)| sample.with_state(row))
            .collect();
    }
    Ok(())
}

fn randomize_observation(sample: &mut DecisionSample, cards_shown: usize, rng: &mut StdRng) {
    let density = (cards_shown as f64 / CARD_CELLS as f64).clamp(0.0, 1.0);
    for cell in sample.cards.iter_mut() {
        *cell = if rng.gen_bool(density) { 1.0 } else { 0.0 };
    }
    for bet in sample.bets.iter_mut() {
        *bet = rng.gen_range(0.0..1.0);
    }
}

fn state_norm(row: &DecisionRow) -> f32 {
    row.next_hand_state
        .iter()
        .chain(row.next_game_state.iter())
        .map(|v| v * v)
        .sum::<f32>()
        .sqrt()
}
