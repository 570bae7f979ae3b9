use anyhow::{Result, bail};
use clap::Parser;
use game_core::{AdvanceStopReason, DangerPolicy, Difficulty, Game, GameConfig};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// Number of consecutive seeds to simulate
    #[arg(short, long, default_value_t = 50)]
    runs: u64,
    #[arg(short, long, default_value_t = 2000)]
    ticks: u64,
}

fn choose<T: Clone>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    let p = rng.next_u64() as usize % slice.len();
    slice[p].clone()
}

fn check_invariants(game: &Game, seed: u64) -> Result<()> {
    let world = game.world();
    for (id, avatar) in &world.avatars {
        if !world.grid.in_bounds(avatar.pos) {
            bail!("Invariant failed: avatar {id:?} out of bounds on seed {seed}");
        }
        let on_hazard = world.hazards.values().any(|hazard| hazard.pos == avatar.pos);
        if on_hazard && !avatar.is_invulnerable() {
            bail!("Invariant failed: avatar {id:?} shares a cell with a hazard on seed {seed}");
        }
    }
    if let Some(focus) = game.focus()
        && !world.avatars.contains_key(focus)
    {
        bail!("Invariant failed: focus on removed avatar on seed {seed}");
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    println!("Starting fuzz harness over {} seeds from {}...", args.runs, args.seed);
    for seed in args.seed..args.seed + args.runs {
        let mut config = GameConfig {
            difficulty: choose(&mut rng, &[Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]),
            max_ticks: args.ticks,
            ..GameConfig::default()
        };
        config.autopilot.danger_policy =
            choose(&mut rng, &[DangerPolicy::Hold, DangerPolicy::Sidestep]);
        let mut game = Game::new(seed, &config)?;

        loop {
            let result = game.advance(10);
            check_invariants(&game, seed)?;
            if let AdvanceStopReason::Finished(outcome) = result.stop_reason {
                println!(
                    "seed {seed}: {:?} {:?} -> {outcome:?} after {} ticks",
                    config.difficulty,
                    config.autopilot.danger_policy,
                    game.current_tick()
                );
                break;
            }
        }
    }

    println!("Fuzzing completed successfully.");
    Ok(())
}
