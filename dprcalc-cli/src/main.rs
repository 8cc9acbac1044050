use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dprcalc::prelude::*;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Random seed for reproducibility
    #[arg(long, global = true, default_value = None)]
    seed: Option<u64>,

    /// Write the JSON result to this file instead of stdout
    #[arg(short, long, global = true, value_name = "FILE")]
    output: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Hit chance, crit chance and DPR from already-averaged damage
    Calc(CalcArgs),
    /// Hit chance, crit chance and DPR of an attack profile
    Profile(ProfileArgs),
    /// Monte Carlo estimate of an attack profile's DPR
    Simulate {
        #[command(flatten)]
        profile: ProfileArgs,

        /// Number of attacks to sample, clamped to 1000 - 200000
        #[arg(short, long, default_value_t = 10_000)]
        trials: i64,
    },
    /// Resolve a class kit with effects applied
    Kit {
        /// Kit id, e.g. fighter
        kit: String,

        #[arg(short, long, default_value_t = 5)]
        level: i64,

        /// Effect ids to apply, comma separated
        #[arg(short, long, value_delimiter = ',')]
        effects: Vec<String>,

        #[arg(long = "target-ac", default_value_t = 15)]
        target_ac: i64,

        /// Also simulate the resolved profile with this many trials
        #[arg(long, value_name = "TRIALS")]
        simulate: Option<i64>,
    },
    /// List the registered effects and kits
    Catalog,
    /// Expected DPR over a range of target ACs
    Sweep(ProfileArgs),
}

#[derive(clap::Args, Debug)]
struct CalcArgs {
    #[arg(short, long, allow_negative_numbers = true)]
    attack_bonus: i32,

    #[arg(long = "target-ac")]
    target_ac: i32,

    #[arg(long, default_value_t = 20)]
    crit_range: i32,

    #[arg(long)]
    avg_on_hit: f64,

    #[arg(long)]
    avg_on_crit: f64,

    #[arg(long, default_value_t = false)]
    advantage: bool,

    #[arg(long, default_value_t = false)]
    disadvantage: bool,
}

#[derive(clap::Args, Debug)]
struct ProfileArgs {
    /// Attack profile JSON file
    #[arg(short, long, value_name = "FILE", conflicts_with_all = ["attack_bonus", "damage"])]
    file: Option<PathBuf>,

    #[arg(short, long, allow_negative_numbers = true, required_unless_present = "file")]
    attack_bonus: Option<i32>,

    #[arg(long = "target-ac", default_value_t = 15)]
    target_ac: i32,

    #[arg(long, default_value_t = 20)]
    crit_range: i32,

    /// Damage expression such as 2d6+3; repeat for more components
    #[arg(short, long, required_unless_present = "file")]
    damage: Vec<String>,

    /// Flat damage that is not doubled on a crit
    #[arg(long)]
    flat: Option<i32>,

    #[arg(long, default_value_t = false)]
    advantage: bool,

    #[arg(long, default_value_t = false)]
    disadvantage: bool,

    /// Profile tags, comma separated
    #[arg(long, value_delimiter = ',')]
    tags: Vec<String>,
}

impl ProfileArgs {
    fn load(&self) -> anyhow::Result<AttackProfile> {
        if let Some(path) = &self.file {
            log::info!("Loading attack profile from {}", path.display());
            let file = std::fs::File::open(path)?;
            let reader = std::io::BufReader::new(file);
            return Ok(serde_json::from_reader(reader)?);
        }

        let attack_bonus = self
            .attack_bonus
            .ok_or_else(|| anyhow::anyhow!("--attack-bonus is required without --file"))?;
        let mut damage = self
            .damage
            .iter()
            .map(|expr| Ok(DamageComponent::dice(parse_dice_expr(expr)?)))
            .collect::<Result<Vec<_>>>()?;
        if let Some(flat) = self.flat {
            damage.push(DamageComponent::flat(flat));
        }

        Ok(AttackProfile::new(attack_bonus, self.target_ac, damage)
            .with_crit_range(self.crit_range)
            .with_advantage(self.advantage)
            .with_disadvantage(self.disadvantage)
            .with_tags(self.tags.iter().cloned()))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KitReport {
    #[serde(flatten)]
    build: KitBuild,
    #[serde(skip_serializing_if = "Option::is_none")]
    simulation: Option<SimResult>,
}

#[derive(Serialize)]
struct CatalogReport {
    effects: Vec<EffectInfo>,
    kits: &'static [ClassKit],
}

fn write_output<T: Serialize>(value: &T, output: Option<&PathBuf>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            let writer = std::io::BufWriter::new(file);
            serde_json::to_writer_pretty(writer, value)?;
            log::info!("Results written to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout().lock();
            serde_json::to_writer_pretty(stdout, value)?;
            println!();
        }
    }
    Ok(())
}

fn run_simulation(trials: i64, profile: &AttackProfile, roller: &mut Roller) -> Result<SimResult> {
    let trials = clamp_trials(trials);
    log::info!("Running {} trials...", trials);
    let start = chrono::Utc::now();
    let result = simulate_profile(trials, profile, roller)?;
    let elapsed = chrono::Utc::now() - start;
    log::info!(
        "Simulation complete: {} trials in {} ms",
        trials,
        elapsed.num_milliseconds()
    );
    Ok(result)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level = match args.verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::builder()
        .format_timestamp_secs()
        .filter_level(level)
        .parse_default_env()
        .init();
    log::debug!("Args: {:?}", args);

    let mut roller = match args.seed {
        Some(seed) => Roller::from_seed(seed),
        None => Roller::new(),
    };
    let output = args.output.as_ref();

    match &args.command {
        Command::Calc(calc) => {
            let input = CalcInput::new(
                calc.attack_bonus,
                calc.target_ac,
                calc.avg_on_hit,
                calc.avg_on_crit,
            )
            .with_crit_range(calc.crit_range)
            .with_advantage(calc.advantage)
            .with_disadvantage(calc.disadvantage);
            write_output(&calculate(&input)?, output)?;
        }
        Command::Profile(profile) => {
            let profile = profile.load()?;
            write_output(&calculate_profile(&profile)?, output)?;
        }
        Command::Simulate { profile, trials } => {
            let profile = profile.load()?;
            let result = run_simulation(*trials, &profile, &mut roller)?;
            write_output(&result, output)?;
        }
        Command::Kit {
            kit,
            level,
            effects,
            target_ac,
            simulate: sim_trials,
        } => {
            let build = build_from_kit(kit, *level, effects, *target_ac)?;
            log::info!(
                "Resolved {} at level {}: {:.3} DPR",
                kit,
                level,
                build.result.expected_damage
            );
            if build.requires_simulation && sim_trials.is_none() {
                log::info!("Applied effects are approximated analytically; consider --simulate");
            }
            let simulation = sim_trials
                .map(|trials| run_simulation(trials, &build.profile, &mut roller))
                .transpose()?;
            write_output(&KitReport { build, simulation }, output)?;
        }
        Command::Catalog => {
            let report = CatalogReport {
                effects: catalog::all().iter().map(Effect::info).collect(),
                kits: all_kits(),
            };
            write_output(&report, output)?;
        }
        Command::Sweep(profile) => {
            let profile = profile.load()?;
            write_output(&dpr_vs_ac(&profile)?, output)?;
        }
    }

    Ok(())
}
