use arisan::application::engine::{ArisanService, RoundAdvance};
use arisan::config::GroupConfig;
use arisan::domain::group::{ContributionMode, TurnMethod};
use arisan::domain::member::NewMember;
use arisan::domain::ports::Stores;
use arisan::infrastructure::identity::{FixedClock, StaticIdentity};
use arisan::infrastructure::in_memory::in_memory_stores;
#[cfg(feature = "storage-rocksdb")]
use arisan::infrastructure::rocksdb::RocksDbStore;
use arisan::interfaces::csv::member_reader::MemberReader;
use arisan::interfaces::csv::round_writer::RoundWriter;
use arisan::interfaces::csv::schedule_writer::ScheduleWriter;
use arisan::logging::init_logger;
use chrono::Utc;
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing::info;

const CLI_USER: &str = "cli";
const CLI_EMAIL: &str = "cli@arisan.local";

#[derive(Parser)]
#[command(
    name = "arisan",
    author,
    version,
    about = "Rotating savings group bookkeeping",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log debug details to stderr
    #[arg(long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print the per-turn contribution schedule of a group as CSV
    Schedule {
        /// Group definition (TOML)
        config: PathBuf,
    },
    /// Run a group from its first round to completion and print the round ledger as CSV
    Simulate {
        /// Group definition (TOML)
        config: PathBuf,

        /// Member list CSV (name, phone, role, contribution); replaces the members in the config
        #[arg(long)]
        members: Option<PathBuf>,

        /// Draw the turn order before the first payout
        #[arg(long)]
        draw: bool,

        /// Seed for ids, invite codes and the draw
        #[arg(long)]
        seed: Option<u64>,

        /// Path to persistent database (optional). If provided, uses RocksDB.
        #[arg(long)]
        db_path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Command::Schedule { config } => schedule(config),
        Command::Simulate {
            config,
            members,
            draw,
            seed,
            db_path,
        } => simulate(config, members, draw, seed, db_path).await,
    }
}

fn schedule(config: PathBuf) -> Result<()> {
    let group = GroupConfig::from_file(config).into_diagnostic()?.group;
    let rows = group.schedule().into_diagnostic()?;

    if let ContributionMode::Declining(schedule) = &group.mode {
        let check = schedule.check(group.total_members).into_diagnostic()?;
        if !check.is_balanced() {
            eprintln!(
                "WARNING: schedule collects {} per round but the target is {} (difference {}, floored turns {:?}).",
                check.actual, check.expected, check.difference, check.floored_turns
            );
        }
    }

    let stdout = io::stdout();
    let mut writer = ScheduleWriter::new(stdout.lock());
    writer.write_schedule(&rows).into_diagnostic()?;
    Ok(())
}

fn open_stores(db_path: Option<PathBuf>) -> Result<Stores> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => Ok(RocksDbStore::open(path).into_diagnostic()?.stores()),
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            eprintln!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(in_memory_stores())
        }
        None => Ok(in_memory_stores()),
    }
}

async fn simulate(
    config: PathBuf,
    members: Option<PathBuf>,
    draw: bool,
    seed: Option<u64>,
    db_path: Option<PathBuf>,
) -> Result<()> {
    let GroupConfig {
        group: mut new_group,
        simulation,
    } = GroupConfig::from_file(config).into_diagnostic()?;

    if let Some(path) = members {
        let file = File::open(path).into_diagnostic()?;
        let mut listed = Vec::new();
        for member in MemberReader::new(file).members() {
            match member {
                Ok(member) => listed.push(member),
                Err(e) => eprintln!("Error reading member: {}", e),
            }
        }
        new_group.members = listed;
        new_group.validate().into_diagnostic()?;
    }
    let draw = draw || simulation.draw || new_group.turn_method == TurnMethod::Draw;
    let period = new_group.period;
    let listed = new_group.members.len().max(1) as u32;

    let identity = StaticIdentity::signed_in(CLI_USER, CLI_EMAIL);
    let clock = FixedClock::at(Utc::now());
    let mut service = ArisanService::new(
        open_stores(db_path)?,
        Box::new(identity.clone()),
        Box::new(clock.clone()),
    );
    if let Some(seed) = seed.or(simulation.seed) {
        service = service.with_seed(seed);
    }

    let group = service.create_group(new_group).await.into_diagnostic()?;

    // Open seats are filled through the invite code.
    for seat in listed + 1..=group.total_members {
        identity.sign_in(format!("guest-{seat}"), format!("guest{seat}@arisan.local"));
        service
            .join_group(&group.invite_code, NewMember::named(format!("Anggota {seat}")))
            .await
            .into_diagnostic()?;
    }
    identity.sign_in(CLI_USER, CLI_EMAIL);

    if draw {
        let record = service.draw_turn_order(&group.id).await.into_diagnostic()?;
        info!(draw_id = %record.id, "turn order drawn for simulation");
    }

    let members = service.members(&group.id).await.into_diagnostic()?;
    let mut round = 1;
    loop {
        for member in &members {
            service
                .confirm_payment(&group.id, &member.id, round)
                .await
                .into_diagnostic()?;
        }
        match service.advance_round(&group.id, false).await.into_diagnostic()? {
            RoundAdvance::Started(next) => {
                round = next.round_number;
                clock.advance(period.length());
            }
            RoundAdvance::Completed => break,
        }
    }
    info!(group_id = %group.id, rounds = round, "simulation finished");

    let mut rounds = service.round_history(&group.id).await.into_diagnostic()?;
    rounds.reverse();
    let stdout = io::stdout();
    let mut writer = RoundWriter::new(stdout.lock());
    writer.write_rounds(&rounds).into_diagnostic()?;
    Ok(())
}
