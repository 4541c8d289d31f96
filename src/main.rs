//! Hollowdeep demo binary
//!
//! Runs a short scripted encounter: two hired blades against a warden in
//! the settlement of Hearthfall, then prints the chronicle as prose.

use clap::Parser;
use std::path::PathBuf;

use hollowdeep::abilities::{AbilityBook, TemplateBook};
use hollowdeep::actor::registry::ActorSpawn;
use hollowdeep::actor::CombatStats;
use hollowdeep::chronicle::NarrativeGenerator;
use hollowdeep::combat::{ActionResult, RollMode};
use hollowdeep::core::config::EngineConfig;
use hollowdeep::core::error::Result;
use hollowdeep::core::types::{GridPos, NodeId};
use hollowdeep::equilibrium::RetirementCause;
use hollowdeep::session::SimulationSession;

const DEFAULT_ABILITIES: &str = include_str!("../data/abilities.toml");
const DEFAULT_ACTORS: &str = include_str!("../data/actors.toml");

#[derive(Parser, Debug)]
#[command(name = "hollowdeep", about = "Turn-based social-ecology simulation demo")]
struct Args {
    /// RNG seed for a reproducible encounter
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Maximum simulation ticks before the demo stops
    #[arg(long, default_value_t = 200)]
    ticks: u64,

    /// Engine config TOML; the built-in standard config when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ability catalog TOML; the bundled catalog when omitted
    #[arg(long)]
    abilities: Option<PathBuf>,

    /// Actor template TOML; the bundled roster when omitted
    #[arg(long)]
    actors: Option<PathBuf>,

    /// Chronicle output path
    #[arg(long, default_value = "sessions/chronicle.jsonl")]
    chronicle: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hollowdeep=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::standard(),
    };
    let abilities = match &args.abilities {
        Some(path) => AbilityBook::load(path)?,
        None => AbilityBook::from_toml(DEFAULT_ABILITIES)?,
    };
    let templates = match &args.actors {
        Some(path) => TemplateBook::load(path)?,
        None => TemplateBook::from_toml(DEFAULT_ACTORS)?,
    };

    let session =
        SimulationSession::new(config, &args.chronicle, abilities, true, args.seed)?;

    let hearthfall = NodeId(0);
    session.add_settlement(hearthfall, "Hearthfall");

    // the player character is bespoke; the rest of the cast comes from
    // the template roster
    let ash = session.spawn_actor(
        ActorSpawn {
            name: "Ash".to_string(),
            archetype: "Skirmisher".to_string(),
            is_player: true,
            max_hp: 16,
            stats: CombatStats { attack: 3, defense: 2, damage_bonus: 1 },
            speed: 10.0,
            node: Some(hearthfall),
        },
        GridPos::new(0, 0),
    );
    let _bren = session.spawn_from_template(
        &templates,
        "hired_blade",
        GridPos::new(1, 0),
        Some(hearthfall),
    )?;
    let warden = session.spawn_from_template(
        &templates,
        "gate_warden",
        GridPos::new(3, 0),
        Some(hearthfall),
    )?;

    let migrated = session.open_session()?;
    tracing::info!(nodes = migrated.len(), "session opened");

    'encounter: for _ in 0..args.ticks {
        for actor in session.tick() {
            session.begin_turn(actor)?;
            let foe = if actor == warden { ash } else { warden };
            if session.registry().borrow().get(foe)?.is_active() {
                if let ActionResult::Rejected(reason) =
                    session.act(actor, "strike", Some(foe), RollMode::Normal)?
                {
                    tracing::debug!(%reason, "action rejected");
                }
            }
            session.end_turn(actor)?;

            let warden_down = !session.registry().borrow().get(warden)?.is_active();
            if warden_down {
                session.retire(warden, RetirementCause::Death)?;
                break 'encounter;
            }
        }
    }

    session.close_session()?;

    println!("\n=== Chronicle of Hearthfall ===");
    for line in NarrativeGenerator::render_all(&session.chronicle().all_entries()?) {
        println!("{line}");
    }
    Ok(())
}
