use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swiss_director::calculate::Standing;
use swiss_director::config::{AppConfig, OutcomeMode};
use swiss_director::director::{RoundSummary, TournamentDirector};
use swiss_director::models::{Player, PlayerId, Tournament, TournamentId, TournamentStatus};
use swiss_director::outcome::{OutcomeProvider, PromptOutcomes, RandomOutcomes};
use swiss_director::storage::{
    JsonFileRepository, PlayerRegistry, StorageConfig, TournamentRepository, TournamentSnapshot,
};

#[derive(Parser)]
#[command(name = "swiss-director")]
#[command(about = "Swiss-system chess tournament director")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the player registry
    Player {
        #[command(subcommand)]
        action: PlayerAction,
    },

    /// Create a tournament from registered players
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        place: String,

        /// Start date (dd-mm-yyyy)
        #[arg(long, value_parser = parse_date)]
        start: NaiveDate,

        /// End date (dd-mm-yyyy)
        #[arg(long, value_parser = parse_date)]
        end: NaiveDate,

        /// Number of rounds (default from config)
        #[arg(long)]
        rounds: Option<usize>,

        /// Director's note
        #[arg(long, default_value = "")]
        note: String,

        /// Comma-separated national chess IDs
        #[arg(long, value_delimiter = ',', value_parser = parse_player_id, required = true)]
        players: Vec<PlayerId>,
    },

    /// Play rounds of a tournament
    Play {
        /// Tournament ID
        #[arg(long)]
        tournament: String,

        /// Play at most this many rounds, then pause
        #[arg(long)]
        rounds: Option<usize>,

        /// Enter results by hand
        #[arg(long)]
        interactive: bool,

        /// Ask before each new round
        #[arg(long, conflicts_with = "interactive")]
        confirm: bool,

        /// Seed for reproducible pairings and results
        #[arg(long)]
        seed: Option<u64>,
    },

    /// List tournaments
    List {
        /// Only tournaments with rounds left to play
        #[arg(long)]
        unfinished: bool,
    },

    /// Show status of a tournament
    Status {
        #[arg(long)]
        tournament: String,
    },

    /// Show the leaderboard of a tournament
    Standings {
        #[arg(long)]
        tournament: String,
    },

    /// Full report: every round, every match, and the leaderboard
    Report {
        #[arg(long)]
        tournament: String,
    },
}

#[derive(Subcommand)]
enum PlayerAction {
    /// Register a new player
    Add {
        #[arg(long)]
        firstname: String,

        #[arg(long)]
        lastname: String,

        /// Birth date (dd-mm-yyyy)
        #[arg(long, value_parser = parse_date)]
        birth: NaiveDate,

        /// National chess ID, e.g. AB12345
        #[arg(long, value_parser = parse_player_id)]
        id: PlayerId,
    },

    /// List registered players alphabetically
    List,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%d-%m-%Y")
        .map_err(|_| format!("invalid date '{}' (expected dd-mm-yyyy)", s))
}

fn parse_player_id(s: &str) -> Result<PlayerId, String> {
    PlayerId::parse(s).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = dir;
    }
    let log_level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }

    tracing::debug!("Starting swiss-director v{}", env!("CARGO_PKG_VERSION"));

    let storage = config.storage();

    match cli.command {
        Commands::Player { action } => {
            let registry = PlayerRegistry::from_config(&storage);
            match action {
                PlayerAction::Add {
                    firstname,
                    lastname,
                    birth,
                    id,
                } => {
                    let player = Player::new(&firstname, &lastname, birth, id);
                    registry
                        .register(&player)
                        .context("Failed to register player")?;
                    println!("Registered {} ({})", player.full_name(), player.id);
                }
                PlayerAction::List => {
                    let players = registry.alphabetical().context("Failed to read players")?;
                    if players.is_empty() {
                        println!("No registered players.");
                    }
                    for p in players {
                        println!(
                            "{}  {:<20} {:<20} {}",
                            p.id,
                            p.lastname,
                            p.firstname,
                            p.birth.format("%d-%m-%Y")
                        );
                    }
                }
            }
        }

        Commands::Create {
            name,
            place,
            start,
            end,
            rounds,
            note,
            players,
        } => {
            if end < start {
                bail!("End date {} is before start date {}", end, start);
            }

            let registry = PlayerRegistry::from_config(&storage);
            let roster = registry
                .find_many(&players)
                .context("Unknown player in roster")?;
            let rounds = rounds.unwrap_or(config.tournament.rounds);

            let tournament = Tournament::new(&name, &place, start, end, rounds, roster)
                .context("Invalid tournament")?
                .with_director_note(&note);
            tournament
                .validate_roster()
                .context("Roster cannot be paired")?;

            let mut repository = JsonFileRepository::from_config(&storage);
            repository
                .create(&TournamentSnapshot::from(&tournament))
                .context("Failed to save tournament")?;

            println!(
                "Created {} ({} players, {} rounds): {}",
                tournament.name,
                tournament.players().len(),
                tournament.total_rounds(),
                tournament.id
            );
        }

        Commands::Play {
            tournament,
            rounds,
            interactive,
            confirm,
            seed,
        } => {
            let id = TournamentId::from(tournament.as_str());
            let repository = JsonFileRepository::from_config(&storage);
            let seed = seed.or(config.play.seed);
            let interactive = interactive || config.play.mode == OutcomeMode::Interactive;
            if interactive && confirm {
                bail!("--confirm cannot be combined with interactive result entry");
            }

            let outcomes: Box<dyn OutcomeProvider> = if interactive {
                Box::new(PromptOutcomes::new(io::stdin().lock(), io::stdout()))
            } else {
                match seed {
                    Some(s) => Box::new(RandomOutcomes::seeded(s.wrapping_add(1))),
                    None => Box::new(RandomOutcomes::from_entropy()),
                }
            };

            let mut director = TournamentDirector::open(&id, repository, outcomes)
                .with_context(|| format!("Failed to open tournament {}", id))?;
            if let Some(s) = seed {
                director = director.with_rng(StdRng::seed_from_u64(s));
            }

            let limit = rounds.unwrap_or(usize::MAX);
            if limit == 0 {
                bail!("--rounds must be at least 1");
            }

            let mut played = 0;
            let summaries = director.play_until(|summary| {
                print_round(summary);
                played += 1;
                if played >= limit || summary.status.status == TournamentStatus::Complete {
                    return false;
                }
                !confirm || ask_continue().unwrap_or(false)
            })?;

            if summaries.is_empty() {
                println!("{} is already complete.", director.tournament().name);
            }

            let status = director.tournament_status();
            println!(
                "{}: {} (round {}/{})",
                director.tournament().name,
                status.status,
                status.current_round,
                status.total_rounds
            );
            if director.tournament().is_complete() {
                println!();
                print_standings(director.current_standings());
            }
        }

        Commands::List { unfinished } => {
            let repository = JsonFileRepository::from_config(&storage);
            let snapshots = if unfinished {
                repository.find_unfinished()?
            } else {
                repository.list()?
            };

            if snapshots.is_empty() {
                println!("No tournaments.");
            }
            for s in snapshots {
                println!(
                    "{}  {:<30} {:<15} {}  round {}/{}",
                    s.id,
                    s.name,
                    s.place,
                    s.date_start.format("%d-%m-%Y"),
                    s.current_round,
                    s.rounds.len()
                );
            }
        }

        Commands::Status { tournament } => {
            let t = load_tournament(&storage, &tournament)?;
            let status = t.status_report();
            println!("{} ({}, {})", t.name, t.place, t.id);
            println!("Status: {}", status.status);
            println!("Rounds played: {}/{}", status.current_round, status.total_rounds);
        }

        Commands::Standings { tournament } => {
            let t = load_tournament(&storage, &tournament)?;
            print_standings(t.players_score());
        }

        Commands::Report { tournament } => {
            let t = load_tournament(&storage, &tournament)?;
            print_report(&t);
        }
    }

    Ok(())
}

fn load_tournament(storage: &StorageConfig, raw_id: &str) -> Result<Tournament> {
    let id = TournamentId::from(raw_id);
    let snapshot = JsonFileRepository::from_config(storage)
        .load(&id)
        .with_context(|| format!("Failed to load tournament {}", id))?;
    Tournament::try_from(snapshot).with_context(|| format!("Tournament {} is corrupt", id))
}

/// Ask the operator whether to play another round. Re-asks on anything
/// other than y/n; a closed input counts as "no".
fn ask_continue() -> Result<bool> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    loop {
        print!("Play the next round? [y/n] ");
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(false);
        }
        match line.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => println!("Please answer y or n."),
        }
    }
}

fn print_round(summary: &RoundSummary) {
    println!("== {} ==", summary.name);
    for game in &summary.matches {
        let [first, second] = game.sides();
        println!(
            "  {} {} - {} {}",
            first.player, first.points, second.points, second.player
        );
    }
}

fn print_standings(standings: &[Standing]) {
    println!("{:>3}  {:<8} {:<30} {:>5}", "#", "ID", "Player", "Pts");
    for (rank, s) in standings.iter().enumerate() {
        println!(
            "{:>3}  {:<8} {:<30} {:>5.1}",
            rank + 1,
            s.player,
            s.name,
            s.score
        );
    }
}

fn print_report(t: &Tournament) {
    println!("{}", t.name);
    println!(
        "{}, {} to {}",
        t.place,
        t.date_start.format("%d-%m-%Y"),
        t.date_end.format("%d-%m-%Y")
    );
    if !t.director_note.is_empty() {
        println!("Note: {}", t.director_note);
    }
    println!("Status: {}", t.status());

    let name_of = |id: &PlayerId| {
        t.player(id)
            .map(|p| p.full_name())
            .unwrap_or_else(|| id.to_string())
    };

    for round in t.rounds() {
        println!();
        match (round.start_time, round.end_time) {
            (Some(start), Some(end)) => println!(
                "== {} ({} - {}) ==",
                round.name,
                start.format("%d-%m-%Y %H:%M"),
                end.format("%H:%M")
            ),
            _ => println!("== {} (not played) ==", round.name),
        }
        for game in round.matches() {
            let [first, second] = game.sides();
            println!(
                "  {:<25} {:>3} - {:<3} {}",
                name_of(&first.player),
                first.points,
                second.points,
                name_of(&second.player)
            );
        }
    }

    println!();
    print_standings(t.players_score());
}
