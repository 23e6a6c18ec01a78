use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use beopardy_stats::api::{build_router, state::AppState};
use beopardy_stats::calculate::leaderboard::{leaderboard, LeaderboardCategory};
use beopardy_stats::calculate::records::{AppearanceRecord, MarginRecord};
use beopardy_stats::calculate::standings::RankedResults;
use beopardy_stats::config::AppConfig;
use beopardy_stats::format::{format_number, format_ordinal, format_percentage};
use beopardy_stats::models::{EpisodeId, Player, PlayerCareerStats};
use beopardy_stats::storage::{open_store, query, Store};

#[derive(Parser)]
#[command(name = "beopardy-stats")]
#[command(about = "Player, episode and record statistics for the Beopardy game show")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<String>,

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
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print every record and superlative
    Records,

    /// Print a leaderboard
    Leaderboard {
        /// wins, win-rate, points, accuracy or appearances
        #[arg(long, default_value = "wins")]
        category: String,

        /// Number of rows
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Show a player's career
    Player {
        /// Player slug (e.g., "shayne-topp")
        slug: String,
    },

    /// Show an episode's results
    Episode {
        /// Episode id
        id: String,
    },

    /// Compare two players head to head
    Compare {
        /// First player (slug or id)
        player1: String,

        /// Second player (slug or id)
        player2: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = PathBuf::from(&cli.config);
    let mut config = AppConfig::load(&config_path)
        .with_context(|| format!("Loading config from {}", cli.config))?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = PathBuf::from(dir);
    }
    let log_level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting beopardy-stats v{}", env!("CARGO_PKG_VERSION"));
    if !config_path.exists() {
        tracing::info!("No config file at {}, using defaults", config_path.display());
    }

    let store = open_store(&config)?;

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            if config.admin.token.is_none() {
                tracing::warn!("No admin token configured; admin endpoints are disabled");
            }
            let state = AppState::new(store)
                .with_admin_token(config.admin.token.clone())
                .with_cors_origin(config.server.cors_origin.clone());
            let app = build_router(state);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Records => {
            let records = query::load_records(store.as_ref()).await?;
            if records.is_empty() {
                println!("No records yet.");
                return Ok(());
            }

            println!("Single game");
            print_appearance("Highest score", &records.highest_score);
            print_appearance("Lowest winning score", &records.lowest_winning_score);
            print_appearance("Best accuracy", &records.best_single_game_accuracy);
            print_appearance("Highest losing score", &records.highest_non_winning_score);

            println!("\nCareer");
            print_career("Most wins", &records.most_wins, |s| s.total_wins.to_string());
            print_career("Best win rate", &records.best_win_rate, |s| {
                format_percentage(Some(s.win_percentage), 1)
            });
            print_career("Most points", &records.most_total_points, |s| {
                format_number(s.total_points)
            });
            print_career("Highest average", &records.highest_average_points, |s| {
                format_number(s.avg_points_per_appearance.round() as i64)
            });
            print_career(
                "Most games without a win",
                &records.most_appearances_without_win,
                |s| s.total_appearances.to_string(),
            );

            println!("\nGames");
            print_margin("Closest game", &records.closest_game);
            print_margin("Biggest blowout", &records.biggest_blowout);
        }
        Commands::Leaderboard { category, limit } => {
            let category: LeaderboardCategory = category.parse().map_err(anyhow::Error::msg)?;
            let stats = store.career_stats().await?;
            let entries = leaderboard(&stats, category, Some(limit));

            println!("{}", category.label());
            if category.min_appearances() > 1 {
                println!("(minimum {} appearances)", category.min_appearances());
            }
            for entry in entries {
                let value = match category {
                    LeaderboardCategory::WinRate | LeaderboardCategory::Accuracy => {
                        format_percentage(Some(entry.value), 1)
                    }
                    _ => format_number(entry.value as i64),
                };
                println!("{:>4}  {:<28} {:>10}", entry.rank, entry.player.name, value);
            }
        }
        Commands::Player { slug } => {
            let Some(profile) = query::player_profile(store.as_ref(), &slug).await? else {
                bail!("No player with slug {}", slug);
            };
            let s = &profile.stats;
            println!("{} ({})", profile.player.name, profile.player.slug);
            println!("Appearances:  {}", s.total_appearances);
            println!(
                "Wins:         {} ({})",
                s.total_wins,
                format_percentage(Some(s.win_percentage), 1)
            );
            println!("Total points: {}", format_number(s.total_points));
            println!(
                "Average:      {}",
                format_number(s.avg_points_per_appearance.round() as i64)
            );
            println!(
                "Accuracy:     {}",
                format_percentage(Some(s.accuracy_percentage), 1)
            );
            if let Some(high) = s.highest_score {
                println!("Best game:    {}", format_number(high));
            }

            if !profile.history.is_empty() {
                println!("\nHistory");
            }
            for h in &profile.history {
                println!(
                    "  {}  {:<30} {:>8}  {:>6}  {}",
                    h.air_date,
                    h.episode_title,
                    format_number(h.points),
                    format_percentage(Some(h.accuracy), 0),
                    if h.is_winner { "WIN" } else { "" }
                );
            }
        }
        Commands::Episode { id } => {
            let id = EpisodeId::from(id);
            let Some(detail) = query::episode_detail(store.as_ref(), &id).await? else {
                bail!("No episode with id {}", id);
            };
            let name_of = |pid: &beopardy_stats::models::PlayerId| {
                detail
                    .players
                    .iter()
                    .find(|p| &p.id == pid)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| pid.to_string())
            };

            println!("{} ({})", detail.episode.title, detail.episode.air_date);
            if let Some(url) = &detail.episode.youtube_url {
                println!("{}", url);
            }
            match &detail.results {
                RankedResults::Solo(rows) if rows.is_empty() => println!("No results recorded."),
                RankedResults::Solo(rows) => {
                    for r in rows {
                        println!(
                            "{:>5}  {:<28} {:>8}  {}",
                            format_ordinal(r.position),
                            name_of(&r.appearance.player_id),
                            format_number(r.appearance.points_scored),
                            if r.appearance.is_winner { "WINNER" } else { "" }
                        );
                    }
                }
                RankedResults::Team(teams) => {
                    for t in teams {
                        println!(
                            "{:>5}  {:<28} {:>8}  {}",
                            format_ordinal(t.position),
                            t.team.team_name,
                            format_number(t.team.total_points),
                            if t.team.is_winner { "WINNER" } else { "" }
                        );
                        for m in &t.members {
                            println!(
                                "         {:<26} {:>8}",
                                name_of(&m.appearance.player_id),
                                format_number(m.appearance.points_scored)
                            );
                        }
                    }
                }
            }
        }
        Commands::Compare { player1, player2 } => {
            let p1 = resolve_player(store.as_ref(), &player1).await?;
            let p2 = resolve_player(store.as_ref(), &player2).await?;
            let Some(h2h) = query::compare_players(store.as_ref(), &p1.id, &p2.id).await? else {
                bail!("Could not load both players");
            };

            println!("{} vs {}", p1.name, p2.name);
            println!(
                "Shared games: {}  ({} {} - {} {})",
                h2h.games.len(),
                p1.name,
                h2h.player1_wins,
                h2h.player2_wins,
                p2.name
            );
            for row in &h2h.stats {
                let fmt = |v: f64| match row.label {
                    "Win Rate" | "Correct %" => format_percentage(Some(v), 1),
                    _ => format_number(v.round() as i64),
                };
                println!(
                    "  {:<14} {:>10} {:>10}",
                    row.label,
                    fmt(row.player1),
                    fmt(row.player2)
                );
            }
        }
    }

    Ok(())
}

/// Find a player by slug, falling back to id.
async fn resolve_player(store: &dyn Store, key: &str) -> Result<Player> {
    if let Some(p) = store.player_by_slug(key).await? {
        return Ok(p);
    }
    match store.player(&key.into()).await? {
        Some(p) => Ok(p),
        None => bail!("No player matching {}", key),
    }
}

fn print_appearance(label: &str, record: &Option<AppearanceRecord>) {
    match record {
        Some(r) => println!(
            "  {:<26} {} ({}, {}, {})",
            label,
            format_number(r.points),
            r.player_name,
            r.episode_title,
            r.air_date
        ),
        None => println!("  {:<26} -", label),
    }
}

fn print_career<F>(label: &str, record: &Option<PlayerCareerStats>, value: F)
where
    F: Fn(&PlayerCareerStats) -> String,
{
    match record {
        Some(s) => println!("  {:<26} {} ({})", label, value(s), s.name),
        None => println!("  {:<26} -", label),
    }
}

fn print_margin(label: &str, record: &Option<MarginRecord>) {
    match record {
        Some(m) => println!(
            "  {:<26} {} points ({}, {})",
            label,
            format_number(m.margin),
            m.episode_title,
            m.air_date
        ),
        None => println!("  {:<26} -", label),
    }
}
