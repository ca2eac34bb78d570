//! Command Line Interface for the draft simulator.
use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use ffdraft_api::{AppState, ServerConfig, serve};
use ffdraft_data::{Database, load_players_csv};
use ffdraft_domain::value_objects::to_fixed;
use ffdraft_domain::{Position, SimulationRequest, SimulationResponse};
use ffdraft_simulation::sampler::SamplerStrategy;
use prettytable::{Table, row};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ffdraft")]
#[command(about = "Monte Carlo draft simulator for auction fantasy football", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where the catalog comes from. Flags override the environment.
#[derive(Args, Debug, Clone)]
struct SourceArgs {
    /// Catalog CSV (ignored when a database URL is set)
    #[arg(long)]
    players_csv: Option<PathBuf>,

    /// PostgreSQL connection string
    #[arg(long)]
    database_url: Option<String>,
}

impl SourceArgs {
    fn apply(&self, mut config: ServerConfig) -> ServerConfig {
        if let Some(path) = &self.players_csv {
            config.players_csv = path.clone();
        }
        if let Some(url) = &self.database_url {
            config.database_url = Some(url.clone());
        }
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Run one simulation and print the results
    Simulate {
        /// Auction budget
        #[arg(short, long)]
        budget: Option<i64>,

        /// Scoring format (standard, ppr, half_ppr)
        #[arg(short, long)]
        scoring_format: Option<String>,

        /// Trials per player
        #[arg(short, long)]
        num_simulations: Option<i64>,

        /// Cost override, e.g. `--override p1=45` (repeatable)
        #[arg(long = "override", value_parser = parse_override)]
        overrides: Vec<(String, f64)>,

        /// Fixed seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Sampling path: auto, scalar or batched
        #[arg(long)]
        sampler: Option<SamplerStrategy>,

        /// Only print the first N players
        #[arg(long)]
        top: Option<usize>,

        /// Print the raw JSON response
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// List catalog players
    Players {
        /// Only players at this position
        #[arg(long)]
        position: Option<Position>,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Load a catalog CSV into PostgreSQL, replacing existing players
    Import {
        /// Catalog CSV to load
        csv: PathBuf,

        /// PostgreSQL connection string (defaults to DATABASE_URL)
        #[arg(long)]
        database_url: Option<String>,
    },
}

fn parse_override(raw: &str) -> Result<(String, f64), String> {
    let (player_id, cost) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected PLAYER_ID=COST, got {raw:?}"))?;
    let cost = cost
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid cost in {raw:?}: {e}"))?;
    Ok((player_id.trim().to_string(), cost))
}

fn fixed(value: f64, dp: u32) -> String {
    to_fixed(value, dp).map_or_else(|| value.to_string(), |d: Decimal| d.to_string())
}

fn print_results(response: &SimulationResponse, top: Option<usize>) {
    let meta = &response.metadata;
    println!(
        "{} players, {} trials, {} scoring, budget {} ({} sampler)",
        meta.num_players,
        meta.num_simulations,
        meta.scoring_format,
        meta.budget,
        if meta.optimized { "batched" } else { "scalar" }
    );

    let mut table = Table::new();
    table.set_titles(row![
        "Rank", "Player", "Pos", "Mean", "Std", "Boom %", "Bust %", "Cost", "Pts/$", "Budget %"
    ]);
    let limit = top.unwrap_or(response.results.len());
    for (rank, r) in response.results.iter().take(limit).enumerate() {
        table.add_row(row![
            rank + 1,
            r.name,
            r.position,
            fixed(r.mean, 2),
            fixed(r.std, 2),
            fixed(r.boom_pct, 1),
            fixed(r.bust_pct, 1),
            r.cost,
            fixed(r.value_per_dollar, 2),
            fixed(r.budget_pct, 1)
        ]);
    }
    table.printstd();
    println!("cache key: {}", meta.cache_key);
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port, source } => {
            let mut config = source.apply(ServerConfig::from_env());
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            let state = AppState::from_config(&config)
                .await
                .context("failed to initialise application state")?;
            serve(&config, state).await?;
        }
        Commands::Simulate {
            budget,
            scoring_format,
            num_simulations,
            overrides,
            seed,
            sampler,
            top,
            json,
            source,
        } => {
            let mut config = source.apply(ServerConfig::from_env());
            if seed.is_some() {
                config.simulation_seed = seed;
            }
            if let Some(sampler) = sampler {
                config.sampler_strategy = sampler;
            }
            let state = AppState::from_config(&config)
                .await
                .context("failed to load catalog")?;

            let mut request = SimulationRequest {
                budget,
                scoring_format,
                num_simulations,
                adp_overrides: None,
            };
            for (player_id, cost) in overrides {
                request = request.with_override(player_id, cost);
            }

            let catalog = state.store.snapshot().await?;
            let outcome = state.engine.simulate(catalog, &request).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome.response)?);
            } else {
                print_results(&outcome.response, top);
            }
        }
        Commands::Players { position, source } => {
            let config = source.apply(ServerConfig::from_env());
            let state = AppState::from_config(&config)
                .await
                .context("failed to load catalog")?;
            let players = match position {
                Some(position) => state.store.players_at(position).await?,
                None => state.store.snapshot().await?.players().to_vec(),
            };

            let mut table = Table::new();
            table.set_titles(row!["Player ID", "Name", "Pos", "Points", "Std", "Cost"]);
            for p in &players {
                table.add_row(row![
                    p.player_id,
                    p.name,
                    p.position,
                    fixed(p.points_mean, 1),
                    fixed(p.points_std, 1),
                    p.acquisition_cost
                ]);
            }
            table.printstd();
        }
        Commands::Import { csv, database_url } => {
            let Some(url) = database_url.or_else(|| ServerConfig::from_env().database_url) else {
                bail!("import needs --database-url or DATABASE_URL");
            };
            let players = load_players_csv(&csv)?;
            let db = Database::connect(&url)
                .await
                .context("failed to connect to database")?;
            db.migrate().await?;
            let inserted = db.players().replace_all(&players).await?;
            info!(path = %csv.display(), inserted, "Catalog imported");
            println!("Imported {inserted} players from {}", csv.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_override() {
        assert_eq!(parse_override("p1=45"), Ok(("p1".to_string(), 45.0)));
        assert_eq!(parse_override(" p2 = 7.5 "), Ok(("p2".to_string(), 7.5)));
        assert!(parse_override("p1").is_err());
        assert!(parse_override("p1=cheap").is_err());
    }

    #[test]
    fn test_cli_parses_simulate() {
        let cli = Cli::try_parse_from([
            "ffdraft",
            "simulate",
            "--num-simulations",
            "500",
            "--override",
            "p1=45",
            "--override",
            "p2=3",
            "--sampler",
            "batched",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Simulate {
                num_simulations,
                overrides,
                sampler,
                json,
                ..
            } => {
                assert_eq!(num_simulations, Some(500));
                assert_eq!(overrides.len(), 2);
                assert_eq!(sampler, Some(SamplerStrategy::Batched));
                assert!(json);
            }
            _ => panic!("expected simulate"),
        }
    }

    #[test]
    fn test_fixed_formatting() {
        assert_eq!(fixed(20.0, 2), "20.00");
        assert_eq!(fixed(12.345, 1), "12.3");
    }
}
