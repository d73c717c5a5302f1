// src/main.rs
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use game_price_tracker::{
    config::{load_config, Config},
    cooldown::SystemClock,
    presentation::{
        format::format_clp,
        lowest_price,
        render::{render_cards, render_dashboard, render_detail},
    },
    utils::setup_logging,
    Dashboard, HttpBackend, ItemId,
};
use log::{error, info};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

#[derive(Debug, Parser)]
#[command(name = "game-price-tracker", version, about = "Compare video game prices across stores")]
struct Cli {
    /// Backend base URL
    #[arg(long, env = "API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the catalog
    List,
    /// Show one game's prices
    Show { id: String },
    /// Refresh one game's prices once
    Refresh { id: String },
    /// Interactive session (default)
    Interactive,
}

#[derive(Debug, PartialEq)]
enum SessionCommand {
    List,
    Show,
    Select(ItemId),
    Refresh,
    Help,
    Quit,
    Unknown(String),
}

impl SessionCommand {
    fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let command = words.next()?;
        Some(match (command.to_lowercase().as_str(), words.next()) {
            ("list" | "ls", _) => SessionCommand::List,
            ("show", _) => SessionCommand::Show,
            ("select" | "s", Some(id)) => SessionCommand::Select(ItemId::new(id)),
            ("refresh" | "r" | "update", _) => SessionCommand::Refresh,
            ("help" | "?", _) => SessionCommand::Help,
            ("quit" | "exit" | "q", _) => SessionCommand::Quit,
            _ => SessionCommand::Unknown(line.trim().to_string()),
        })
    }
}

const HELP: &str = "Commands: list | select <id> | show | refresh | help | quit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok(); // before parsing: clap reads API_URL
    let cli = Cli::parse();
    let config = load_config(cli.api_url.clone()).context("Failed to load configuration")?;
    setup_logging(config.log_level_filter()).context("Failed to initialize logging")?;
    info!("Using backend at {}", config.api_url);

    let backend = Arc::new(HttpBackend::new(&config)?);
    let dashboard = Dashboard::new(backend, Arc::new(SystemClock));

    match cli.command.unwrap_or(Command::Interactive) {
        Command::List => {
            load_or_report(&dashboard).await?;
            print!("{}", render_cards(&dashboard.view().await.cards));
        }
        Command::Show { id } => {
            load_or_report(&dashboard).await?;
            select_or_report(&dashboard, &ItemId::new(id)).await?;
            print_selected(&dashboard).await;
        }
        Command::Refresh { id } => {
            load_or_report(&dashboard).await?;
            select_or_report(&dashboard, &ItemId::new(id)).await?;
            match dashboard.refresh_selected().await {
                Ok(report) => {
                    if !report.failed_stores.is_empty() {
                        println!("No price from: {}", report.failed_stores.join(", "));
                    }
                    print_selected(&dashboard).await;
                }
                Err(e) => {
                    println!("! {}", e.user_message());
                    return Err(e.into());
                }
            }
        }
        Command::Interactive => run_interactive(&dashboard, &config).await?,
    }
    Ok(())
}

async fn load_or_report(dashboard: &Dashboard) -> anyhow::Result<()> {
    if let Err(e) = dashboard.load().await {
        println!("! {}", e.user_message());
        return Err(e.into());
    }
    Ok(())
}

async fn select_or_report(dashboard: &Dashboard, id: &ItemId) -> anyhow::Result<()> {
    if let Err(e) = dashboard.select(id).await {
        println!("! {}", e.user_message());
        return Err(e.into());
    }
    Ok(())
}

async fn print_selected(dashboard: &Dashboard) {
    let view = dashboard.view().await;
    if let Some(item) = &view.selected {
        print!("{}", render_detail(item, view.updating, view.selected_cooldown));
    }
}

async fn run_interactive(dashboard: &Dashboard, config: &Config) -> anyhow::Result<()> {
    if dashboard.load().await.is_err() {
        print!("{}", render_dashboard(&dashboard.view().await));
        bail!("Catalog could not be loaded from {}", config.api_url);
    }
    print!("{}", render_dashboard(&dashboard.view().await));
    println!("{}", HELP);

    let ticker = dashboard.start_ticker(config.tick_interval())?;
    let mut ticks = ticker.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else { break };
                let Some(command) = SessionCommand::parse(&line) else { continue };
                match command {
                    SessionCommand::List => print!("{}", render_cards(&dashboard.view().await.cards)),
                    SessionCommand::Show => print!("{}", render_dashboard(&dashboard.view().await)),
                    SessionCommand::Select(id) => {
                        if dashboard.select(&id).await.is_ok() {
                            dashboard.clear_banner();
                        }
                        print!("{}", render_dashboard(&dashboard.view().await));
                    }
                    SessionCommand::Refresh => {
                        if let Ok(report) = dashboard.refresh_selected().await {
                            if let Some(lowest) = lowest_price(&report.item.prices) {
                                println!("Best price: {} at {}", format_clp(lowest.price), lowest.store);
                            }
                        }
                        print!("{}", render_dashboard(&dashboard.view().await));
                    }
                    SessionCommand::Help => println!("{}", HELP),
                    SessionCommand::Quit => break,
                    SessionCommand::Unknown(text) => println!("Unknown command '{}'. {}", text, HELP),
                }
            }
            tick = ticks.recv() => match tick {
                Ok(tick) => {
                    if let Some(label) = dashboard.countdown_label(&tick).await {
                        print!("\r[ {} ] ", label);
                        let _ = std::io::stdout().flush();
                    }
                    for id in tick.expired {
                        let name = dashboard
                            .catalog()
                            .get(&id)
                            .await
                            .map_or_else(|| id.to_string(), |item| item.name);
                        println!("\rCooldown over for {}; prices can be refreshed again.", name);
                    }
                }
                Err(RecvError::Lagged(skipped)) => info!("Skipped {} cooldown ticks", skipped),
                Err(RecvError::Closed) => {
                    error!("Cooldown ticker stopped unexpectedly");
                    break;
                }
            },
        }
    }

    ticker.stop().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn parses_session_commands() {
        assert_eq!(SessionCommand::parse("  "), None);
        assert_eq!(SessionCommand::parse("list"), Some(SessionCommand::List));
        assert_eq!(
            SessionCommand::parse("select 12"),
            Some(SessionCommand::Select(ItemId::new("12")))
        );
        assert_eq!(SessionCommand::parse("REFRESH"), Some(SessionCommand::Refresh));
        assert_eq!(SessionCommand::parse("q"), Some(SessionCommand::Quit));
        assert_eq!(
            SessionCommand::parse("select"),
            Some(SessionCommand::Unknown("select".to_string()))
        );
    }

    #[test]
    fn api_url_flag_falls_back_to_env() {
        let command = Cli::command();
        let api_url = command
            .get_arguments()
            .find(|arg| arg.get_id() == "api_url")
            .unwrap();
        assert_eq!(api_url.get_env(), Some(std::ffi::OsStr::new("API_URL")));
    }

    #[test]
    fn cli_defaults_to_interactive() {
        let cli = Cli::try_parse_from(["game-price-tracker"]).unwrap();
        assert!(cli.command.is_none());
        let cli = Cli::try_parse_from(["game-price-tracker", "--api-url", "http://x:1", "show", "7"]).unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://x:1"));
        assert!(matches!(cli.command, Some(Command::Show { id }) if id == "7"));
    }
}
