//! Tabdash CLI
//!
//! Command-line interface to the dashboard state:
//! - Show and change settings
//! - Switch or toggle the theme
//! - Read and write the notepad and command history
//! - List top sites and print the greeting

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tabdash::{
    format_time, generate_default_config, greeting, Config, Dashboard, LoggingConfig, Theme,
    DOCUMENT_KEYS,
};
use tokio::task::JoinHandle;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "tabdash")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "New tab dashboard state")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the selected backend and stored document
    Status,

    /// Show or change settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },

    /// Show, set or toggle the theme
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },

    /// Show or replace the notepad
    Notes {
        /// New notepad content (omit to show)
        text: Option<String>,
    },

    /// Show the command history or record a command
    History {
        /// Command to record (omit to show)
        command: Option<String>,
    },

    /// List top sites
    Sites,

    /// Print the greeting and clock
    Greet,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print all settings
    Show,
    /// Set one setting by its stored name (e.g. use24Hour, displayName)
    Set { field: String, value: String },
    /// Add or replace a custom link
    LinkAdd { title: String, url: String },
    /// Remove a custom link by title
    LinkRemove { title: String },
}

#[derive(Subcommand)]
pub enum ThemeAction {
    /// Print the theme state
    Show,
    /// Set the theme: light, dark or auto
    Set { theme: String },
    /// Flip the rendered theme and pin it
    Toggle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Config loading logs before the configured subscriber exists
    let config = with_bootstrap_logging(std::io::stderr, || match &cli.config {
        Some(path) => Config::load_with_env(path),
        None => Ok(Config::load_default()),
    })?;
    init_logging(&config.logging);

    tracing::debug!("Tabdash v{}", env!("CARGO_PKG_VERSION"));

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)
                    .with_context(|| format!("Failed to write {:?}", path))?;
                println!("Config written to {:?}", path);
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let dashboard = Dashboard::open(&config);
    dashboard.init().await;
    let json = cli.format == "json";

    match cli.command {
        Commands::Status => {
            let document = dashboard.store.load_document().await;
            if json {
                let status = serde_json::json!({
                    "backend": dashboard.backend_kind(),
                    "dataDir": config.storage.data_dir,
                    "theme": dashboard.theme.state(),
                    "document": document,
                });
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("Tabdash v{}", env!("CARGO_PKG_VERSION"));
                println!();
                println!("Backend:  {}", dashboard.backend_kind());
                println!("Data dir: {}", config.storage.data_dir);
                println!("Keys:     {}", DOCUMENT_KEYS.join(", "));
                println!();
                println!("History entries: {}", document.command_history.len());
                println!("Notepad length:  {} chars", document.notepad_content.chars().count());
                println!("Custom links:    {}", document.settings.custom_links.len());
                let theme = dashboard.theme.state();
                println!("Theme:           {} ({})", theme.theme, theme.resolved_theme);
            }
        }

        Commands::Settings { action } => {
            let write = match action.unwrap_or(SettingsAction::Show) {
                SettingsAction::Show => None,
                SettingsAction::Set { field, value } => {
                    let next = dashboard.settings.get().with_field(&field, &value)?;
                    Some(dashboard.settings.set(next))
                }
                SettingsAction::LinkAdd { title, url } => {
                    Some(dashboard.settings.add_link(&title, &url))
                }
                SettingsAction::LinkRemove { title } => {
                    Some(dashboard.settings.remove_link(&title))
                }
            };
            finish(write).await?;

            let settings = dashboard.settings.get();
            if json {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            } else {
                let value = serde_json::to_value(&settings)?;
                if let Some(fields) = value.as_object() {
                    for (name, value) in fields {
                        if name == "githubToken" && value.as_str().is_some_and(|t| !t.is_empty()) {
                            println!("{:<16} ********", name);
                        } else {
                            println!("{:<16} {}", name, value);
                        }
                    }
                }
            }
        }

        Commands::Theme { action } => {
            match action.unwrap_or(ThemeAction::Show) {
                ThemeAction::Show => {}
                ThemeAction::Set { theme } => {
                    let theme: Theme = theme.parse()?;
                    dashboard.theme.set_theme(theme);
                }
                ThemeAction::Toggle => dashboard.theme.toggle_theme(),
            }

            let state = dashboard.theme.state();
            if json {
                println!("{}", serde_json::to_string_pretty(&state)?);
            } else {
                println!("{} ({})", state.theme, state.resolved_theme);
            }
        }

        Commands::Notes { text } => {
            if let Some(text) = text {
                finish(Some(dashboard.notepad.set(text))).await?;
            }
            let content = dashboard.notepad.get();
            if json {
                println!("{}", serde_json::to_string(&content)?);
            } else {
                println!("{}", content);
            }
        }

        Commands::History { command } => {
            if let Some(command) = command {
                finish(dashboard.history.record(&command, dashboard.history_limit)).await?;
            }
            let history = dashboard.history.get();
            if json {
                println!("{}", serde_json::to_string_pretty(&history)?);
            } else {
                for (i, entry) in history.iter().enumerate() {
                    println!("{:>3}  {}", i + 1, entry);
                }
            }
        }

        Commands::Sites => {
            let sites = dashboard.top_sites.get();
            if json {
                println!("{}", serde_json::to_string_pretty(&sites)?);
            } else {
                for site in sites {
                    println!("{:<20} {}", site.title, site.url);
                }
            }
        }

        Commands::Greet => {
            let settings = dashboard.settings.get();
            println!("{}", greeting(&settings.display_name));
            println!("{}", format_time(&Local::now(), settings.use24_hour));
        }

        // Handled before the dashboard is opened
        Commands::Config { .. } => {}
    }

    Ok(())
}

/// Wait for a write-through so the process does not exit before it lands
async fn finish(write: Option<JoinHandle<()>>) -> anyhow::Result<()> {
    if let Some(write) = write {
        write.await.context("write-through task failed")?;
    }
    Ok(())
}

/// Run `f` with a temporary subscriber writing to `make_writer`
fn with_bootstrap_logging<W, T>(make_writer: W, f: impl FnOnce() -> T) -> T
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tabdash=warn"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(make_writer)
        .finish();
    tracing::subscriber::with_default(subscriber, f)
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tabdash={}", config.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
