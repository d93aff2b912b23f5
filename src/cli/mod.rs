use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::Config;
use crate::service::{FileHistoryService, HistoryService};
use crate::sync::{FetchOutcome, PendingFetch, SyncController};
use crate::view::{ArboardSink, PresentationView, Rendered, SortOrder, EMPTY_STATE};

pub mod viewer;

#[derive(Parser)]
#[command(name = "clipview")]
#[command(about = "Browse and search clipboard history")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(short, long)]
    pub verbose: bool,

    /// Read history from this JSON file instead of the configured one
    #[arg(long, global = true)]
    pub history_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Open the interactive history viewer")]
    Watch,

    #[command(about = "Print the clipboard history")]
    List {
        #[arg(short, long)]
        limit: Option<usize>,

        #[arg(short, long)]
        descending: bool,
    },

    #[command(about = "Search the clipboard history")]
    Search {
        query: String,

        #[arg(short, long)]
        descending: bool,
    },

    #[command(about = "Configuration management")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    #[command(about = "Show current configuration")]
    Show,

    #[command(about = "Generate example configuration")]
    Init {
        #[arg(long)]
        force: bool,
    },

    #[command(about = "Validate configuration")]
    Validate,
}

pub struct CliHandler {
    config: Arc<Config>,
    config_path: Option<PathBuf>,
    controller: Option<SyncController>,
}

impl CliHandler {
    pub fn new(config_path: Option<PathBuf>) -> Result<Self> {
        let config = Config::load_config(config_path.as_deref())?;
        Ok(Self::with_config(config, config_path, None))
    }

    pub fn with_config(
        mut config: Config,
        config_path: Option<PathBuf>,
        history_file: Option<PathBuf>,
    ) -> Self {
        if let Some(path) = history_file {
            config.source.history_file = path;
        }

        Self {
            config: Arc::new(config),
            config_path,
            controller: None,
        }
    }

    /// Use `service` instead of the configured history file
    pub fn with_service(mut self, service: Arc<dyn HistoryService>) -> Self {
        self.controller = Some(SyncController::new(
            service,
            self.config.sync.refresh_on_clear,
        ));
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Lazily initialize the sync controller when needed
    fn ensure_controller(&mut self) -> SyncController {
        let config = Arc::clone(&self.config);
        self.controller
            .get_or_insert_with(|| {
                info!(
                    "Reading history from {}",
                    config.source.history_file.display()
                );
                let service = Arc::new(FileHistoryService::new(&config.source.history_file));
                SyncController::new(service, config.sync.refresh_on_clear)
            })
            .clone()
    }

    pub async fn handle_command(&mut self, command: Commands) -> Result<()> {
        match command {
            Commands::Watch => self.watch().await,
            Commands::List { limit, descending } => {
                let rendered = self.list(descending).await?;
                self.print(&rendered, limit)
            }
            Commands::Search { query, descending } => {
                let rendered = self.search(&query, descending).await?;
                self.print(&rendered, None)
            }
            Commands::Config { action } => self.handle_config_action(action),
        }
    }

    async fn watch(&mut self) -> Result<()> {
        let controller = self.ensure_controller();
        let mut viewer = viewer::HistoryViewer::new(
            controller,
            Arc::new(ArboardSink::new()),
            &self.config,
        );
        viewer.run().await
    }

    /// Fetch the full history once and render it
    pub async fn list(&mut self, descending: bool) -> Result<Rendered> {
        let controller = self.ensure_controller();
        let pending = controller.refresh().await;
        self.render_after(&controller, pending, descending).await
    }

    /// Fetch matching entries once and render them
    ///
    /// An empty query falls back to the full history.
    pub async fn search(&mut self, query: &str, descending: bool) -> Result<Rendered> {
        let controller = self.ensure_controller();
        let pending = match controller.set_query(query).await {
            Some(pending) => pending,
            None => controller.refresh().await,
        };
        self.render_after(&controller, pending, descending).await
    }

    async fn render_after(
        &self,
        controller: &SyncController,
        pending: PendingFetch,
        descending: bool,
    ) -> Result<Rendered> {
        match pending.wait().await {
            FetchOutcome::Applied { .. } => {}
            FetchOutcome::Failed { error, .. } => return Err(anyhow!(error)),
            FetchOutcome::Stale { seq } => {
                return Err(anyhow!("Fetch #{} was superseded", seq));
            }
        }

        let order = SortOrder::from_descending(descending || self.config.view.descending);
        let snapshot = controller.snapshot().await;
        Ok(PresentationView::new(order).render(&snapshot))
    }

    fn print(&self, rendered: &Rendered, limit: Option<usize>) -> Result<()> {
        let mut stdout = io::stdout();
        write_rendered(&mut stdout, rendered, self.config.view.preview_width, limit)?;
        stdout.flush()?;
        Ok(())
    }

    fn handle_config_action(&self, action: ConfigAction) -> Result<()> {
        match action {
            ConfigAction::Show => {
                println!("Current Configuration:");
                println!("{:#?}", self.config);
            }
            ConfigAction::Init { force } => {
                let path = match &self.config_path {
                    Some(path) => path.clone(),
                    None => Config::default_path()
                        .ok_or_else(|| anyhow!("Could not find config directory"))?,
                };
                Config::generate_example_config(&path, force)?;
                println!("Example configuration written to {}", path.display());
            }
            ConfigAction::Validate => {
                // Loading already validated it
                self.config.validate()?;
                println!("Configuration is valid");
            }
        }
        Ok(())
    }
}

/// Write rendered rows as numbered lines
pub fn write_rendered<W: Write>(
    out: &mut W,
    rendered: &Rendered,
    width: usize,
    limit: Option<usize>,
) -> io::Result<()> {
    let rows = match rendered {
        Rendered::Empty => return writeln!(out, "{}", EMPTY_STATE),
        Rendered::Rows(rows) => rows,
    };

    let shown = limit.unwrap_or(rows.len()).min(rows.len());
    writeln!(out, "Clipboard History (showing {} of {} entries):", shown, rows.len())?;
    for (i, row) in rows.iter().take(shown).enumerate() {
        writeln!(out, "{}. [{}] {}", i + 1, row.timestamp, row.preview(width))?;
    }

    Ok(())
}
