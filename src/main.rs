use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use boardgame_tracker::{
    config::Settings,
    io::{load_catalog, open_source, parse_progress_str, write_catalog, ProgressImport},
    models::PlayStatus,
    selection::{select_games, SelectionCriteria},
    tiers::Reclassification,
    tui::App,
    Session,
};

mod tui_main;

#[derive(Parser)]
#[clap(name = "boardgame-tracker")]
#[clap(about = "Track played board games and rank them into rating tiers", long_about = None)]
struct Cli {
    /// Settings file, used instead of config/default and config/local
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the interactive tracker
    Tui {
        /// Catalog file or URL (defaults to catalog.source)
        #[clap(long)]
        catalog: Option<String>,

        /// Progress file to recover
        #[clap(long)]
        progress: Option<PathBuf>,
    },

    /// Print the summary and the tier list
    Stats {
        #[clap(long)]
        catalog: Option<String>,

        #[clap(long)]
        progress: PathBuf,

        /// Print the statistics report as JSON
        #[clap(long)]
        json: bool,
    },

    /// Write ratings or statistics to a file
    Export {
        #[clap(long)]
        catalog: Option<String>,

        #[clap(long)]
        progress: PathBuf,

        #[clap(long, value_enum)]
        format: ExportFormat,

        /// Output file (defaults to a name under export.output_dir)
        #[clap(short, long)]
        output: Option<PathBuf>,
    },

    /// Record a rating in a progress file
    Rate {
        #[clap(long)]
        catalog: Option<String>,

        #[clap(long)]
        progress: PathBuf,

        /// Game ID
        #[clap(long)]
        game: String,

        /// A rating from 0 to 10, or yes, no or clear
        #[clap(long)]
        value: String,
    },

    /// Move a rated game into another tier
    Reclassify {
        #[clap(long)]
        catalog: Option<String>,

        #[clap(long)]
        progress: PathBuf,

        /// Game ID
        #[clap(long)]
        game: String,

        /// Target tier key, e.g. 8.0-8.4
        #[clap(long)]
        tier: String,
    },

    /// Build a smaller catalog from a full ranking dump
    Select {
        #[clap(long)]
        input: String,

        #[clap(long)]
        output: PathBuf,

        #[clap(long, default_value = "500")]
        top: usize,

        #[clap(long, default_value = "1000")]
        top_recent: usize,

        #[clap(long, default_value = "2020")]
        recent_year: i32,
    },

    /// Print the configured tier bands
    Tiers,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Ratings,
    Json,
    Csv,
}

fn init_logging(level: &str, to_sink: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    // The TUI owns the terminal, so its logs go nowhere
    let result = if to_sink {
        builder.with_writer(std::io::sink).try_init()
    } else {
        builder.with_writer(std::io::stderr).try_init()
    };
    if let Err(e) = result {
        eprintln!("Failed to initialize logging: {}", e);
    }
}

async fn read_progress(path: &Path, required: bool) -> boardgame_tracker::Result<ProgressImport> {
    if !required && !path.exists() {
        info!("No progress file at {}, starting fresh", path.display());
        return Ok(ProgressImport::default());
    }
    let text = tokio::fs::read_to_string(path).await?;
    parse_progress_str(&text)
}

/// Loads the catalog and the progress file concurrently and builds a
/// session from both.
async fn load_session(
    settings: &Settings,
    catalog: Option<String>,
    progress: Option<&Path>,
    progress_required: bool,
) -> anyhow::Result<Session> {
    let location = catalog.unwrap_or_else(|| settings.catalog.source.clone());
    let source = open_source(&location, settings.catalog_timeout())?;

    let (catalog, import) = match progress {
        Some(path) => {
            let (catalog, import) =
                futures::try_join!(load_catalog(source.as_ref()), read_progress(path, progress_required))
                    .with_context(|| format!("Failed to load {} or {}", location, path.display()))?;
            (catalog, Some(import))
        }
        None => {
            let catalog = load_catalog(source.as_ref())
                .await
                .with_context(|| format!("Failed to load catalog from {}", location))?;
            (catalog, None)
        }
    };

    let mut session = Session::new(catalog, settings.tier_table()?);
    if let Some(import) = import {
        session.import_progress(import);
    }
    Ok(session)
}

fn print_stats(session: &Session) {
    let snapshot = session.snapshot();
    let stats = &snapshot.stats;

    println!("\n=== Board Game Statistics ===");
    println!("Games played: {}", stats.total_played);
    println!("Games rated: {}", stats.total_rated);
    println!("Average rating: {:.1}", stats.average_rating);
    println!("Top rating: {:.1}", stats.top_rating);

    for tier in &snapshot.tiers {
        println!("\n{} ({}) - {} games", tier.label, tier.range, tier.games.len());
        for member in &tier.games {
            println!("  {:>4}. {} - {}", member.rank, member.game.display_title(), member.rating);
        }
    }
}

fn save_progress(session: &Session, path: &Path) -> anyhow::Result<()> {
    let csv = session.progress_csv()?;
    std::fs::write(path, csv).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Saved progress to {}", path.display());
    Ok(())
}

fn apply_status_value(session: &mut Session, game: &str, value: &str) -> anyhow::Result<PlayStatus> {
    match value.trim().to_lowercase().as_str() {
        "yes" => session.mark_played(game),
        "no" => session.mark_unplayed(game),
        "clear" => session.set_status(game, PlayStatus::Unrated)?,
        rating => {
            session.enter_rating(game, rating)?;
        }
    }
    Ok(session.status(game))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // An explicit settings file must load; the layered defaults may fall back
    let (settings, using_defaults) = match &cli.config {
        Some(path) => (
            Settings::from_file(path).with_context(|| format!("Failed to load {}", path.display()))?,
            false,
        ),
        None => match Settings::new() {
            Ok(settings) => (settings, false),
            Err(_) => (Settings::default(), true),
        },
    };

    init_logging(&settings.app.log_level, matches!(cli.command, Commands::Tui { .. }));
    if using_defaults {
        info!("Using default settings");
    }

    if let Err(e) = settings.validate() {
        error!("Invalid settings: {}", e);
        return Err(anyhow::anyhow!(e));
    }

    match cli.command {
        Commands::Tui { catalog, progress } => {
            let session = load_session(&settings, catalog, progress.as_deref(), true).await?;
            let app = App::new(session, settings.export.clone());
            tui_main::run_tui(app, settings.tui.tick_rate_ms)?;
        }

        Commands::Stats { catalog, progress, json } => {
            let session = load_session(&settings, catalog, Some(&progress), true).await?;
            if json {
                println!("{}", session.export_statistics_json(&settings.export.site_base_url, Utc::now())?);
            } else {
                print_stats(&session);
            }
        }

        Commands::Export { catalog, progress, format, output } => {
            let session = load_session(&settings, catalog, Some(&progress), true).await?;
            let now = Utc::now();
            let base_url = &settings.export.site_base_url;
            let stamp = now.format("%Y-%m-%d");

            let (default_name, contents) = match format {
                ExportFormat::Ratings => (settings.export.ratings_file.clone(), session.export_ratings_csv()?),
                ExportFormat::Json => (
                    format!("{}_{}.json", settings.export.statistics_prefix, stamp),
                    session.export_statistics_json(base_url, now)?,
                ),
                ExportFormat::Csv => (
                    format!("{}_{}.csv", settings.export.statistics_prefix, stamp),
                    session.export_statistics_csv(base_url, now)?,
                ),
            };

            let path = output.unwrap_or_else(|| settings.output_path(&default_name));
            std::fs::write(&path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Saved to {}", path.display());
        }

        Commands::Rate { catalog, progress, game, value } => {
            let mut session = load_session(&settings, catalog, Some(&progress), false).await?;
            let title = session.game(&game)?.display_title();

            let status = apply_status_value(&mut session, &game, &value)?;
            save_progress(&session, &progress)?;
            println!("{}: {}", title, status.describe());
        }

        Commands::Reclassify { catalog, progress, game, tier } => {
            let mut session = load_session(&settings, catalog, Some(&progress), true).await?;
            let title = session.game(&game)?.display_title();

            match session.reclassify(&game, &tier)? {
                Reclassification::Unchanged { tier } => {
                    println!("{} is already in tier {}", title, tier);
                }
                Reclassification::Moved { from, to, old_rating, new_rating } => {
                    save_progress(&session, &progress)?;
                    println!(
                        "{}: {} ({}) -> {} ({})",
                        title,
                        from.as_deref().unwrap_or("no tier"),
                        old_rating,
                        to,
                        new_rating
                    );
                }
            }
        }

        Commands::Select { input, output, top, top_recent, recent_year } => {
            let source = open_source(&input, settings.catalog_timeout())?;
            let catalog = load_catalog(source.as_ref())
                .await
                .with_context(|| format!("Failed to load {}", input))?;

            let criteria = SelectionCriteria { top, top_recent, recent_year };
            let selected = select_games(&catalog, &criteria);
            if selected.is_empty() {
                warn!("Selection is empty");
            }

            let file = File::create(&output).with_context(|| format!("Failed to create {}", output.display()))?;
            write_catalog(&selected, file)?;
            println!("Selected {} of {} games into {}", selected.len(), catalog.len(), output.display());
        }

        Commands::Tiers => {
            let table = settings.tier_table()?;
            for band in table.bands() {
                println!("{:<10} {:<8} {}", band.key, band.label, band.range_label());
            }
        }
    }

    Ok(())
}
