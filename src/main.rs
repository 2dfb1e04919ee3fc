//! CLI entry point for redundex.
//!
//! Provides commands for building the embedding index, searching it, and
//! reporting redundant code. Main components: Cli parser, Commands enum, and
//! the async runtime used for Ctrl-C handling during index builds.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use redundex::analysis::{
    NameGroupReport, classify, find_all_pairs_duplicates, qualified_symbols, rank,
    validate_threshold,
};
use redundex::display::{
    THEME, create_duplicates_table, create_index_summary_table, create_progress_bar,
    create_search_table, render_analysis, with_spinner,
};
use redundex::io::{ExitCode, OutputFormat, OutputManager, ResponseMeta};
use redundex::{
    BuildSummary, EmbeddingStore, FastEmbedder, IndexBuilder, IndexError, IndexPersistence,
    IndexResult, SaveTarget, Settings, TextEmbedder,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, warn};

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Find semantically redundant code
#[derive(Parser)]
#[command(
    name = "redundex",
    version = env!("CARGO_PKG_VERSION"),
    about = "Find semantically redundant code with embedding similarity",
    long_about = "Embed source files, then search them and report likely duplicates.",
    next_line_help = true,
    styles = clap_cargo_style(),
    after_help = "Quick Start:\n  $ redundex init\n  $ redundex index ui\n  $ redundex analyze\n  $ redundex search wallet connection"
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the embedding index (overrides config)
    #[arg(short, long, global = true)]
    index: Option<PathBuf>,

    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Initialize project
    #[command(about = "Set up .redundex directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Embed source files into the index
    #[command(about = "Build the embedding index from a directory")]
    Index {
        /// Directory to embed
        path: PathBuf,
    },

    /// Rank indexed artifacts against a free-text query
    #[command(
        about = "Semantic search over the index",
        after_help = "Examples:\n  redundex search wallet connection\n  redundex search \"price calculation\" --limit 5"
    )]
    Search {
        /// Query text
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Number of results (overrides config)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List every pair above a similarity threshold
    #[command(about = "List all pairs of similar artifacts")]
    Duplicates {
        /// Similarity threshold (overrides config)
        threshold: Option<f32>,
    },

    /// Report redundancy groups and shared name patterns
    #[command(about = "Report critical and potential redundancies")]
    Analyze,

    /// Show current configuration settings
    #[command(about = "Display active settings")]
    Config,
}

#[derive(Debug, Serialize)]
struct SearchHit {
    rank: usize,
    id: String,
    file: String,
    name: String,
    category: String,
    score: f32,
    preview: String,
}

#[derive(Debug, Serialize)]
struct IndexOutput<'a> {
    index_path: Option<&'a Path>,
    #[serde(flatten)]
    summary: &'a BuildSummary,
}

/// Entry point with tokio async runtime.
///
/// Loads configuration, sets up logging and the comparison thread pool, then
/// dispatches the command. Errors are reported through the output manager and
/// mapped to exit codes.
#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let format = OutputFormat::from_json_flag(cli.json);
    let mut output = OutputManager::new(format);

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        // A broken settings file must not block `init --force`
        Err(_) if matches!(cli.command, Commands::Init { .. }) => Settings::default(),
        Err(e) => return report_error(&mut output, &e),
    };

    init_tracing(cli.verbose || settings.debug);

    if let Err(e) = rayon::ThreadPoolBuilder::new()
        .num_threads(settings.analysis.parallel_threads)
        .build_global()
    {
        debug!("Using existing rayon pool: {e}");
    }

    let result = run(cli, settings, &mut output).await;
    match result {
        Ok(code) => code.into(),
        Err(e) => report_error(&mut output, &e),
    }
}

fn report_error(output: &mut OutputManager, error: &IndexError) -> std::process::ExitCode {
    output
        .error(error)
        .unwrap_or_else(|_| ExitCode::from_error(error))
        .into()
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::ERROR
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_settings(cli: &Cli) -> IndexResult<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .map_err(|e| IndexError::ConfigError {
        reason: e.to_string(),
    })?;

    if let Some(index) = &cli.index {
        settings.index_path = index.clone();
    }
    settings.validate()?;
    Ok(settings)
}

async fn run(cli: Cli, settings: Settings, output: &mut OutputManager) -> IndexResult<ExitCode> {
    let start = Instant::now();
    let json = output.format().is_json();

    match cli.command {
        Commands::Init { force } => {
            let path = Settings::init_config_file(force).map_err(|e| IndexError::ConfigError {
                reason: e.to_string(),
            })?;
            let data = serde_json::json!({ "config_path": path });
            emit(output, &data, None, || {
                format!(
                    "{}\nEdit this file to customize your settings.",
                    THEME.success_with_icon(&format!(
                        "Created configuration file at: {}",
                        path.display()
                    ))
                )
            })
        }

        Commands::Config => emit(output, &settings, None, || {
            let body = settings
                .to_toml()
                .unwrap_or_else(|e| format!("Error displaying config: {e}"));
            format!("Current Configuration:\n{}\n{body}", "=".repeat(50))
        }),

        Commands::Index { path } => {
            // Auto-initialize config on first build
            if cli.config.is_none() && Settings::check_init().is_err() {
                match Settings::init_config_file(false) {
                    Ok(created) => {
                        let message =
                            format!("Created configuration file at: {}", created.display());
                        output_progress(output, &message);
                    }
                    Err(e) => warn!("Could not create config file: {e}"),
                }
            }

            let embedder = load_embedder(&settings, !json)?;
            let persistence = IndexPersistence::new(&settings.index_path)
                .with_preview_chars(settings.embedding.preview_chars);

            let cancel = Arc::new(AtomicBool::new(false));
            let signal_flag = Arc::clone(&cancel);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    signal_flag.store(true, Ordering::Relaxed);
                }
            });

            let build_settings = settings.clone();
            let root = path.clone();
            let (store, summary) = tokio::task::spawn_blocking(move || {
                let progress = if json {
                    indicatif::ProgressBar::hidden()
                } else {
                    create_progress_bar(0, "embedding")
                };
                let builder =
                    IndexBuilder::new(&embedder, &build_settings).with_cancel_flag(cancel);
                let result = builder.build(&root, &progress);
                progress.finish_and_clear();
                result
            })
            .await
            .map_err(|e| IndexError::General(format!("Index build task failed: {e}")))??;

            let target = summary.save_target(&persistence);
            if let Some(path) = target.path() {
                IndexPersistence::new(path).save(&store)?;
            }

            let data = IndexOutput {
                index_path: target.path(),
                summary: &summary,
            };
            emit(output, &data, None, || {
                let status = match &target {
                    SaveTarget::Index(path) => THEME.success_with_icon(&format!(
                        "Saved {} embeddings to {}",
                        summary.embedded,
                        path.display()
                    )),
                    SaveTarget::Partial(path) => THEME.warning_with_icon(&format!(
                        "Interrupted: saved {} embeddings to {}, {} left unchanged",
                        summary.embedded,
                        path.display(),
                        persistence.path().display()
                    )),
                    SaveTarget::Skip => THEME.warning_with_icon(&format!(
                        "No embeddings produced, {} left unchanged",
                        persistence.path().display()
                    )),
                };
                format!("{}\n{status}", create_index_summary_table(&summary))
            })?;

            Ok(if summary.cancelled {
                ExitCode::GeneralError
            } else {
                ExitCode::Success
            })
        }

        Commands::Search { query, limit } => {
            let store = load_store(&settings)?;
            let query = query.join(" ");
            let limit = limit.unwrap_or(settings.analysis.search_limit);

            let embedder = load_embedder(&settings, !json)?;
            let query_vector = embedder
                .try_embed(&query)
                .map_err(|e| IndexError::EmbedderUnavailable {
                    reason: format!("Failed to get query embedding: {e}"),
                })?;

            let ranked = rank(&store, &query_vector, limit);
            let hits: Vec<SearchHit> = ranked
                .iter()
                .enumerate()
                .map(|(i, r)| SearchHit {
                    rank: i + 1,
                    id: r.id(),
                    file: r.record.location.clone(),
                    name: r.record.name.clone(),
                    category: r.record.category.clone(),
                    score: r.score,
                    preview: r.preview().to_string(),
                })
                .collect();

            let meta = ResponseMeta::new(Some(store.len()), start.elapsed());
            emit(output, &hits, Some(meta), || {
                format!(
                    "\nTop {} results for '{query}':\n{}",
                    ranked.len(),
                    create_search_table(&ranked)
                )
            })
        }

        Commands::Duplicates { threshold } => {
            let store = load_store(&settings)?;
            let threshold = match threshold {
                Some(value) => validate_threshold(value)?,
                None => settings.analysis.duplicate_threshold()?,
            };

            output_progress(
                output,
                &format!(
                    "Comparing {} artifacts for similarities (threshold: {threshold})...",
                    store.len()
                ),
            );
            let pairs = find_all_pairs_duplicates(&store, threshold);

            let data = serde_json::json!({ "threshold": threshold, "pairs": &pairs });
            let meta = ResponseMeta::new(Some(store.len()), start.elapsed());
            emit(output, &data, Some(meta), || {
                if pairs.is_empty() {
                    THEME.success_with_icon(&format!(
                        "No duplicates found with threshold {threshold}"
                    ))
                } else {
                    format!(
                        "\n{}\n{}",
                        THEME.warning_with_icon(&format!(
                            "Found {} potential duplicates:",
                            pairs.len()
                        )),
                        create_duplicates_table(&pairs)
                    )
                }
            })
        }

        Commands::Analyze => {
            let store = load_store(&settings)?;
            let thresholds = settings.analysis.thresholds()?;

            output_progress(
                output,
                &format!("Analyzing {} embeddings for redundancies...", store.len()),
            );
            let report = classify(&store, thresholds);
            let symbols = qualified_symbols(&store);
            let groups = redundex::group_by_base_name(
                symbols.iter().map(String::as_str),
                &settings.analysis.verb_prefixes,
            );
            let names = NameGroupReport::new(
                groups,
                settings.analysis.name_group_min,
                settings.analysis.name_group_display,
            );

            let data = serde_json::json!({ "redundancies": &report, "name_patterns": &names });
            let meta = ResponseMeta::new(Some(store.len()), start.elapsed());
            emit(output, &data, Some(meta), || render_analysis(&report, &names, &THEME))
        }
    }
}

fn emit<T, F>(
    output: &mut OutputManager,
    data: &T,
    meta: Option<ResponseMeta>,
    render: F,
) -> IndexResult<ExitCode>
where
    T: Serialize,
    F: FnOnce() -> String,
{
    output
        .result(data, meta, render)
        .map_err(|e| IndexError::General(format!("Failed to write output: {e}")))
}

fn output_progress(output: &mut OutputManager, message: &str) {
    if let Err(e) = output.progress(message) {
        debug!("Failed to write progress: {e}");
    }
}

fn load_store(settings: &Settings) -> IndexResult<EmbeddingStore> {
    let store = IndexPersistence::new(&settings.index_path)
        .with_preview_chars(settings.embedding.preview_chars)
        .load()?;

    let missing = store.missing_embeddings();
    if missing > 0 {
        warn!(missing, "Records without embeddings never match");
    }
    Ok(store)
}

fn load_embedder(settings: &Settings, show_progress: bool) -> IndexResult<FastEmbedder> {
    let model = settings.embedding.model.clone();
    let cache_dir = settings.embedding.models_dir();
    let load = || FastEmbedder::new(&model, cache_dir.clone(), show_progress);

    let embedder = if show_progress {
        with_spinner(&format!("Loading embedding model {model}..."), load)
    } else {
        load()
    };
    embedder.map_err(|e| IndexError::EmbedderUnavailable {
        reason: e.to_string(),
    })
}
