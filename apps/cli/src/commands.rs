//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use doxbook_core::PipelineOutcome;
use doxbook_shared::{AppConfig, Book, BuildConfig, SummaryPolicy, init_config, load_config};
use doxbook_storage::BookFile;
use tracing::info;

use crate::progress::CliProgress;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// doxbook: API reference pages for a book, straight from doc comments.
#[derive(Parser)]
#[command(
    name = "doxbook",
    version,
    about = "Generate markdown API pages from doc comments and add them to a book.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Book root directory (holds book.json and doxbook.toml).
    #[arg(long, default_value = ".", global = true, env = "DOXBOOK_ROOT")]
    pub root: PathBuf,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Regenerate the API pages and register them in the book.
    Build(BuildArgs),

    /// Book metadata management.
    Book {
        #[command(subcommand)]
        action: BookAction,
    },

    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Overrides for the `[build]` config section.
#[derive(clap::Args, Debug, Default)]
pub(crate) struct BuildArgs {
    /// Source glob, relative to the book root.
    #[arg(long)]
    pub src: Option<String>,

    /// Output directory name inside the book root.
    #[arg(long)]
    pub out: Option<String>,

    /// Maximum concurrent file reads/writes.
    #[arg(long, env = "DOXBOOK_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Keep existing chapter articles that this run does not regenerate.
    #[arg(long)]
    pub merge: bool,
}

impl BuildArgs {
    fn apply(&self, config: &mut BuildConfig) {
        if let Some(src) = &self.src {
            config.src.clone_from(src);
        }
        if let Some(out) = &self.out {
            config.output_dir.clone_from(out);
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if self.merge {
            config.summary_policy = SummaryPolicy::Merge;
        }
    }
}

/// Book subcommands.
#[derive(Subcommand)]
pub(crate) enum BookAction {
    /// Create book.json with a single empty chapter.
    Init {
        /// Title of the chapter generated pages go under.
        #[arg(long, default_value = "API")]
        title: String,
    },
    /// Print the summary and navigation order.
    Show {
        /// Print the raw book.json instead.
        #[arg(long)]
        json: bool,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "doxbook=info",
        1 => "doxbook=debug",
        _ => "doxbook=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let root = cli.root;
    match cli.command {
        Command::Build(args) => cmd_build(&root, &args).await,
        Command::Book { action } => match action {
            BookAction::Init { title } => cmd_book_init(&root, &title).await,
            BookAction::Show { json } => cmd_book_show(&root, json).await,
        },
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(&root),
            ConfigAction::Show => cmd_config_show(&root),
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_build(root: &Path, args: &BuildArgs) -> Result<()> {
    let app = load_config(root)?;
    let mut config = BuildConfig::new(root, &app);
    args.apply(&mut config);

    let mut book = BookFile::load(root).await?;

    info!(
        root = %root.display(),
        src = %config.src,
        output = %config.output_dir,
        policy = %config.summary_policy,
        "building docs"
    );

    let reporter = CliProgress::new();
    let outcome = doxbook_core::generate_docs(&config, &mut *book, &reporter).await;

    let report = match outcome {
        PipelineOutcome::Done(report) => report,
        PipelineOutcome::Failed { stage, message } => {
            return Err(eyre!("build failed while {stage}: {message}"));
        }
    };
    book.save().await?;

    println!();
    println!("  Docs generated.");
    println!("  Sources:  {}", report.sources_found);
    println!("  Written:  {}", report.written.len());
    println!("  Skipped:  {}", report.files_skipped);
    println!("  Output:   {}", report.output_dir.display());
    println!("  Time:     {:.1}s", report.elapsed.as_secs_f64());
    println!();
    Ok(())
}

async fn cmd_book_init(root: &Path, title: &str) -> Result<()> {
    let book = BookFile::init(root, title).await?;
    println!("Book initialized at: {}", book.path().display());
    Ok(())
}

async fn cmd_book_show(root: &Path, json: bool) -> Result<()> {
    let book = BookFile::load(root).await?.into_book();
    if json {
        println!("{}", serde_json::to_string_pretty(&book)?);
    } else {
        print!("{}", outline(&book));
    }
    Ok(())
}

fn cmd_config_init(root: &Path) -> Result<()> {
    let path = init_config(root)?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(root: &Path) -> Result<()> {
    let config: AppConfig = load_config(root)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

/// Human-readable summary tree followed by the navigation order.
fn outline(book: &Book) -> String {
    let mut out = String::new();
    if let Some(title) = &book.title {
        out.push_str(&format!("{title}\n\n"));
    }

    out.push_str("Summary\n");
    for chapter in &book.summary.chapters {
        out.push_str(&format!("  {} {}\n", chapter.level, chapter.title));
        for article in &chapter.articles {
            out.push_str(&format!("    {} {} ({})\n", article.level, article.title, article.path));
        }
    }

    out.push_str("\nNavigation\n");
    for path in book.navigation.chain() {
        if let Some(segment) = book.navigation.get(&path) {
            out.push_str(&format!("  {:>3}. {}\n", segment.index, segment.path));
        }
    }
    out
}
