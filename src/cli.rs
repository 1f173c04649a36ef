use std::path::{Path, PathBuf};

mod list;
mod show;
mod terminal;
mod write;

use clap::ArgAction;
use drafts::{Config, DraftId, DraftStore, FileStorage, Language, domain::LanguageError};
use list::List;
use show::Show;
use terminal::Colorize;
use tracing::instrument;
use write::Write;

/// Directory, relative to the root, holding the config and the drafts.
const DRAFTS_DIR: &str = ".drafts";

/// Parse a language tag, rejecting anything outside the supported set.
fn parse_language(s: &str) -> Result<Language, LanguageError> {
    s.parse()
}

/// Load the configuration and the draft store under `root`.
///
/// Loading the store runs the cleanup pass, which may rewrite the stored
/// collection.
fn open(root: &Path) -> (Config, DraftStore<FileStorage>) {
    let dir = root.join(DRAFTS_DIR);
    let config = Config::load_or_default(&dir.join("config.toml"));
    let store = DraftStore::load(FileStorage::new(dir), config.store_options());
    (config, store)
}

/// Body text given either inline or as a file.
fn read_body(inline: Option<String>, file: Option<&Path>) -> anyhow::Result<Option<String>> {
    match (inline, file) {
        (Some(text), _) => Ok(Some(text)),
        (None, Some(path)) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
            Ok(Some(text))
        }
        (None, None) => Ok(None),
    }
}

/// Reject a body with nothing but whitespace in it.
fn require_content(content: &str) -> anyhow::Result<()> {
    if content.trim().is_empty() {
        anyhow::bail!("A draft needs some content");
    }
    Ok(())
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global=true)]
    verbose: u8,

    /// The directory that holds the `.drafts` folder
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::List(List::default()))
            .run(&self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// List drafts, most recently edited first (default)
    List(List),

    /// Create the `.drafts` folder with a default configuration
    Init,

    /// Create a new draft
    New(New),

    /// Show a draft in full
    Show(Show),

    /// Replace a draft's title, language or content
    Edit(Edit),

    /// Rename a draft
    Rename(Rename),

    /// Copy a draft under a new title
    Duplicate(Duplicate),

    /// Delete a draft
    Delete(Delete),

    /// Purge empty drafts and merge duplicates
    Clean,

    /// Write a story from standard input with autosave
    ///
    /// Each line read is appended to the story. The draft is saved once
    /// input pauses, and again when input ends.
    Write(Write),
}

impl Command {
    fn run(self, root: &Path) -> anyhow::Result<()> {
        match self {
            Self::List(command) => command.run(root)?,
            Self::Init => init(root)?,
            Self::New(command) => command.run(root)?,
            Self::Show(command) => command.run(root)?,
            Self::Edit(command) => command.run(root)?,
            Self::Rename(command) => command.run(root)?,
            Self::Duplicate(command) => command.run(root)?,
            Self::Delete(command) => command.run(root)?,
            Self::Clean => clean(root),
            Self::Write(command) => command.run(root)?,
        }
        Ok(())
    }
}

#[instrument]
fn init(root: &Path) -> anyhow::Result<()> {
    let dir = root.join(DRAFTS_DIR);
    if dir.exists() {
        anyhow::bail!("Drafts already initialized (found existing {DRAFTS_DIR} directory)");
    }

    std::fs::create_dir_all(&dir)
        .map_err(|e| anyhow::anyhow!("Failed to create {DRAFTS_DIR} directory: {e}"))?;

    Config::default()
        .save(&dir.join("config.toml"))
        .map_err(|e| anyhow::anyhow!("Failed to create config.toml: {e}"))?;

    println!("Initialized drafts in {}", root.display());
    println!("  Created: {DRAFTS_DIR}/config.toml");
    println!();
    println!("Next steps:");
    println!("  drafts write --title \"Your First Story\"");

    Ok(())
}

#[instrument]
fn clean(root: &Path) {
    let (_config, store) = open(root);
    let report = store.load_report();

    if !report.changed() {
        println!("{}", format!("{} drafts, nothing to clean", report.read).success());
        return;
    }

    println!("Read {} drafts", report.read);
    println!("  Unreadable:        {}", report.unreadable);
    println!("  Purged empty:      {}", report.purged_empty);
    println!("  Merged duplicates: {}", report.merged_duplicates);
    println!("  Repaired counts:   {}", report.repaired);
    if report.healed {
        println!("{}", format!("✅ {} drafts kept", store.len()).success());
    } else {
        println!(
            "{}",
            "⚠️  Cleaned drafts could not be written back".warning()
        );
    }
}

#[derive(Debug, clap::Parser)]
pub struct New {
    /// The story body
    #[arg(conflicts_with = "file")]
    content: Option<String>,

    /// Read the story body from a file
    #[arg(long, short)]
    file: Option<PathBuf>,

    /// The story title
    #[arg(long, short, default_value = "")]
    title: String,

    /// The language the story is written in
    #[arg(long, short, value_parser = parse_language)]
    language: Option<Language>,
}

impl New {
    #[instrument]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        let (config, mut store) = open(root);

        let content = read_body(self.content, self.file.as_deref())?.unwrap_or_default();
        require_content(&content)?;

        let language = self.language.unwrap_or(config.default_language);
        let id = store.create(&self.title, &content, language)?;

        println!("Created draft {id}");
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Edit {
    /// The draft to edit
    id: DraftId,

    /// Replace the title
    #[arg(long, short)]
    title: Option<String>,

    /// Replace the language
    #[arg(long, short, value_parser = parse_language)]
    language: Option<Language>,

    /// Replace the body
    #[arg(long, short, conflicts_with = "file")]
    content: Option<String>,

    /// Replace the body with the contents of a file
    #[arg(long, short)]
    file: Option<PathBuf>,
}

impl Edit {
    #[instrument]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        let (_config, mut store) = open(root);

        let Some(draft) = store.get(&self.id) else {
            anyhow::bail!("Draft {} not found", self.id);
        };

        let title = self.title.unwrap_or_else(|| draft.title().to_string());
        let language = self.language.unwrap_or(draft.language());
        let content = read_body(self.content, self.file.as_deref())?
            .unwrap_or_else(|| draft.content().to_string());
        require_content(&content)?;

        store.update(&self.id, &title, &content, language)?;

        println!("Updated draft {}", self.id);
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Rename {
    /// The draft to rename
    id: DraftId,

    /// The new title
    title: String,
}

impl Rename {
    #[instrument]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        let title = self.title.trim();
        if title.is_empty() {
            anyhow::bail!("Title must not be blank");
        }

        let (_config, mut store) = open(root);
        if !store.rename(&self.id, title)? {
            anyhow::bail!("Draft {} not found", self.id);
        }

        println!("Renamed draft {} to \"{title}\"", self.id);
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Duplicate {
    /// The draft to copy
    id: DraftId,
}

impl Duplicate {
    #[instrument]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        let (_config, mut store) = open(root);

        let Some(copy) = store.duplicate(&self.id)? else {
            anyhow::bail!("Draft {} not found", self.id);
        };

        println!("Copied draft {} to {copy}", self.id);
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Delete {
    /// The draft to delete
    id: DraftId,

    /// Skip the confirmation prompt
    #[arg(long, short)]
    yes: bool,
}

impl Delete {
    #[instrument]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        let (_config, mut store) = open(root);

        let Some(draft) = store.get(&self.id) else {
            println!("{}", format!("No draft {}, nothing to delete", self.id).dim());
            return Ok(());
        };

        if !self.yes {
            let confirmed = dialoguer::Confirm::new()
                .with_prompt(format!("Delete \"{}\" ({} words)?", draft.title(), draft.word_count()))
                .default(false)
                .interact()?;
            if !confirmed {
                println!("Cancelled");
                return Ok(());
            }
        }

        store.delete(&self.id)?;

        println!("{}", format!("✅ Deleted draft {}", self.id).success());
        Ok(())
    }
}
