use std::path::Path;

use chrono::{DateTime, Utc};
use clap::Parser;
use drafts::Draft;
use tracing::instrument;

use super::terminal::{self, Colorize};

/// Characters of content shown under each draft.
const PREVIEW_CHARS: usize = 150;

/// Command arguments for `drafts list`.
#[derive(Debug, Default, Parser)]
pub struct List {
    /// Print the stored collection as JSON.
    #[arg(long)]
    json: bool,

    /// Limit the number of drafts shown.
    #[arg(long, short = 'n', value_name = "N")]
    limit: Option<usize>,
}

impl List {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let (_config, store) = super::open(root);
        let shown = self.limit.unwrap_or(usize::MAX).min(store.len());
        let drafts = &store.drafts()[..shown];

        if self.json {
            println!("{}", serde_json::to_string_pretty(drafts)?);
            return Ok(());
        }

        if drafts.is_empty() {
            println!("No drafts yet");
            println!("{}", "Start writing and your drafts will appear here".dim());
            return Ok(());
        }

        let width = terminal::terminal_width().map_or(PREVIEW_CHARS, |w| usize::from(w).saturating_sub(4));
        let now = Utc::now();
        for draft in drafts {
            print_draft(draft, now, width.min(PREVIEW_CHARS));
        }

        if shown < store.len() {
            println!("{}", format!("… and {} more", store.len() - shown).dim());
        }
        Ok(())
    }
}

fn print_draft(draft: &Draft, now: DateTime<Utc>, preview_chars: usize) {
    println!("{}  {}", draft.title().info(), draft.id().as_str().dim());
    println!(
        "  {} · {} words · {}",
        relative_time(draft.last_edited(), now),
        draft.word_count(),
        draft.language().label()
    );
    let preview = draft.preview(preview_chars).replace(['\n', '\r'], " ");
    println!("  {}", preview.dim());
    println!();
}

/// Describe how long ago `then` was, coarsely.
fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{minutes} min ago")
    } else if hours < 24 {
        format!("{hours} hour{} ago", plural(hours))
    } else if days < 7 {
        format!("{days} day{} ago", plural(days))
    } else {
        then.format("%Y-%m-%d").to_string()
    }
}

const fn plural(n: i64) -> &'static str {
    if n == 1 { "" } else { "s" }
}
