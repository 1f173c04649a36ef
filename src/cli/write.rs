use std::{
    io::{self, BufRead},
    path::Path,
    sync::mpsc::{self, Receiver, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};

use clap::Parser;
use drafts::{Autosave, DraftId, Language, SaveStatus};
use tracing::instrument;

use super::{
    parse_language,
    terminal::{self, Colorize},
};

/// How often the session wakes up when no input arrives.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Parser)]
pub struct Write {
    /// Continue writing an existing draft
    #[arg(long, short)]
    draft: Option<DraftId>,

    /// The story title
    #[arg(long, short)]
    title: Option<String>,

    /// The language the story is written in
    #[arg(long, short, value_parser = parse_language)]
    language: Option<Language>,
}

impl Write {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let (config, store) = super::open(root);
        let mut session = Autosave::new(store, config.autosave_options());

        if let Some(id) = &self.draft {
            if !session.open_draft(id) {
                anyhow::bail!("Draft {id} not found");
            }
        }

        let now = Instant::now();
        if let Some(title) = &self.title {
            session.set_title(now, title);
        }
        if let Some(language) = self.language {
            session.set_language(now, language);
        }

        eprintln!(
            "{}",
            "Type your story. Lines are saved as you pause; end input (Ctrl-D) to finish.".dim()
        );

        let lines = spawn_reader();
        let mut shown = session.status();
        loop {
            match lines.recv_timeout(POLL_INTERVAL) {
                Ok(line) => {
                    let content = append_line(&session.state().content, &line);
                    session.set_content(Instant::now(), &content);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            if let Err(e) = session.tick(Instant::now()) {
                tracing::debug!("autosave failed: {e:?}");
            }

            if session.status() != shown {
                shown = session.status();
                if shown != SaveStatus::Idle {
                    eprintln!("{}", terminal::status_label(shown));
                }
            }
        }

        if session.state().content.trim().is_empty() {
            println!("Nothing written, no draft saved");
            return Ok(());
        }

        let id = session.save_now(Instant::now(), None)?;
        let store = session.close();
        let words = store.get(&id).map_or(0, drafts::Draft::word_count);

        println!("{}", format!("✅ Saved draft {id} ({words} words)").success());
        Ok(())
    }
}

fn append_line(content: &str, line: &str) -> String {
    if content.is_empty() {
        line.to_string()
    } else {
        format!("{content}\n{line}")
    }
}

/// Read stdin on a separate thread so the session can keep ticking while
/// it waits for input. The channel disconnects at end of input.
fn spawn_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines().map_while(Result::ok) {
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
