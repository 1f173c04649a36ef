use std::path::Path;

use clap::Parser;
use drafts::DraftId;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
pub struct Show {
    /// The draft to show
    id: DraftId,

    /// Print only the body, without the header
    #[arg(long)]
    raw: bool,
}

impl Show {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let (_config, store) = super::open(root);

        let Some(draft) = store.get(&self.id) else {
            anyhow::bail!("Draft {} not found", self.id);
        };

        if self.raw {
            println!("{}", draft.content());
            return Ok(());
        }

        println!("{}", draft.title().info());
        println!(
            "{}",
            format!(
                "{} · {} · {} words · edited {}",
                draft.id(),
                draft.language().label(),
                draft.word_count(),
                draft.last_edited().format("%Y-%m-%d %H:%M UTC")
            )
            .dim()
        );
        println!();
        println!("{}", draft.content());
        Ok(())
    }
}
