use std::io::IsTerminal;
use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use anyhow::bail;
use clap::Parser;
use engine_room_core::Board;
use engine_room_core::Notice;
use engine_room_core::RecordId;
use engine_room_core::advisory::AdvisoryEngine;
use engine_room_core::presentation::ReportPresentation;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::Workspace;
use crate::output::Palette;
use crate::output::print_notice;

const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Parser)]
pub struct AdviseArgs {
    pub id: RecordId,

    /// Print the report at once instead of animating it.
    #[arg(long)]
    pub no_animate: bool,

    /// Print the report as JSON (implies --no-animate).
    #[arg(long)]
    pub json: bool,
}

impl AdviseArgs {
    pub(crate) async fn run(self, workspace: &Workspace) -> Result<()> {
        let board = Board::new(workspace.store.clone());
        let Some(record) = board.record(self.id) else {
            bail!("no application with id {}", self.id);
        };

        let settings = workspace.settings();
        let engine =
            AdvisoryEngine::from_config(&workspace.config.advisory, settings.resolve_credentials());
        let json = self.json;
        if !json {
            println!("{}", Palette::stdout().dim("Analyzing application..."));
        }
        let notify = move |notice: Notice| {
            if json {
                eprintln!("{notice}");
            } else {
                print_notice(&notice);
            }
        };
        let outcome = engine
            .run(record, notify, &CancellationToken::new())
            .await?;

        if json {
            let source = outcome.source();
            let report = outcome.into_report();
            let value = json!({
                "id": record.id,
                "score": report.score,
                "verdict": report.verdict,
                "summary": report.summary,
                "source": source,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
            return Ok(());
        }

        let source = outcome.source();
        let mut presentation =
            ReportPresentation::new(outcome.into_report(), &workspace.config.presentation);
        let animate = !self.no_animate && std::io::stdout().is_terminal();
        if !animate {
            presentation.skip();
        }
        present(&mut presentation, source).await
    }
}

/// Count the score up, then type the summary out.
async fn present(presentation: &mut ReportPresentation, source: &str) -> Result<()> {
    let palette = Palette::stdout();
    let mut stdout = std::io::stdout();
    let final_score = presentation.report().score;

    while presentation.score() != final_score {
        write!(stdout, "\rScore {:>3}/100", presentation.score())?;
        stdout.flush()?;
        tokio::time::sleep(FRAME).await;
        presentation.tick(FRAME);
    }
    writeln!(
        stdout,
        "\rScore {final_score:>3}/100  {}",
        palette.verdict(presentation.verdict(), presentation.tone())
    )?;

    let mut shown = 0;
    loop {
        let visible = presentation.summary();
        if visible.len() > shown {
            write!(stdout, "{}", &visible[shown..])?;
            stdout.flush()?;
            shown = visible.len();
        }
        if presentation.is_done() {
            break;
        }
        tokio::time::sleep(FRAME).await;
        presentation.tick(FRAME);
    }
    writeln!(stdout)?;
    writeln!(stdout, "{}", palette.dim(&format!("source: {source}")))?;
    Ok(())
}
