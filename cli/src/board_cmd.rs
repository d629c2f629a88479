//! Board, record and export subcommands.

use std::path::PathBuf;

use anyhow::Result;
use anyhow::bail;
use clap::Parser;
use engine_room_core::ApplicationRecord;
use engine_room_core::Board;
use engine_room_core::RecordId;
use engine_room_core::Status;
use engine_room_core::board::RecordPatch;
use engine_room_core::export::write_export;
use engine_room_core::record::answer_or_na;
use serde_json::json;

use crate::Workspace;
use crate::output::Palette;
use crate::output::print_notice;

#[derive(Debug, Parser)]
pub struct BoardArgs {
    /// Only show applications matching this text.
    #[arg(long, short = 'f')]
    pub filter: Option<String>,

    /// Print JSON instead of columns.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct StatsArgs {
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct ShowArgs {
    pub id: RecordId,

    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct MoveArgs {
    pub id: RecordId,

    /// Target column: New, Review, Interview, Accepted or Archived (labels work too).
    pub status: Status,
}

#[derive(Debug, Parser)]
pub struct UpdateArgs {
    pub id: RecordId,

    /// Replace the reviewer notes.
    #[arg(long)]
    pub notes: Option<String>,

    #[arg(long)]
    pub status: Option<Status>,
}

#[derive(Debug, Parser)]
pub struct ExportArgs {
    /// Directory to write into (defaults to the current directory).
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,
}

fn card_line(record: &ApplicationRecord, palette: Palette) -> String {
    let meta = format!(
        "{} · {} · {}",
        record.name,
        record.stage.as_str().to_uppercase(),
        record.date
    );
    format!(
        "  {:>13}  {}  {}",
        record.id,
        record.display_title(),
        palette.dim(&meta)
    )
}

pub(crate) fn run_board(workspace: &Workspace, args: BoardArgs) -> Result<()> {
    let mut board = Board::new(workspace.store.clone());
    if let Some(filter) = args.filter {
        board.set_filter(filter);
    }
    let projection = board.projection();

    if args.json {
        let columns: Vec<_> = projection
            .columns
            .iter()
            .map(|column| {
                json!({
                    "status": column.status.as_str(),
                    "label": column.label,
                    "records": column.records,
                })
            })
            .collect();
        let value = json!({ "filter": board.filter(), "columns": columns });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let palette = Palette::stdout();
    for column in &projection.columns {
        let header = format!("{} ({})", column.label, column.len());
        println!("{}", palette.heading(&header));
        if column.is_empty() {
            println!("  {}", palette.dim("No Items"));
        }
        for record in &column.records {
            println!("{}", card_line(record, palette));
        }
    }
    Ok(())
}

pub(crate) fn run_stats(workspace: &Workspace, args: StatsArgs) -> Result<()> {
    let board = Board::new(workspace.store.clone());
    let stats = board.stats();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }
    let palette = Palette::stdout();
    println!("{} {}", palette.dim("Total:      "), stats.total);
    println!("{} {}", palette.dim("Pending:    "), stats.pending_count);
    println!("{} {}", palette.dim("Accepted:   "), stats.accepted_count);
    println!("{} {}", palette.dim("Acceptance: "), stats.rate_display());
    println!("{} {}", palette.dim("Pipeline:   "), stats.pipeline_display());
    Ok(())
}

pub(crate) fn run_show(workspace: &Workspace, args: ShowArgs) -> Result<()> {
    let board = Board::new(workspace.store.clone());
    let Some(record) = board.record(args.id) else {
        bail!("no application with id {}", args.id);
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }

    let palette = Palette::stdout();
    let status = record.status.label().unwrap_or(record.status.as_str());
    println!("{}", palette.heading(record.display_title()));
    let fields = [
        ("Id", record.id.to_string()),
        ("Founder", record.name.clone()),
        ("Email", answer_or_na(record.email.as_deref()).to_string()),
        ("Phone", answer_or_na(record.phone.as_deref()).to_string()),
        ("Stage", record.stage.as_str().to_uppercase()),
        ("Submitted", record.date.clone()),
        ("Status", status.to_string()),
    ];
    for (name, value) in fields {
        println!("{} {value}", palette.dim(&format!("{name:<10}")));
    }
    let answers = [
        ("Pitch", Some(record.description.as_str())),
        ("Customers", record.customers.as_deref()),
        ("Revenue Model", record.revenue_model.as_deref()),
        ("Competitors", record.competitors.as_deref()),
        ("Funding", record.funding.as_deref()),
        ("Notes", Some(record.notes.as_str())),
    ];
    for (question, answer) in answers {
        println!();
        println!("{}", palette.heading(question));
        println!("{}", answer_or_na(answer));
    }
    Ok(())
}

pub(crate) fn run_move(workspace: &Workspace, args: MoveArgs) -> Result<()> {
    let mut board = Board::new(workspace.store.clone());
    let label = args.status.label().unwrap_or(args.status.as_str());
    match board.record(args.id) {
        None => {
            eprintln!("No application with id {}; nothing moved.", args.id);
            return Ok(());
        }
        Some(record) if record.status == args.status => {
            println!("Application {} is already in {label}.", args.id);
            return Ok(());
        }
        Some(_) => {}
    }
    if let Some(notice) = board.move_card(args.id, &args.status) {
        print_notice(&notice);
    }
    Ok(())
}

pub(crate) fn run_update(workspace: &Workspace, args: UpdateArgs) -> Result<()> {
    let patch = RecordPatch {
        notes: args.notes,
        status: args.status,
    };
    if patch.is_empty() {
        bail!("nothing to update; pass --notes and/or --status");
    }
    let mut board = Board::new(workspace.store.clone());
    if board.select(args.id).is_none() {
        bail!("no application with id {}", args.id);
    }
    if let Some(notice) = board.save_selection(patch) {
        print_notice(&notice);
    }
    Ok(())
}

pub(crate) fn run_export(workspace: &Workspace, args: ExportArgs) -> Result<()> {
    let dir = match args.out {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let records = workspace.store.load();
    let now_ms = chrono::Utc::now().timestamp_millis();
    // An empty collection surfaces as "No data to export." with a failing exit.
    let path = write_export(&dir, &records, now_ms)?;
    println!(
        "Exported {} applications to {}",
        records.len(),
        path.display()
    );
    Ok(())
}
