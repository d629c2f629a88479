use anyhow::Result;
use clap::Parser;
use engine_room_core::submission::NewApplication;
use engine_room_core::submission::submit;

use crate::Workspace;
use crate::output::Palette;

/// Answers from the application form. Blank required answers are rejected.
#[derive(Debug, Parser)]
pub struct SubmitArgs {
    /// Founder name.
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    /// draft, mvp, revenue or scaling.
    #[arg(long)]
    pub stage: String,

    /// The pitch.
    #[arg(long)]
    pub description: String,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub business_name: Option<String>,

    #[arg(long)]
    pub customers: Option<String>,

    #[arg(long)]
    pub revenue_model: Option<String>,

    #[arg(long)]
    pub competitors: Option<String>,

    #[arg(long)]
    pub funding: Option<String>,
}

impl From<SubmitArgs> for NewApplication {
    fn from(args: SubmitArgs) -> Self {
        NewApplication {
            name: args.name,
            email: args.email,
            phone: args.phone,
            business_name: args.business_name,
            stage: args.stage,
            description: args.description,
            customers: args.customers,
            revenue_model: args.revenue_model,
            competitors: args.competitors,
            funding: args.funding,
        }
    }
}

impl SubmitArgs {
    pub(crate) fn run(self, workspace: &Workspace) -> Result<()> {
        let record = submit(&workspace.store, self.into())?;
        let palette = Palette::stdout();
        println!(
            "{} {} ({})",
            palette.success("Application received:"),
            record.display_title(),
            record.id
        );
        Ok(())
    }
}
