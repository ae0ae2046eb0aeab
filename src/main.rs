use clap::Parser;

use matterdesk::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    matterdesk::logging::init("matterdesk=info", cli.log_json);
    cli::run(cli).await
}
