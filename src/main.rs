use clap::Parser;
use eclipse_obs::cli::{init_logging, run, Cli};
use eclipse_obs::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_file.as_deref())?;
    run(cli).await
}
