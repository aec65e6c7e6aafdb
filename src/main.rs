use anyhow::Result;
use clap::Parser;

use treepad::config::Config;
use treepad::logging;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = Config::parse();
    let _guard = match &config.log_file {
        Some(path) => Some(logging::init(path)?),
        None => None,
    };

    let res = treepad::run(config).await;
    if let Err(err) = &res {
        let reason = format!("{err:#}");
        tracing::error!(error = %reason, "editor exited with error");
    }
    res
}
