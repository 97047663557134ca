//! Serve command - run the build server until stopped

use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::error::StagehandResult;
use crate::server::BuildServer;

/// Execute the serve command
pub async fn execute(args: ServeArgs, config: &Config) -> StagehandResult<()> {
    let mut config = config.clone();
    if let Some(port) = args.port {
        config.server.port = port;
    }

    BuildServer::new(config).run().await
}
