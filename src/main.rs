use std::process::ExitCode;

use cicd_backend::{App, Config, Error, Server, routes, telemetry};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    telemetry::init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "startup_failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Error> {
    let config = Config::from_env()?;
    let router = routes::router(&config)?;
    let server = Server::bind(config.addr()).await?;

    server.serve(App::new(config, router)).await
}
