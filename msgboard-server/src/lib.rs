#[macro_use]
extern crate eyre;

#[macro_use]
extern crate tracing;

mod config;
mod error;
mod logging;
mod middleware;
mod routes;
mod server;
mod state;
mod store;

#[cfg(test)]
mod tests;

use std::{process::ExitCode, sync::Arc};

use eyre::{Report, Result, WrapErr};
use msgboard_psql::Database;
use tokio::{runtime::Builder as RuntimeBuilder, signal};

pub use self::{
    config::{ServerConfig, ServiceKind},
    server::Server,
    state::AppStateBuilder,
    store::{MessageStore, PsqlMessages},
};

/// Runs the given service until Ctrl+C is received or the server fails.
pub fn run(kind: ServiceKind) -> ExitCode {
    let config = match ServerConfig::from_env(kind) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{:?}", err.wrap_err("failed to load config"));

            return ExitCode::FAILURE;
        }
    };

    let _log_worker_guard = match logging::init(kind, &config.log_dir) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("{:?}", err.wrap_err("failed to initialize logging"));

            return ExitCode::FAILURE;
        }
    };

    let runtime = match RuntimeBuilder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            error!("{:?}", Report::new(err).wrap_err("failed to build runtime"));

            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(async_main(config)) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:?}", err.wrap_err("critical error in main"));

            ExitCode::FAILURE
        }
    }
}

async fn async_main(config: ServerConfig) -> Result<()> {
    let ServerConfig {
        kind,
        port,
        database,
        table,
        container_id,
        log_dir: _,
    } = config;

    info!(service = kind.name(), table = table.as_str(), "Starting up");

    let psql = Database::new(&database);
    let store = Arc::new(PsqlMessages::new(psql, table));

    let builder = AppStateBuilder {
        kind,
        store: Arc::clone(&store) as Arc<dyn MessageStore>,
        container_id,
    };

    let (server, shutdown_tx) = Server::new(builder)?;
    let mut server = tokio::spawn(server.run(port));

    tokio::select! {
        res = &mut server => {
            store.close().await;

            return res.wrap_err("server task panicked")?;
        }
        res = signal::ctrl_c() => match res {
            Ok(_) => info!("Received Ctrl+C"),
            Err(err) => error!(?err, "Failed to await Ctrl+C"),
        }
    }

    if shutdown_tx.send(()).is_err() {
        error!("Failed to send shutdown message to server");
    }

    let res = server.await.wrap_err("server task panicked")?;
    store.close().await;
    info!("Shut down");

    res
}
