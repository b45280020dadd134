use std::sync::Arc;

use anyhow::Context;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cube::{
    config::WorkerConfig,
    tasks::docker::DockerRuntime,
    worker::{api::TaskServer, types::Worker, worker::run_tasks},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = WorkerConfig::from_env().context("invalid worker configuration")?;
    let runtime = DockerRuntime::connect().context("could not reach the docker daemon")?;

    let worker = Arc::new(Mutex::new(Worker::new(&config.name, Arc::new(runtime))));
    info!(worker = %config.name, "worker starting");

    tokio::spawn(run_tasks(worker.clone(), config.poll_interval));

    TaskServer::new(worker, &config.address, config.port)
        .start_server()
        .await
        .context("worker API stopped")?;

    Ok(())
}
