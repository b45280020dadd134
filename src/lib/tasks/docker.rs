use std::{collections::HashMap, pin::pin};

use async_trait::async_trait;
use bollard::{
    Docker,
    container::{
        CreateContainerOptions, LogsOptions, RemoveContainerOptions, StartContainerOptions,
    },
    image::CreateImageOptions,
    models::{HostConfig, RestartPolicy, RestartPolicyNameEnum},
};
use futures_util::stream::StreamExt;
use tracing::{debug, error, info, warn};

use super::{
    runtime::{ContainerRuntime, RuntimeAction, RuntimeError, RuntimeOutput, RuntimeResult},
    types::Config,
};

/// [`ContainerRuntime`] backed by the local Docker daemon.
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    client: Docker,
}

impl DockerRuntime {
    pub fn connect() -> RuntimeResult<Self> {
        let client = Docker::connect_with_local_defaults()
            .map_err(|e| RuntimeError::Connection(e.to_string()))?;
        Ok(DockerRuntime { client })
    }

    pub fn with_client(client: Docker) -> Self {
        DockerRuntime { client }
    }

    async fn pull_image(&self, image: &str) -> RuntimeResult<()> {
        info!(image, "pulling image");

        let mut stream = pin!(self.client.create_image(
            Some(CreateImageOptions {
                from_image: image.to_string(),
                ..Default::default()
            }),
            None,
            None,
        ));

        while let Some(msg) = stream.next().await {
            match msg {
                Ok(progress) => {
                    if let Some(status) = progress.status {
                        debug!(image, "{}", status);
                    }
                }
                Err(e) => {
                    error!(image, error = %e, "image pull failed");
                    return Err(RuntimeError::ImagePull {
                        image: image.to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    async fn remove_container(&self, container_id: &str, force: bool) -> RuntimeResult<()> {
        self.client
            .remove_container(
                container_id,
                Some(RemoveContainerOptions {
                    v: true,
                    force,
                    link: false,
                }),
            )
            .await
            .map_err(|e| {
                error!(container_id, error = %e, "container remove failed");
                RuntimeError::Remove {
                    container_id: container_id.to_string(),
                    message: e.to_string(),
                }
            })
    }

    async fn drain_logs(&self, container_id: &str) {
        let mut logs = pin!(self.client.logs(
            container_id,
            Some(LogsOptions::<String> {
                stdout: true,
                stderr: true,
                tail: "all".to_string(),
                ..Default::default()
            }),
        ));

        while let Some(line) = logs.next().await {
            match line {
                Ok(output) => debug!(container_id, "{}", output),
                Err(e) => {
                    debug!(container_id, error = %e, "could not read container logs");
                    break;
                }
            }
        }
    }
}

fn restart_policy(name: &str) -> RestartPolicy {
    let name = match name {
        "always" => RestartPolicyNameEnum::ALWAYS,
        "unless-stopped" => RestartPolicyNameEnum::UNLESS_STOPPED,
        "on-failure" => RestartPolicyNameEnum::ON_FAILURE,
        _ => RestartPolicyNameEnum::NO,
    };

    RestartPolicy {
        name: Some(name),
        maximum_retry_count: None,
    }
}

// Docker takes limits as i64; out-of-range values clamp rather than wrap.
fn memory_limit(bytes: u64) -> Option<i64> {
    (bytes > 0).then(|| i64::try_from(bytes).unwrap_or(i64::MAX))
}

fn nano_cpus(cpu: f64) -> Option<i64> {
    if !cpu.is_finite() || cpu <= 0.0 {
        return None;
    }
    let nanos = (cpu * 1_000_000_000.0).round();
    if nanos >= i64::MAX as f64 {
        Some(i64::MAX)
    } else {
        Some(nanos as i64).filter(|n| *n > 0)
    }
}

fn container_config(config: &Config) -> bollard::container::Config<String> {
    let host_config = HostConfig {
        restart_policy: Some(restart_policy(&config.restart_policy)),
        memory: memory_limit(config.memory),
        nano_cpus: nano_cpus(config.cpu),
        publish_all_ports: Some(true),
        ..Default::default()
    };

    let exposed_ports = config
        .exposed_ports
        .iter()
        .map(|port| (format!("{}/tcp", port), HashMap::new()))
        .collect();

    bollard::container::Config {
        image: Some(config.image.clone()),
        tty: Some(false),
        attach_stdin: Some(config.attach_stdin),
        attach_stdout: Some(config.attach_stdout),
        attach_stderr: Some(config.attach_stderr),
        env: Some(config.env.clone()),
        cmd: (!config.cmd.is_empty()).then(|| config.cmd.clone()),
        exposed_ports: Some(exposed_ports),
        host_config: Some(host_config),
        ..Default::default()
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn run(&self, config: &Config) -> RuntimeResult<RuntimeOutput> {
        self.pull_image(&config.image).await?;

        let options = Some(CreateContainerOptions {
            name: config.name.clone(),
            ..Default::default()
        });

        let created = self
            .client
            .create_container(options, container_config(config))
            .await
            .map_err(|e| {
                error!(image = %config.image, error = %e, "container create failed");
                RuntimeError::Create {
                    image: config.image.clone(),
                    message: e.to_string(),
                }
            })?;

        info!(container_id = %created.id, name = %config.name, "container created");

        if let Err(e) = self
            .client
            .start_container(&created.id, None::<StartContainerOptions<String>>)
            .await
        {
            error!(container_id = %created.id, error = %e, "container start failed");
            if let Err(cleanup) = self.remove_container(&created.id, true).await {
                warn!(container_id = %created.id, error = %cleanup, "left unstarted container behind");
            }
            return Err(RuntimeError::Start {
                container_id: created.id,
                message: e.to_string(),
            });
        }

        info!(container_id = %created.id, "container started");
        self.drain_logs(&created.id).await;

        Ok(RuntimeOutput::success(RuntimeAction::Start, created.id))
    }

    async fn stop(&self, container_id: &str) -> RuntimeResult<RuntimeOutput> {
        info!(container_id, "stopping container");

        self.client
            .stop_container(container_id, None)
            .await
            .map_err(|e| {
                error!(container_id, error = %e, "container stop failed");
                RuntimeError::Stop {
                    container_id: container_id.to_string(),
                    message: e.to_string(),
                }
            })?;

        self.remove_container(container_id, false).await?;

        info!(container_id, "container stopped and removed");
        Ok(RuntimeOutput::success(RuntimeAction::Stop, container_id))
    }
}
