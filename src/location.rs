use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use log::{debug, warn};
use thiserror::Error;
use tokio::process::Command;

use crate::config::LocationConfig;
use crate::geo::Coordinates;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum LocationError {
    #[error("location capability unavailable on this host")]
    Unsupported,
    #[error("location acquisition failed: {0}")]
    AcquisitionFailed(String),
}

/// The host's "where am I" query. Suspends until the host answers.
pub trait LocationProvider: Send + Sync {
    fn acquire(&self) -> impl Future<Output = Result<Coordinates, LocationError>> + Send;
}

/// Host-backed provider selected from the `[location]` config table.
#[derive(Debug, Clone)]
pub enum HostLocation {
    Unsupported,
    Fixed(Coordinates),
    Command { command: String, timeout: Duration },
}

impl HostLocation {
    /// A command takes precedence over fixed coordinates; neither means unsupported.
    pub fn from_config(config: Option<&LocationConfig>) -> Self {
        let Some(config) = config else {
            return HostLocation::Unsupported;
        };
        if let Some(command) = &config.command {
            return HostLocation::Command {
                command: command.clone(),
                timeout: Duration::from_secs(config.timeout_seconds.unwrap_or(10)),
            };
        }
        match (config.latitude, config.longitude) {
            (Some(lat), Some(lon)) => match Coordinates::new(lat, lon) {
                Some(coords) => HostLocation::Fixed(coords),
                None => {
                    warn!(
                        "Configured observer position {}, {} is out of range, location disabled",
                        lat, lon
                    );
                    HostLocation::Unsupported
                }
            },
            _ => HostLocation::Unsupported,
        }
    }
}

impl LocationProvider for HostLocation {
    async fn acquire(&self) -> Result<Coordinates, LocationError> {
        match self {
            HostLocation::Unsupported => Err(LocationError::Unsupported),
            HostLocation::Fixed(coords) => Ok(*coords),
            HostLocation::Command { command, timeout } => run_command(command, *timeout).await,
        }
    }
}

async fn run_command(command: &str, timeout: Duration) -> Result<Coordinates, LocationError> {
    debug!("Running location command: {}", command);
    let mut cmd = Command::new("sh");
    cmd.arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = tokio::time::timeout(timeout, cmd.output())
        .await
        .map_err(|_| LocationError::AcquisitionFailed(format!("timed out after {:?}", timeout)))?
        .map_err(|e| LocationError::AcquisitionFailed(format!("could not run command: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(LocationError::AcquisitionFailed(format!(
            "command exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    let coords: Coordinates = serde_json::from_slice(&output.stdout)
        .map_err(|e| LocationError::AcquisitionFailed(format!("unreadable position: {}", e)))?;
    if !coords.is_valid() {
        return Err(LocationError::AcquisitionFailed(format!(
            "position out of range: {}, {}",
            coords.latitude, coords.longitude
        )));
    }
    Ok(coords)
}
