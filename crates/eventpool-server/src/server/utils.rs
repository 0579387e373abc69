use anyhow::{Context, Result};
use eventpool::DispatcherConfig;
use std::ops::RangeInclusive;
use std::path::Path;
use std::result;
use tokio::signal;

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, no longer accepting connections");
}

const PORT_RANGE: RangeInclusive<u16> = 1..=65535;

pub fn port_in_range(s: &str) -> result::Result<u16, String> {
    let port: u16 = s
        .parse()
        .map_err(|_| format!("`{s}` isn't a port number"))?;
    if PORT_RANGE.contains(&port) {
        Ok(port)
    } else {
        Err(format!(
            "port not in range {}-{}",
            PORT_RANGE.start(),
            PORT_RANGE.end()
        ))
    }
}

/// Read a JSON dispatcher config. Fields left out take their defaults.
pub fn load_config(path: &Path) -> Result<DispatcherConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    DispatcherConfig::from_json(&json)
        .with_context(|| format!("Invalid config file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_in_range() {
        assert_eq!(port_in_range("8080"), Ok(8080));
        assert!(port_in_range("0").is_err());
        assert!(port_in_range("http").is_err());
        assert!(port_in_range("70000").is_err());
    }

    #[test]
    fn test_load_config() {
        let path = std::env::temp_dir().join(format!("eventpool-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "workers": 2, "backpressure": "reject" }"#).unwrap();

        let config = load_config(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.workers, 2);
        assert_eq!(config.capacity, 100);
        assert_eq!(config.enqueue_policy().unwrap(), eventpool::EnqueuePolicy::Reject);
    }

    #[test]
    fn test_load_missing_config() {
        let err = load_config(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read config file"));
    }
}
