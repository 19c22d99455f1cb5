//! Database connectivity check

use crate::config::DatabaseConfig;
use crate::error::Result;
use serde::Serialize;
use sqlx::{Connection, PgConnection};
use tracing::debug;

/// Outcome of a connectivity check
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionReport {
    /// `user@host:port/database`
    pub target: String,
    pub connected: bool,
    pub server_version: Option<String>,
    pub error: Option<String>,
}

/// Try to connect to the configured database and report the outcome.
///
/// Failures are reported in the returned value rather than propagated.
pub async fn cmd_check(config: &DatabaseConfig) -> ConnectionReport {
    let target = config.display_target();
    debug!("Checking connection to {}", target);

    match probe(config).await {
        Ok(version) => ConnectionReport {
            target,
            connected: true,
            server_version: Some(version),
            error: None,
        },
        Err(e) => ConnectionReport {
            target,
            connected: false,
            server_version: None,
            error: Some(e.to_string()),
        },
    }
}

/// Connect, ask for the server version, and close.
///
/// The connection is only closed if it was opened.
async fn probe(config: &DatabaseConfig) -> Result<String> {
    let mut conn = PgConnection::connect_with(&config.connect_options()).await?;

    let version = sqlx::query_scalar::<_, String>("SELECT version()")
        .fetch_one(&mut conn)
        .await;
    let closed = conn.close().await;

    let version = version?;
    closed?;
    Ok(version)
}

/// Print the outcome of a connectivity check
pub fn print_connection_report(report: &ConnectionReport) {
    if report.connected {
        println!("Database connection successful!");
        if let Some(version) = &report.server_version {
            println!("  {}", version);
        }
    } else {
        println!(
            "Database connection failed: {}",
            report.error.as_deref().unwrap_or("unknown error")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_database_reports_failure() {
        let config = DatabaseConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            name: "postgres".to_string(),
            user: "postgres".to_string(),
            password_env: "PGRAG_TEST_UNSET_PASSWORD".to_string(),
        };

        let report = cmd_check(&config).await;

        assert!(!report.connected);
        assert!(report.server_version.is_none());
        assert!(report.error.is_some());
        assert_eq!(report.target, "postgres@127.0.0.1:1/postgres");
    }
}
