use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::gateway::Gateway;

const TABLES: &[&str] = &["users", "posts", "comments"];

/// Connectivity and configuration diagnostics. Runs every check it can,
/// reports each one, and exits nonzero if any failed.
pub async fn run(config: &Config) -> AppResult<()> {
    let mut healthy = true;

    let url = match config.gateway_url() {
        Ok(url) => {
            println!("ok   gateway URL: {url}");
            Some(url)
        }
        Err(e) => {
            println!("FAIL {e}");
            healthy = false;
            None
        }
    };
    let key = match config.gateway_key() {
        Ok(key) => {
            println!("ok   gateway API key is set");
            Some(key)
        }
        Err(e) => {
            println!("FAIL {e}");
            healthy = false;
            None
        }
    };

    if let (Some(url), Some(key)) = (url, key) {
        let gateway = Gateway::new(url, key)?;

        match gateway.auth_reachable().await {
            Ok(()) => println!("ok   auth service reachable"),
            Err(e) => {
                println!("FAIL auth service unreachable: {e}");
                healthy = false;
            }
        }

        for table in TABLES {
            if !check_table(&gateway, table).await {
                healthy = false;
            }
        }
    } else {
        println!("     (skipping connectivity checks until the gateway is configured)");
    }

    if healthy {
        println!("All checks passed.");
        Ok(())
    } else {
        Err(AppError::Internal("diagnostics found problems".into()))
    }
}

async fn check_table(gateway: &Gateway, table: &'static str) -> bool {
    match gateway
        .from(table)
        .limit(1)
        .select::<serde_json::Value>()
        .await
    {
        Ok(_) => {
            println!("ok   table {table} accessible");
            true
        }
        Err(AppError::Forbidden(reason)) => {
            println!("FAIL table {table} exists but is blocked by an access policy: {reason}");
            false
        }
        Err(AppError::NotFound) => {
            println!("FAIL table {table} does not exist");
            false
        }
        Err(e) => {
            println!("FAIL table {table} check errored: {e}");
            false
        }
    }
}
