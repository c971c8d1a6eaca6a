//! Server and password hashing command implementations

use std::path::Path;

use anyhow::{Context, Result};
use burnrate_core::BurnRateConfig;
use burnrate_server::{ServerConfig, API_KEYS_ENV, JWT_SECRET_ENV, PASSWORD_HASH_ENV};

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    engine: BurnRateConfig,
    host: &str,
    port: u16,
    no_auth: bool,
    no_encrypt: bool,
    static_dir: Option<&Path>,
) -> Result<()> {
    println!("🚀 Starting Burn Rate web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    let config = ServerConfig::from_env(!no_auth, engine);

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else {
        if config.password_hash.is_some() && config.jwt_secret.is_some() {
            println!("   🔐 Authentication: password login ({})", PASSWORD_HASH_ENV);
        } else {
            println!(
                "   🔒 Password login disabled: set {} and {}",
                PASSWORD_HASH_ENV, JWT_SECRET_ENV
            );
        }
        if !config.api_keys.is_empty() {
            println!(
                "   🔑 API keys: {} configured ({})",
                config.api_keys.len(),
                API_KEYS_ENV
            );
        }
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    // Seeding is idempotent
    db.seed_defaults(&config.engine)
        .context("Failed to seed default categories")?;

    let static_dir_str = static_dir
        .map(|p| {
            p.to_str()
                .ok_or_else(|| anyhow::anyhow!("Static dir path is not valid UTF-8"))
        })
        .transpose()?;
    burnrate_server::serve_with_config(db, host, port, static_dir_str, config).await?;

    Ok(())
}

pub fn cmd_hash_password(password: &str) -> Result<()> {
    if password.is_empty() {
        anyhow::bail!("Password cannot be empty");
    }

    let hash = burnrate_server::hash_password(password)?;

    println!("{}", hash);
    eprintln!();
    eprintln!("Set it for the server with:");
    eprintln!("  export {}='{}'", PASSWORD_HASH_ENV, hash);

    Ok(())
}
