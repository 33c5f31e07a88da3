//! Backend entry-point: loads settings, prepares storage and serves the API.

mod server;

use std::ffi::OsString;

use color_eyre::eyre::{WrapErr, eyre};
use micropost::domain::CredentialStore;
use micropost::outbound::persistence::{DbPool, run_pending_migrations};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{AppSettings, ServerConfig, create_server, load_session_key};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os().collect::<Vec<OsString>>())
        .map_err(|err| eyre!("failed to load configuration: {err}"))?;

    let key = load_session_key(&settings)?;
    let credentials =
        CredentialStore::new(settings.bcrypt_cost()).wrap_err("invalid bcrypt cost")?;
    let bind_addr = settings.bind_addr().wrap_err("invalid bind address")?;

    let mut config = ServerConfig::new(key, bind_addr, credentials, settings.max_post_chars())
        .with_cookie_secure(settings.cookie_secure());

    match settings.database_url.as_deref() {
        Some(url) => {
            let applied = run_pending_migrations(url).await?;
            info!(applied, "database migrations complete");
            let pool = DbPool::new(settings.pool_config(url)).await?;
            config = config.with_db_pool(pool);
        }
        None => warn!("no database URL configured; state is kept in memory"),
    }

    create_server(config)?.await?;
    Ok(())
}
