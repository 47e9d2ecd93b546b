use std::{error::Error, sync::Arc};

use tracing_subscriber::EnvFilter;
use url::Url;

use crate::{
    backend::GraphqlBackend,
    config::Config,
    service::{RedeemService, RedeemSettings},
};

mod backend;
mod config;
mod cookies;
mod handlers;
mod redirect;
mod requests;
mod responses;
mod service;

pub struct Services {
    pub redeemer: RedeemService,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::read_env();

    let backend = GraphqlBackend::new(&config.backend_url, config.backend_timeout)?;
    let settings = RedeemSettings {
        app_origin: Url::parse(&config.app_origin)?,
        default_redirect_path: config.default_redirect_path,
        auth_path: config.auth_path,
        cookie_secure: config.cookie_secure,
    };

    let services = Arc::new(Services {
        redeemer: RedeemService::new(Arc::new(backend), settings),
    });

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "listening");

    axum::serve(listener, handlers::router(services)).await?;

    Ok(())
}
