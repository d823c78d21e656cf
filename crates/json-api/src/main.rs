//! Innkeep JSON API Server
//!
//! HTTP surface for point-of-sale terminals: identify scanned customers,
//! register new ones, validate and apply promos, record completed sales,
//! and sync customer data for offline caching. Every route except the
//! healthcheck is scoped to a venue by its API key.

use std::process;

use salvo::{
    affix_state::inject,
    oapi::{
        OpenApi,
        security::{Http, HttpAuthScheme, SecurityScheme},
        swagger_ui::SwaggerUi,
    },
    prelude::*,
    trailing_slash::remove_slash,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use innkeep_app::context::{AppConfig, AppContext};

use crate::{
    config::{ServerConfig, logging::LogFormat},
    state::State,
};

mod auth;
mod config;
mod customers;
mod extensions;
mod healthcheck;
mod promos;
mod shutdown;
mod state;
#[cfg(test)]
mod test_helpers;
mod transactions;

/// Innkeep JSON API Server entry point
///
/// # Panics
///
/// Panics if the server fails to bind or serve requests
#[tokio::main]
pub async fn main() {
    // Load configuration from .env and CLI arguments
    let config = ServerConfig::load().unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for config errors"
        )]
        {
            eprintln!("Configuration error: {e}");
        }

        process::exit(1);
    });

    // Initialize logging
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.log_level));

    match config.logging.log_format {
        LogFormat::Compact => tracing_subscriber::fmt().with_env_filter(env_filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init(),
    }

    let addr = config.socket_addr();

    info!("Starting server on {addr}");

    // Bind server
    let listener = TcpListener::new(addr).bind().await;

    let app_config = AppConfig {
        strict_promo_usage: config.engine.strict_promo_usage,
    };

    let app = match AppContext::from_database_url(&config.database.database_url, app_config).await {
        Ok(app) => app,
        Err(init_error) => {
            error!("failed to initialize app context: {init_error}");

            process::exit(1);
        }
    };

    let router = Router::new()
        .hoop(CatchPanic::new())
        .hoop(remove_slash())
        .hoop(inject(State::from_app_context(app)))
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(
            Router::new()
                .hoop(auth::middleware::handler)
                .push(Router::with_path("identify").post(customers::identify::handler))
                .push(Router::with_path("register").post(customers::register::handler))
                .push(
                    Router::with_path("customers").push(
                        Router::with_path("{customer}").push(
                            Router::with_path("identifiers")
                                .post(customers::add_identifier::handler),
                        ),
                    ),
                )
                .push(Router::with_path("sync").get(customers::sync::handler))
                .push(Router::with_path("transactions").post(transactions::create::handler))
                .push(
                    Router::with_path("promos")
                        .push(Router::with_path("validate").post(promos::validate::handler))
                        .push(Router::with_path("apply").post(promos::apply::handler)),
                ),
        );

    let doc = OpenApi::new("Innkeep API", "0.1.0")
        .add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
        .merge_router(&router);

    let router = router
        .push(doc.into_router("/api-doc/openapi.json"))
        .push(SwaggerUi::new("/api-doc/openapi.json").into_router("docs"));

    let server = Server::new(listener);

    let handle = server.handle();

    // Listen for shutdown signal
    tokio::spawn(async move {
        if let Err(error) = shutdown::listen(handle).await {
            error!("failed to listen for shutdown signal: {error}");
        }
    });

    // Start serving requests
    server.serve(router).await;
}
