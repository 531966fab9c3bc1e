#![recursion_limit = "256"]
//! # Ruka Landing Web Application
//!
//! Backend of the Ruka landing page: email subscriptions and call-back
//! requests, relayed to the CRM and announced by email.

pub mod api;
pub mod config;
pub mod consts;
pub mod front;
pub mod metric;
pub mod models;
pub mod repo;
pub mod services;

use logfire::config::MetricsOptions;
use ntex::web;
use ntex_cors::Cors;

/// CRM backend picked at start up from the configured credentials
#[derive(Clone)]
enum CrmBackend {
    Zoho(services::zoho::ZohoCrmHandler),
    Mcp(services::crm::McpCrmHandler),
}

impl CrmBackend {
    fn from_config(app_config: &config::AppConfig) -> anyhow::Result<Self> {
        match app_config.zoho_credentials() {
            Some(credentials) => Ok(CrmBackend::Zoho(services::zoho::ZohoCrmHandler::new(
                &app_config.zoho_api_url,
                &app_config.zoho_token_url,
                &credentials,
                app_config.crm_timeout(),
            )?)),
            None => {
                logfire::warn!(
                    "Zoho CRM credentials not configured, leads go through the MCP server at {url}",
                    url = app_config.crm_mcp_url.clone()
                );
                Ok(CrmBackend::Mcp(services::crm::McpCrmHandler::new(
                    &app_config.crm_mcp_url,
                    app_config.crm_timeout(),
                )?))
            }
        }
    }

    fn boxed(&self) -> services::ImplCrmService {
        match self {
            CrmBackend::Zoho(handler) => Box::new(handler.clone()),
            CrmBackend::Mcp(handler) => Box::new(handler.clone()),
        }
    }
}

#[ntex::main]
async fn main() -> anyhow::Result<()> {
    let app_config = config::init_config()?;

    // Logs and metrics are only exported when a token is configured
    let mut logfire_config = logfire::configure()
        .install_panic_handler()
        .with_metrics(Some(MetricsOptions::default()))
        .send_to_logfire(logfire::config::SendToLogfire::IfTokenPresent);
    if let Some(token) = &app_config.logfire_token {
        logfire_config = logfire_config.with_token(token);
    }
    let shutdown_handler = logfire_config.finish()?;

    // Storage is shared by every worker, the services are cloned per worker
    let lead_repo = repo::memory::InMemoryRepo::new();
    let notification_service = services::notification::NotificationHandler::from_config(app_config);
    let crm_backend = CrmBackend::from_config(app_config)?;

    configure_and_run_server(app_config, lead_repo, notification_service, crm_backend).await?;

    shutdown_handler.shutdown()?;

    Ok(())
}

/// Creates application state from the provided services
fn create_app_state(
    lead_repo: repo::memory::InMemoryRepo,
    notification_service: services::notification::NotificationHandler,
    crm_backend: &CrmBackend,
) -> front::AppState {
    front::AppState {
        repo: Box::new(lead_repo),
        notification_service: Box::new(notification_service),
        crm_service: crm_backend.boxed(),
    }
}

/// Configures and starts the web server
async fn configure_and_run_server(
    app_config: &'static config::AppConfig,
    lead_repo: repo::memory::InMemoryRepo,
    notification_service: services::notification::NotificationHandler,
    crm_backend: CrmBackend,
) -> anyhow::Result<()> {
    let server_addr = (app_config.web_server_host.as_str(), app_config.web_server_port);

    logfire::info!(
        "Ruka landing backend listening on {host}:{port} ({env})",
        host = app_config.web_server_host.clone(),
        port = app_config.web_server_port as i64,
        env = app_config.env.clone()
    );

    web::server(move || {
        let mut cors = Cors::new().allowed_methods(vec!["GET", "POST", "OPTIONS"]);
        for origin in app_config.allowed_origins() {
            cors = cors.allowed_origin(origin);
        }

        web::App::new()
            .wrap(cors.finish())
            .wrap(web::middleware::Logger::default())
            .wrap(web::middleware::Compress::default())
            .state(create_app_state(
                lead_repo.clone(),
                notification_service.clone(),
                &crm_backend,
            ))
            .configure(front::routes::api)
            .default_service(web::route().to(front::server::serve_not_found))
    })
    .bind(server_addr)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
