mod auth;
mod config;
mod doc;
mod dtos;
mod error;
mod routes;
mod state;
mod utils;

use crate::{
    auth::KeycloakClaims,
    config::Config,
    doc::ApiDoc,
    routes::{change_request, course, form, health, module, semester},
    state::AppState,
    utils::shutdown::shutdown_signal,
};
use axum::{
    Router,
    routing::{delete, get, post},
};
use database::db::create_connection;
use log::info;
use migration::{Migrator, MigratorTrait};
use std::error::Error;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_oauth2_resource_server::server::OAuth2ResourceServer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/modules", get(module::list_modules))
        .route("/modules/search", get(module::search_modules))
        .route("/modules/semester/{semester}", get(module::modules_by_semester))
        .route("/modules/{id}", get(module::get_module))
        .route("/semesters", get(semester::get_semesters))
}

fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(routes::auth::me))
        .route("/admin/modules", get(module::list_all_modules))
        .route("/courses/{id}", get(course::get_course))
        .route("/courses/semester/{semester}", get(course::courses_by_semester))
        .route("/modules", post(change_request::submit_creation))
        .route("/modules/form", get(form::blank_form))
        .route("/modules/preview", post(form::preview_module))
        .route("/modules/{id}", post(change_request::submit_modification))
        .route("/modules/{id}/form", get(form::module_form))
        .route("/modules/{id}/history", get(change_request::module_history))
        .route("/change-requests", get(change_request::list_pending))
        .route("/change-requests/{id}", get(change_request::get_change_request))
        .route("/change-requests/{id}/approve", post(change_request::approve))
        .route("/semester-tags", post(semester::tag_course))
        .route("/semester-tags/delete", post(semester::untag_course))
        .route("/semesters/{semester}", delete(semester::drop_semester))
}

async fn run() -> Result<(), Box<dyn Error>> {
    let config = Config::from_env()?;

    let db = create_connection(&config.database_url).await?;
    Migrator::up(&db, None).await?;
    info!("Database migrations applied");

    let mut builder =
        <OAuth2ResourceServer<KeycloakClaims>>::builder().issuer_url(config.oidc_issuer_url.as_str());
    if let Some(audience) = &config.oidc_audience {
        builder = builder.audiences(&[audience]);
    }
    let oauth2_resource_server = builder
        .build()
        .await
        .map_err(|e| format!("Failed to build OAuth2ResourceServer: {e:?}"))?;

    let app = Router::new()
        .merge(public_routes())
        .merge(
            protected_routes()
                .route_layer(ServiceBuilder::new().layer(oauth2_resource_server.into_layer())),
        )
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CompressionLayer::new())
        .with_state(AppState::new(db));

    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    info!("Running axum on http://{}", config.bind_address);
    info!("API documentation at http://{}/docs", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run().await {
        log::error!("{e}");
        std::process::exit(1);
    }
}
