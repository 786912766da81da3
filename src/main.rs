use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod models;
mod services;

use auth::rate_limit::RateLimitState;
use config::Config;
use services::rotation::TipSessions;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub rate_limiter: RateLimitState,
    pub tip_sessions: TipSessions,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bemestar_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env());

    // Database
    let db = db::create_pool(&config.database_url, config.database_max_connections).await;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations applied");

    let state = AppState {
        db,
        config: config.clone(),
        rate_limiter: RateLimitState::new(),
        tip_sessions: TipSessions::new(),
    };

    // Start rate-limit cleanup worker (purges stale windows every 5 min)
    auth::rate_limit::spawn_cleanup_worker(state.rate_limiter.clone());

    // Auth routes with rate limiting
    let auth_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/refresh", post(handlers::auth::refresh))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::rate_limit::rate_limit_auth,
        ));

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .merge(auth_routes);

    let protected_routes = Router::new()
        .route("/api/me", get(handlers::auth::me))
        .route("/api/auth/logout", post(handlers::auth::logout))
        // Habits
        .route("/api/habito", get(handlers::habits::list_habits))
        .route("/api/habito", post(handlers::habits::create_habit))
        .route("/api/habito/:id", get(handlers::habits::get_habit))
        .route("/api/habito/:id", put(handlers::habits::update_habit))
        .route("/api/habito/:id", delete(handlers::habits::delete_habit))
        .route(
            "/api/habito/:id/toggle",
            post(handlers::completions::toggle_completion),
        )
        .route("/api/habito/:id/grid", get(handlers::completions::get_grid))
        .route(
            "/api/habito/:id/streak",
            get(handlers::completions::get_streak),
        )
        // Mood
        .route("/api/humor", get(handlers::moods::list_moods))
        .route("/api/humor", post(handlers::moods::create_mood))
        .route("/api/humor/today", get(handlers::moods::today_mood))
        .route("/api/humor/:id", put(handlers::moods::update_mood))
        .route("/api/humor/:id", delete(handlers::moods::delete_mood))
        // Tips
        .route("/api/dica", get(handlers::tips::list_tips))
        .route("/api/dica", post(handlers::tips::create_tip))
        .route("/api/dica/:id", delete(handlers::tips::delete_tip))
        // Gratitude
        .route("/api/gratidao", get(handlers::entries::list_gratitude))
        .route("/api/gratidao", post(handlers::entries::create_gratitude))
        .route(
            "/api/gratidao/:id",
            delete(handlers::entries::delete_gratitude),
        )
        // Affirmations
        .route("/api/afirmacao", get(handlers::entries::list_affirmations))
        .route(
            "/api/afirmacao",
            post(handlers::entries::create_affirmations),
        )
        .route(
            "/api/afirmacao/:id",
            delete(handlers::entries::delete_affirmation),
        )
        // Journal
        .route("/api/diario", get(handlers::journal::list_journal))
        .route("/api/diario", post(handlers::journal::create_journal))
        .route("/api/diario/:id", put(handlers::journal::update_journal))
        .route("/api/diario/:id", delete(handlers::journal::delete_journal))
        // Tasks
        .route("/api/tarefa", get(handlers::tasks::list_tasks))
        .route("/api/tarefa", post(handlers::tasks::create_task))
        .route("/api/tarefa/categoria", get(handlers::tasks::list_categories))
        .route(
            "/api/tarefa/categoria",
            post(handlers::tasks::create_category),
        )
        .route(
            "/api/tarefa/categoria/:id",
            delete(handlers::tasks::delete_category),
        )
        .route("/api/tarefa/:id", put(handlers::tasks::update_task))
        .route("/api/tarefa/:id", delete(handlers::tasks::delete_task))
        .route("/api/tarefa/:id/toggle", post(handlers::tasks::toggle_task))
        // Reports
        .route("/api/relatorios/humor", get(handlers::reports::mood_report))
        .route(
            "/api/relatorios/habito",
            get(handlers::reports::habit_report),
        )
        .route("/api/relatorios/csv", get(handlers::reports::export_csv))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    let allowed_origins: Vec<axum::http::HeaderValue> = {
        let mut origins = vec![config
            .frontend_url
            .parse::<axum::http::HeaderValue>()
            .expect("FRONTEND_URL must be a valid origin")];
        // In dev, also allow LAN access (e.g. testing from another device)
        if let Ok(extra) = std::env::var("CORS_EXTRA_ORIGINS") {
            for o in extra.split(',') {
                if let Ok(hv) = o.trim().parse::<axum::http::HeaderValue>() {
                    origins.push(hv);
                }
            }
        }
        origins
    };
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listen address");
    // Connect info provides the client IP for rate limiting
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .expect("Server error");
}
