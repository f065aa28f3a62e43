mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::auth;
use crate::features::chat::{routes as chat_routes, ChatArchiveWorker, ChatService};
use crate::features::collaborations::{routes as collaborations_routes, CollaborationService};
use crate::features::donations::{routes as donations_routes, DonationService};
use crate::features::events::{routes as events_routes, EventService};
use crate::features::issues::{routes as issues_routes, IssueService};
use crate::features::jobs::{routes as jobs_routes, JobService};
use crate::features::notifications::handlers::LiveState;
use crate::features::notifications::{
    routes as notifications_routes, JobReminderWorker, NotificationDispatcher,
    NotificationService,
};
use crate::features::users::{routes as users_routes, UserService};
use crate::modules::email::EmailClient;
use crate::modules::live::LiveHub;
use axum::extract::DefaultBodyLimit;
use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );

    tracing::info!("Configuration loaded successfully");

    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    tracing::info!("Running database migrations...");
    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Initialize auth
    let jwks_client = Arc::new(auth::JwksClient::new(
        &config.auth.issuer,
        config.auth.jwks_cache_ttl,
    ));
    let jwt_validator = Arc::new(auth::JwtValidator::new(
        jwks_client,
        config.auth.issuer.clone(),
        config.auth.audience.clone(),
        config.auth.jwt_leeway,
    ));
    tracing::info!("Auth configuration initialized");

    // Live push hub shared by notifications, chat and the websocket endpoint
    let live_hub = LiveHub::new();

    let email_client = Arc::new(
        EmailClient::new(config.email.clone())
            .map_err(|e| anyhow::anyhow!("Failed to initialize email client: {}", e))?,
    );
    if email_client.is_enabled() {
        tracing::info!("Email client initialized (sender: {})", config.email.from);
    } else {
        tracing::warn!("Email delivery disabled (EMAIL_API_URL or EMAIL_API_KEY not set)");
    }

    let user_service = Arc::new(UserService::new(pool.clone()));
    tracing::info!("User service initialized");

    let notification_service = Arc::new(NotificationService::new(
        pool.clone(),
        live_hub.clone(),
    ));
    let dispatcher = Arc::new(NotificationDispatcher::new(
        Arc::clone(&notification_service),
        Arc::clone(&user_service),
        Arc::clone(&email_client),
        config.app.frontend_url.clone(),
    ));
    tracing::info!("Notification services initialized");

    let issue_service = Arc::new(IssueService::new(
        pool.clone(),
        Arc::clone(&user_service),
        Arc::clone(&dispatcher),
    ));
    tracing::info!("Issue service initialized");

    let event_service = Arc::new(EventService::new(pool.clone()));
    tracing::info!("Event service initialized");

    let collaboration_service = Arc::new(CollaborationService::new(
        pool.clone(),
        Arc::clone(&issue_service),
        Arc::clone(&user_service),
        Arc::clone(&dispatcher),
    ));
    tracing::info!("Collaboration service initialized");

    let job_service = Arc::new(JobService::new(
        pool.clone(),
        Arc::clone(&issue_service),
        Arc::clone(&dispatcher),
    ));
    tracing::info!("Job service initialized");

    let chat_service = Arc::new(ChatService::new(
        pool.clone(),
        Arc::clone(&issue_service),
        Arc::clone(&user_service),
        live_hub.clone(),
    ));
    tracing::info!("Chat service initialized");

    let donation_service = Arc::new(DonationService::new(
        pool.clone(),
        Arc::clone(&user_service),
        Arc::clone(&dispatcher),
    ));
    tracing::info!("Donation service initialized");

    // Spawn background workers
    let job_reminder = JobReminderWorker::new(
        Arc::clone(&job_service),
        Arc::clone(&user_service),
        Arc::clone(&dispatcher),
        config.workers.job_reminder_interval,
        config.workers.job_reminder_window_days,
    );
    tokio::spawn(async move {
        job_reminder.run().await;
    });
    tracing::info!("Job reminder worker spawned");

    let chat_archiver = ChatArchiveWorker::new(
        Arc::clone(&chat_service),
        config.workers.chat_archive_interval,
        config.workers.chat_archive_days,
    );
    tokio::spawn(async move {
        chat_archiver.run().await;
    });
    tracing::info!("Chat archive worker spawned");

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Protected routes (require JWT authentication)
    let protected_routes = Router::new()
        .merge(users_routes::routes(Arc::clone(&user_service)))
        .merge(issues_routes::routes(Arc::clone(&issue_service)))
        .merge(events_routes::routes(event_service))
        .merge(collaborations_routes::routes(collaboration_service))
        .merge(notifications_routes::routes(notification_service))
        .merge(jobs_routes::routes(job_service))
        .merge(chat_routes::routes(chat_service))
        .merge(donations_routes::routes(donation_service))
        .route_layer(axum::middleware::from_fn_with_state(
            jwt_validator.clone(),
            middleware::auth_middleware,
        ));

    // Websocket authenticates from its query string, outside the bearer layer
    let live_routes = notifications_routes::live_routes(LiveState {
        hub: live_hub,
        validator: jwt_validator,
    });

    // Simple health check endpoint (no auth required)
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(live_routes)
        .merge(health_route)
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    socket.set_recv_buffer_size(256 * 1024)?;
    socket.set_send_buffer_size(256 * 1024)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(65535)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
