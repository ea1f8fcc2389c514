//! Swellspot - surf spot discovery and session sharing backend

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swellspot::{
    api::{self, AppState},
    cache::ForecastCache,
    config::Config,
    db::{
        self,
        repositories::{
            PgCommentRepository, PgPostRepository, PgSessionRepository, PgSpotRepository,
            PgTipRepository, PgUserRepository,
        },
    },
    services::{
        CommentService, GeocodeService, OpenMeteoFetcher, OpenMeteoGeocoder, PostService,
        SpotService, TipService, UserService, WeatherService,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "swellspot=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Swellspot...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected");

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Create repositories
    let user_repo = PgUserRepository::boxed(pool.clone());
    let session_repo = PgSessionRepository::boxed(pool.clone());
    let spot_repo = PgSpotRepository::boxed(pool.clone());
    let post_repo = PgPostRepository::boxed(pool.clone());
    let comment_repo = PgCommentRepository::boxed(pool.clone());
    let tip_repo = PgTipRepository::boxed(pool.clone());

    // Shared HTTP client for the Open-Meteo APIs
    let http_client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()?;

    // Initialize services
    let user_service = Arc::new(UserService::with_session_ttl(
        user_repo,
        session_repo,
        chrono::Duration::days(config.session.ttl_days),
    ));
    let weather_service = Arc::new(WeatherService::new(
        ForecastCache::new(
            std::time::Duration::from_secs(config.weather.freshness_seconds),
            config.weather.max_entries,
        ),
        Arc::new(OpenMeteoFetcher::new(http_client.clone())),
    ));
    let spot_service = Arc::new(SpotService::new(spot_repo.clone(), weather_service.clone()));
    let post_service = Arc::new(PostService::new(post_repo.clone()));
    let comment_service = Arc::new(CommentService::new(comment_repo, post_repo));
    let tip_service = Arc::new(TipService::new(tip_repo, spot_repo));
    let geocode_service = Arc::new(GeocodeService::new(Arc::new(OpenMeteoGeocoder::new(
        http_client,
    ))));

    // Build application state
    let state = AppState {
        user_service: user_service.clone(),
        spot_service,
        post_service,
        comment_service,
        tip_service,
        weather_service,
        geocode_service,
        upload_config: Arc::new(config.upload.clone()),
    };

    // Expired session sweeper (runs every 5 minutes)
    {
        let user_service = user_service.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(300));
            loop {
                interval.tick().await;
                match user_service.cleanup_expired_sessions().await {
                    Ok(0) => {}
                    Ok(n) => tracing::info!("Removed {} expired sessions", n),
                    Err(e) => tracing::warn!("Session cleanup failed: {}", e),
                }
            }
        });
    }

    // Build router
    let app = api::build_router(state, &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
