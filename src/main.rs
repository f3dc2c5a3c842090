use axum::Router;
use dotenv::dotenv;
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use review_ranker::analytics::HttpTextAnalytics;
use review_ranker::api::{self, AppState};
use review_ranker::config::Config;
use review_ranker::pipeline::ReviewPipeline;
use review_ranker::reviews::HttpReviewSource;

#[derive(OpenApi)]
#[openapi(
    paths(api::get_product, api::health),
    components(
        schemas(
            review_ranker::models::RankedProduct,
            review_ranker::models::ScoredReview,
            review_ranker::models::AttributeCounts,
            review_ranker::error::ErrorResponse,
            api::HealthResponse
        )
    ),
    tags(
        (name = "reviews", description = "Product Review Ranking API")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    if config.analytics_key.is_empty() {
        warn!("⚠️ ANALYTICS_KEY is not set, analytics calls will likely be rejected");
    }

    let client = reqwest::Client::builder().timeout(config.http_timeout).build()?;
    let source = HttpReviewSource::new(client.clone(), &config);
    let analytics = HttpTextAnalytics::new(client, &config);
    let pipeline = ReviewPipeline::new(Arc::new(source), Arc::new(analytics), &config);

    let state = Arc::new(AppState { pipeline });

    let app = Router::new()
        .merge(SwaggerUi::new("/review-ranker-swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api::router(state));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("🚀 Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
