//! HTTP surface: product ranking plus informational routes.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, info_span, Instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ReviewError;
use crate::models::RankedProduct;
use crate::pipeline::ReviewPipeline;
use crate::ranking::assemble;

pub struct AppState {
    pub pipeline: ReviewPipeline,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/help", get(help))
        .route("/health", get(health))
        .route("/product/:product_id", get(get_product))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn index() -> &'static str {
    "Hello there!"
}

pub async fn help() -> &'static str {
    "Active routes\n\n/product/{productId}\n/health\n/review-ranker-swagger\n"
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "reviews"
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Fetches, annotates and ranks the reviews of a product.
#[utoipa::path(
    get,
    path = "/product/{product_id}",
    params(("product_id" = String, Path, description = "Retail product identifier")),
    responses(
        (status = 200, description = "Ranked reviews", body = RankedProduct),
        (status = 502, description = "Review source failed", body = crate::error::ErrorResponse),
        (status = 503, description = "Text analytics failed", body = crate::error::ErrorResponse),
        (status = 500, description = "Analytics batch cap misconfigured", body = crate::error::ErrorResponse)
    ),
    tag = "reviews"
)]
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<String>,
) -> Result<Json<RankedProduct>, ReviewError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("product", %product_id, %request_id);

    async move {
        match state.pipeline.run(&product_id).await {
            Ok(ranked) => {
                info!(
                    reviews = ranked.reviews.len(),
                    good = ranked.good_comments.len(),
                    bad = ranked.bad_comments.len(),
                    "✅ Product retrieved"
                );
                Ok(assemble(ranked))
            }
            Err(e) => {
                error!(kind = e.kind(), error = %e, "❌ product request failed");
                Err(e)
            }
        }
    }
    .instrument(span)
    .await
}
