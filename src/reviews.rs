//! Review source: fetches a product's customer reviews from the retail API.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Result, ReviewError};
use crate::models::RawReview;
use crate::outbound::send_with_retry;

#[async_trait]
pub trait ReviewSource: Send + Sync {
    /// Reviews for `product_id` in upstream order.
    async fn fetch(&self, product_id: &str) -> Result<Vec<RawReview>>;
}

#[derive(Debug, Deserialize)]
struct ReviewPage {
    reviews: Vec<UpstreamReview>,
}

/// Fields are loosely typed so one bad review does not reject the page.
#[derive(Debug, Deserialize)]
struct UpstreamReview {
    #[serde(default)]
    comment: Option<Value>,
    #[serde(default)]
    rating: Option<Value>,
}

/// Parses a retail API review page, keeping at most `page_size` reviews.
///
/// Reviews without a string `comment` or a numeric `rating` are dropped.
pub fn parse_reviews(body: &[u8], page_size: usize) -> Result<Vec<RawReview>> {
    let page: ReviewPage = serde_json::from_slice(body)
        .map_err(|e| ReviewError::MalformedUpstreamPayload(e.to_string()))?;

    let mut reviews = Vec::with_capacity(page.reviews.len().min(page_size));
    for (position, review) in page.reviews.into_iter().enumerate() {
        if reviews.len() == page_size {
            debug!(page_size, "review page longer than requested, ignoring the rest");
            break;
        }

        let text = review.comment.as_ref().and_then(Value::as_str);
        let rating = review.rating.as_ref().and_then(Value::as_f64);
        match (text, rating) {
            (Some(text), Some(rating)) => reviews.push(RawReview::new(text, rating)),
            _ => warn!(
                position,
                has_comment = text.is_some(),
                has_rating = rating.is_some(),
                "dropping review with missing fields"
            ),
        }
    }

    Ok(reviews)
}

/// Review source backed by the retail review API.
#[derive(Debug, Clone)]
pub struct HttpReviewSource {
    client: reqwest::Client,
    base_url: String,
    page_size: usize,
    source: String,
}

impl HttpReviewSource {
    pub fn new(client: reqwest::Client, config: &Config) -> Self {
        Self {
            client,
            base_url: config.review_api_base.trim_end_matches('/').to_string(),
            page_size: config.review_page_size,
            source: config.review_source.clone(),
        }
    }
}

#[async_trait]
impl ReviewSource for HttpReviewSource {
    async fn fetch(&self, product_id: &str) -> Result<Vec<RawReview>> {
        let url = format!("{}/reviews/{}", self.base_url, urlencoding::encode(product_id));
        let page_size = self.page_size.to_string();

        let response = send_with_retry("review source", || {
            self.client.get(&url).query(&[
                ("page", "1"),
                ("pagesize", page_size.as_str()),
                ("source", self.source.as_str()),
            ])
        })
        .await
        .map_err(|e| ReviewError::UpstreamUnavailable(e.to_string()))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| ReviewError::UpstreamUnavailable(format!("reading body: {}", e)))?;

        let reviews = parse_reviews(&body, self.page_size)?;
        debug!(product_id, count = reviews.len(), "fetched reviews");
        Ok(reviews)
    }
}
