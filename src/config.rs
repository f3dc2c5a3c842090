//! Environment-backed configuration.
//!
//! Every setting has a default; override with the environment variables named
//! in the `ENV_*` constants (a `.env` file is honoured by the binary).

use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::attributes::AttributeDictionary;
use crate::error::ConfigError;
use crate::scoring::ScoreWeights;

pub const DEFAULT_REVIEW_API_BASE: &str = "http://www.bestbuy.ca/api/v2/json";
pub const DEFAULT_ANALYTICS_ENDPOINT: &str = "https://westus.api.cognitive.microsoft.com/text/analytics/v2.0";

/// Weights and thresholds for attribute detection and scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingConfig {
    /// Sentiment above this makes an attribute mention positive. Default: `0.5`.
    pub semantic_threshold: f64,
    pub weights: ScoreWeights,
    pub attributes: AttributeDictionary,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            semantic_threshold: 0.5,
            weights: ScoreWeights::default(),
            attributes: AttributeDictionary::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Listen address. Default: `0.0.0.0:8080`.
    pub bind_addr: SocketAddr,
    pub review_api_base: String,
    /// Reviews requested per product. Default: `50`.
    pub review_page_size: usize,
    /// `source` query parameter of the review API. Default: `us`.
    pub review_source: String,
    pub analytics_endpoint: String,
    /// Subscription key sent with every analytics call.
    pub analytics_key: String,
    /// Maximum documents per analytics call. Default: `100`.
    pub analytics_batch_size: usize,
    pub analytics_language: String,
    /// Timeout applied to each outbound call. Default: 10s.
    pub http_timeout: Duration,
    pub ranking: RankingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            review_api_base: DEFAULT_REVIEW_API_BASE.to_string(),
            review_page_size: 50,
            review_source: "us".to_string(),
            analytics_endpoint: DEFAULT_ANALYTICS_ENDPOINT.to_string(),
            analytics_key: String::new(),
            analytics_batch_size: 100,
            analytics_language: "en".to_string(),
            http_timeout: Duration::from_secs(10),
            ranking: RankingConfig::default(),
        }
    }
}

impl Config {
    const ENV_BIND_ADDR: &'static str = "BIND_ADDR";
    const ENV_REVIEW_API_BASE: &'static str = "REVIEW_API_BASE";
    const ENV_REVIEW_PAGE_SIZE: &'static str = "REVIEW_PAGE_SIZE";
    const ENV_REVIEW_SOURCE: &'static str = "REVIEW_SOURCE";
    const ENV_ANALYTICS_ENDPOINT: &'static str = "ANALYTICS_ENDPOINT";
    const ENV_ANALYTICS_KEY: &'static str = "ANALYTICS_KEY";
    const ENV_ANALYTICS_BATCH_SIZE: &'static str = "ANALYTICS_BATCH_SIZE";
    const ENV_ANALYTICS_LANGUAGE: &'static str = "ANALYTICS_LANGUAGE";
    const ENV_HTTP_TIMEOUT_SECS: &'static str = "HTTP_TIMEOUT_SECS";
    const ENV_SEMANTIC_THRESHOLD: &'static str = "SEMANTIC_THRESHOLD";
    const ENV_KEY_ATTR_WEIGHT: &'static str = "KEY_ATTR_WEIGHT";
    const ENV_MINOR_ATTR_WEIGHT: &'static str = "MINOR_ATTR_WEIGHT";
    const ENV_SENTIMENT_MULTIPLIER: &'static str = "SENTIMENT_MULTIPLIER";
    const ENV_ATTRIBUTE_FAMILIES: &'static str = "ATTRIBUTE_FAMILIES";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through `lookup`; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let weights = ScoreWeights {
            key_attr_weight: parse_or(&get, Self::ENV_KEY_ATTR_WEIGHT, defaults.ranking.weights.key_attr_weight)?,
            minor_attr_weight: parse_or(&get, Self::ENV_MINOR_ATTR_WEIGHT, defaults.ranking.weights.minor_attr_weight)?,
            sentiment_multiplier: parse_or(
                &get,
                Self::ENV_SENTIMENT_MULTIPLIER,
                defaults.ranking.weights.sentiment_multiplier,
            )?,
        };
        let attributes = match get(Self::ENV_ATTRIBUTE_FAMILIES) {
            Some(raw) => AttributeDictionary::parse(&raw)?,
            None => defaults.ranking.attributes,
        };
        let ranking = RankingConfig {
            semantic_threshold: parse_or(&get, Self::ENV_SEMANTIC_THRESHOLD, defaults.ranking.semantic_threshold)?,
            weights,
            attributes,
        };

        let config = Self {
            bind_addr: parse_or(&get, Self::ENV_BIND_ADDR, defaults.bind_addr)?,
            review_api_base: get(Self::ENV_REVIEW_API_BASE).unwrap_or(defaults.review_api_base),
            review_page_size: parse_or(&get, Self::ENV_REVIEW_PAGE_SIZE, defaults.review_page_size)?,
            review_source: get(Self::ENV_REVIEW_SOURCE).unwrap_or(defaults.review_source),
            analytics_endpoint: get(Self::ENV_ANALYTICS_ENDPOINT).unwrap_or(defaults.analytics_endpoint),
            analytics_key: get(Self::ENV_ANALYTICS_KEY).unwrap_or(defaults.analytics_key),
            analytics_batch_size: parse_or(&get, Self::ENV_ANALYTICS_BATCH_SIZE, defaults.analytics_batch_size)?,
            analytics_language: get(Self::ENV_ANALYTICS_LANGUAGE).unwrap_or(defaults.analytics_language),
            http_timeout: Duration::from_secs(parse_or(
                &get,
                Self::ENV_HTTP_TIMEOUT_SECS,
                defaults.http_timeout.as_secs(),
            )?),
            ranking,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that parse but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let floats = [
            (Self::ENV_SEMANTIC_THRESHOLD, self.ranking.semantic_threshold),
            (Self::ENV_KEY_ATTR_WEIGHT, self.ranking.weights.key_attr_weight),
            (Self::ENV_MINOR_ATTR_WEIGHT, self.ranking.weights.minor_attr_weight),
            (Self::ENV_SENTIMENT_MULTIPLIER, self.ranking.weights.sentiment_multiplier),
        ];
        for (name, value) in floats {
            if !value.is_finite() {
                return Err(ConfigError::InvalidValue {
                    name,
                    value: value.to_string(),
                    reason: "must be a finite number".to_string(),
                });
            }
        }

        if self.review_page_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_REVIEW_PAGE_SIZE,
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.analytics_batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_ANALYTICS_BATCH_SIZE,
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.http_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_HTTP_TIMEOUT_SECS,
                value: "0".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

fn parse_or<G, T>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match get(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            name,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
