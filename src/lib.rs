//! Product review ranking service.
//!
//! Fetches a product's reviews from the retail API, annotates them with
//! sentiment and key phrases from a text analytics service, scores each review
//! and returns them ranked and split into good and bad comments.

pub mod analytics;
pub mod api;
pub mod attributes;
pub mod config;
pub mod error;
pub mod models;
pub mod outbound;
pub mod pipeline;
pub mod ranking;
pub mod reviews;
pub mod scoring;

#[cfg(test)]
mod test_support;
