//! Ranking and good/bad classification of scored reviews.

use axum::Json;

use crate::models::{RankedProduct, ScoredReview};

/// Reviews rated strictly above this are "good" comments.
pub const GOOD_RATING_CUTOFF: f64 = 4.0;

/// Sorts reviews by rank score (highest first) and splits their texts into
/// good and bad comment lists, both in rank order.
///
/// The sort is stable: reviews with equal scores keep their fetch order.
pub fn rank(mut reviews: Vec<ScoredReview>) -> RankedProduct {
    reviews.sort_by(|a, b| b.rank_score.total_cmp(&a.rank_score));

    let mut good_comments = Vec::new();
    let mut bad_comments = Vec::new();
    for review in &reviews {
        if review.rating > GOOD_RATING_CUTOFF {
            good_comments.push(review.text.clone());
        } else {
            bad_comments.push(review.text.clone());
        }
    }

    RankedProduct {
        reviews,
        good_comments,
        bad_comments,
    }
}

/// Wraps the finished product as the JSON response body.
pub fn assemble(ranked: RankedProduct) -> Json<RankedProduct> {
    Json(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn scored(text: &str, rating: f64, rank_score: f64) -> ScoredReview {
        ScoredReview {
            text: text.to_string(),
            rating,
            sentiment_score: 0.0,
            key_phrases: Vec::new(),
            attribute_hits: BTreeMap::new(),
            rank_score,
        }
    }

    fn texts(product: &RankedProduct) -> Vec<&str> {
        product.reviews.iter().map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn test_sorts_descending() {
        let ranked = rank(vec![scored("a", 5.0, 1.0), scored("b", 5.0, 7.5), scored("c", 1.0, -3.0)]);
        assert_eq!(texts(&ranked), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_ties_keep_fetch_order() {
        let ranked = rank(vec![
            scored("first", 5.0, 2.0),
            scored("second", 1.0, 2.0),
            scored("top", 5.0, 9.0),
            scored("third", 3.0, 2.0),
        ]);
        assert_eq!(texts(&ranked), vec!["top", "first", "second", "third"]);
    }

    #[test]
    fn test_rank_is_idempotent() {
        let once = rank(vec![scored("x", 2.0, 0.5), scored("y", 5.0, 3.0), scored("z", 4.5, 0.5)]);
        let twice = rank(once.reviews.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_partition_is_total() {
        let input = vec![
            scored("a", 5.0, 1.0),
            scored("b", 4.0, 2.0),
            scored("c", 4.1, 3.0),
            scored("d", 0.0, 4.0),
        ];
        let ranked = rank(input);
        assert_eq!(ranked.good_comments.len() + ranked.bad_comments.len(), ranked.reviews.len());
        for review in &ranked.reviews {
            let in_good = ranked.good_comments.contains(&review.text);
            let in_bad = ranked.bad_comments.contains(&review.text);
            assert!(in_good ^ in_bad);
        }
    }

    #[test]
    fn test_rating_four_is_bad() {
        let ranked = rank(vec![scored("four", 4.0, 1.0)]);
        assert!(ranked.good_comments.is_empty());
        assert_eq!(ranked.bad_comments, vec!["four".to_string()]);
    }

    #[test]
    fn test_comment_lists_follow_rank_order() {
        let ranked = rank(vec![
            scored("good-low", 5.0, 1.0),
            scored("bad-low", 2.0, 0.0),
            scored("good-high", 5.0, 10.0),
            scored("bad-high", 1.0, 6.0),
        ]);
        assert_eq!(ranked.good_comments, vec!["good-high", "good-low"]);
        assert_eq!(ranked.bad_comments, vec!["bad-high", "bad-low"]);
    }

    #[test]
    fn test_empty_input() {
        let ranked = rank(Vec::new());
        assert_eq!(ranked, RankedProduct::default());
    }

    #[test]
    fn test_assemble_uses_camel_case() {
        let Json(product) = assemble(rank(vec![scored("only", 5.0, 1.0)]));
        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(value["goodComments"][0], "only");
        assert!(value["badComments"].as_array().unwrap().is_empty());
        assert_eq!(value["reviews"][0]["rankScore"], 1.0);
        assert!(value["reviews"][0]["attributeHits"].is_object());
    }
}
