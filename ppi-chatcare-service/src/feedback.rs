use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// How long an answer id stays ratable after it is issued.
pub const DEFAULT_ANSWER_RETENTION_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub rating: u8,
    pub comment: Option<String>,
    pub rated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    pub total_queries: u64,
    pub successful_responses: u64,
    pub failed_responses: u64,
    pub ratings: u64,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RatingOutcome {
    Recorded,
    UnknownAnswer,
    OutOfRange,
}

#[derive(Default)]
struct Counters {
    total_queries: AtomicU64,
    successful_responses: AtomicU64,
    failed_responses: AtomicU64,
    ratings: AtomicU64,
}

/// Answer ids handed out, their ratings, and query counters.
///
/// Answer ids (and their ratings) are dropped once they are older than the retention
/// window; the counters keep running totals.
#[derive(Clone)]
pub struct FeedbackStore {
    answers: Arc<DashMap<String, DateTime<Utc>>>,
    ratings: Arc<DashMap<String, Rating>>,
    counters: Arc<Counters>,
    retention: Duration,
}

impl Default for FeedbackStore {
    fn default() -> Self {
        Self::with_retention(Duration::hours(DEFAULT_ANSWER_RETENTION_HOURS))
    }
}

impl FeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retention(retention: Duration) -> Self {
        Self {
            answers: Arc::new(DashMap::new()),
            ratings: Arc::new(DashMap::new()),
            counters: Arc::new(Counters::default()),
            retention,
        }
    }

    pub fn record_query(&self) {
        self.counters.total_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.counters.failed_responses.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a successful answer and remember its id so it can be rated.
    pub fn record_success(&self, answer_id: &str) {
        self.counters
            .successful_responses
            .fetch_add(1, Ordering::Relaxed);
        self.issue(answer_id, Utc::now());
    }

    fn issue(&self, answer_id: &str, issued_at: DateTime<Utc>) {
        self.prune(issued_at);
        self.answers.insert(answer_id.to_string(), issued_at);
    }

    fn prune(&self, now: DateTime<Utc>) {
        let cutoff = now - self.retention;
        self.answers.retain(|_, issued_at| *issued_at > cutoff);
        self.ratings
            .retain(|answer_id, _| self.answers.contains_key(answer_id));
    }

    fn is_ratable(&self, answer_id: &str) -> bool {
        let cutoff = Utc::now() - self.retention;
        self.answers
            .get(answer_id)
            .is_some_and(|issued_at| *issued_at > cutoff)
    }

    /// Rate an answer. A later rating replaces an earlier one.
    pub fn rate(&self, answer_id: &str, rating: u8, comment: Option<String>) -> RatingOutcome {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return RatingOutcome::OutOfRange;
        }
        if !self.is_ratable(answer_id) {
            return RatingOutcome::UnknownAnswer;
        }

        let previous = self.ratings.insert(
            answer_id.to_string(),
            Rating {
                rating,
                comment,
                rated_at: Utc::now(),
            },
        );
        if previous.is_none() {
            self.counters.ratings.fetch_add(1, Ordering::Relaxed);
        }
        RatingOutcome::Recorded
    }

    pub fn rating(&self, answer_id: &str) -> Option<Rating> {
        self.ratings.get(answer_id).map(|entry| entry.clone())
    }

    pub fn stats(&self) -> UsageStats {
        UsageStats {
            total_queries: self.counters.total_queries.load(Ordering::Relaxed),
            successful_responses: self.counters.successful_responses.load(Ordering::Relaxed),
            failed_responses: self.counters.failed_responses.load(Ordering::Relaxed),
            ratings: self.counters.ratings.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let store = FeedbackStore::new();
        store.record_query();
        store.record_query();
        store.record_success("a1");
        store.record_failure();

        assert_eq!(
            store.stats(),
            UsageStats {
                total_queries: 2,
                successful_responses: 1,
                failed_responses: 1,
                ratings: 0,
            }
        );
    }

    #[test]
    fn test_rating_rules() {
        let store = FeedbackStore::new();
        store.record_success("a1");

        assert_eq!(store.rate("missing", 4, None), RatingOutcome::UnknownAnswer);
        assert_eq!(store.rate("a1", 0, None), RatingOutcome::OutOfRange);
        assert_eq!(store.rate("a1", 6, None), RatingOutcome::OutOfRange);
        assert_eq!(store.rate("a1", 2, None), RatingOutcome::Recorded);
        assert_eq!(
            store.rate("a1", 5, Some("clear".to_string())),
            RatingOutcome::Recorded
        );

        let rating = store.rating("a1").unwrap();
        assert_eq!(rating.rating, 5);
        assert_eq!(rating.comment.as_deref(), Some("clear"));
        assert_eq!(store.stats().ratings, 1);
    }

    #[test]
    fn test_clones_share_state() {
        let store = FeedbackStore::new();
        let handle = store.clone();
        handle.record_query();

        assert_eq!(store.stats().total_queries, 1);
    }

    #[test]
    fn test_expired_answers_are_dropped() {
        let store = FeedbackStore::with_retention(Duration::hours(1));
        let now = Utc::now();

        store.issue("stale", now - Duration::hours(3));
        assert_eq!(store.rate("stale", 4, None), RatingOutcome::UnknownAnswer);

        store.issue("old", now - Duration::minutes(50));
        assert_eq!(store.rate("old", 3, None), RatingOutcome::Recorded);
        store.issue("recent", now);
        store.record_success("new");

        assert!(!store.answers.contains_key("stale"));
        assert!(store.answers.contains_key("old"));
        assert_eq!(store.answers.len(), 3);

        store.issue("later", now + Duration::minutes(30));
        assert!(!store.answers.contains_key("old"));
        assert!(store.rating("old").is_none());
        assert_eq!(store.stats().ratings, 1);
    }
}
