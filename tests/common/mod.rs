//! Test doubles for the rating repository port.

#![allow(dead_code)]

use rating_service::domain::{DataAccessError, NewRating, RatingSummary, RequestContext};
use rating_service::ports::RatingRepoPort;
use rating_service::usecases::{AsyncDispatcher, RatingService};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const UNIQUE_VIOLATION: &str = "23505";
pub const CONNECTION_FAILURE: &str = "08006";

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    rows: HashMap<(i64, i64), i32>,
}

/// In-memory repository with a unique (item_id, author_id) key.
pub struct MemoryRepo {
    state: Mutex<MemoryState>,
    calls: AtomicUsize,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// First generated id will be `next_id`.
    pub fn starting_at(next_id: i64) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                next_id,
                rows: HashMap::new(),
            }),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RatingRepoPort for MemoryRepo {
    async fn append_rating(
        &self,
        _ctx: &RequestContext,
        rating: &NewRating,
    ) -> Result<i64, DataAccessError> {
        // Let other requests interleave between dispatch and the write.
        tokio::task::yield_now().await;
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        let key = (rating.item_id(), rating.author_id());
        if state.rows.contains_key(&key) {
            return Err(DataAccessError::new(
                Some(UNIQUE_VIOLATION),
                "duplicate key value violates unique constraint",
            ));
        }
        state.rows.insert(key, rating.value());
        let id = state.next_id;
        state.next_id += 1;
        Ok(id)
    }

    async fn summarize(
        &self,
        _ctx: &RequestContext,
        item_id: i64,
    ) -> Result<RatingSummary, DataAccessError> {
        tokio::task::yield_now().await;
        self.calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        let mut summary = RatingSummary::empty();
        for (_, &value) in state.rows.iter().filter(|((item, _), _)| *item == item_id) {
            summary.add(value, 1);
        }
        Ok(summary)
    }
}

/// Repository whose every call fails with the given code.
pub struct FailingRepo {
    code: Option<&'static str>,
    calls: AtomicUsize,
}

impl FailingRepo {
    pub fn new(code: Option<&'static str>) -> Self {
        Self {
            code,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail(&self) -> DataAccessError {
        self.calls.fetch_add(1, Ordering::SeqCst);
        DataAccessError::new(self.code, format!("scripted failure {:?}", self.code))
    }
}

#[async_trait::async_trait]
impl RatingRepoPort for FailingRepo {
    async fn append_rating(
        &self,
        _ctx: &RequestContext,
        _rating: &NewRating,
    ) -> Result<i64, DataAccessError> {
        Err(self.fail())
    }

    async fn summarize(
        &self,
        _ctx: &RequestContext,
        _item_id: i64,
    ) -> Result<RatingSummary, DataAccessError> {
        Err(self.fail())
    }
}

/// Repository that panics inside the unit of work.
pub struct PanickingRepo;

#[async_trait::async_trait]
impl RatingRepoPort for PanickingRepo {
    async fn append_rating(
        &self,
        _ctx: &RequestContext,
        _rating: &NewRating,
    ) -> Result<i64, DataAccessError> {
        panic!("driver bug")
    }

    async fn summarize(
        &self,
        _ctx: &RequestContext,
        _item_id: i64,
    ) -> Result<RatingSummary, DataAccessError> {
        panic!("driver bug")
    }
}

/// Outcome chosen by `author_id % 4`: success, integrity, connection, no code.
pub struct ScriptedByAuthorRepo;

#[async_trait::async_trait]
impl RatingRepoPort for ScriptedByAuthorRepo {
    async fn append_rating(
        &self,
        _ctx: &RequestContext,
        rating: &NewRating,
    ) -> Result<i64, DataAccessError> {
        tokio::task::yield_now().await;
        match rating.author_id() % 4 {
            0 => Ok(rating.item_id()),
            1 => Err(DataAccessError::new(Some(UNIQUE_VIOLATION), "duplicate")),
            2 => Err(DataAccessError::new(Some(CONNECTION_FAILURE), "connection lost")),
            _ => Err(DataAccessError::new(None, "unknown failure")),
        }
    }

    async fn summarize(
        &self,
        _ctx: &RequestContext,
        _item_id: i64,
    ) -> Result<RatingSummary, DataAccessError> {
        Ok(RatingSummary::empty())
    }
}

/// Service over `repo` on the current runtime.
pub fn service(repo: Arc<dyn RatingRepoPort>, pool_size: usize) -> Arc<RatingService> {
    let dispatcher = AsyncDispatcher::new(tokio::runtime::Handle::current(), pool_size);
    Arc::new(RatingService::new(repo, dispatcher))
}

/// The 15-row fixture: one 1, two 2s, ... five 5s.
pub fn fixture_values() -> Vec<i32> {
    vec![1, 2, 2, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 5]
}
