use crate::error::StoreError;
use crate::models::QuizRecord;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};

/// Keyed storage for generated quizzes. Also hands out their ids.
#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn next_id(&self) -> Result<i64, StoreError>;
    async fn put(&self, record: QuizRecord) -> Result<(), StoreError>;
    async fn get(&self, id: i64) -> Result<QuizRecord, StoreError>;
    /// Newest first.
    async fn list(&self) -> Result<Vec<QuizRecord>, StoreError>;
    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}

/// Process-lifetime store. Grows without bound.
pub struct InMemoryQuizStore {
    quizzes: DashMap<i64, QuizRecord>,
    next_id: AtomicI64,
}

impl InMemoryQuizStore {
    pub fn new() -> Self {
        Self {
            quizzes: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }
}

impl Default for InMemoryQuizStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuizStore for InMemoryQuizStore {
    async fn next_id(&self) -> Result<i64, StoreError> {
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn put(&self, record: QuizRecord) -> Result<(), StoreError> {
        self.quizzes.insert(record.id, record);
        Ok(())
    }

    async fn get(&self, id: i64) -> Result<QuizRecord, StoreError> {
        self.quizzes
            .get(&id)
            .map(|r| r.value().clone())
            .ok_or(StoreError::NotFound(id))
    }

    async fn list(&self) -> Result<Vec<QuizRecord>, StoreError> {
        let mut items: Vec<QuizRecord> = self.quizzes.iter().map(|r| r.value().clone()).collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(items)
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.quizzes
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}
