use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use worklog_auth::LogChangeSet;
use worklog_core::{Entity, LogId, LogStatus, UserId, WorkLog};

use super::StoreError;

/// Selection criteria for listing logs; `None` matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogFilter {
    pub owner_id: Option<UserId>,
    pub status: Option<LogStatus>,
}

impl LogFilter {
    pub fn owned_by(owner_id: UserId) -> Self {
        Self {
            owner_id: Some(owner_id),
            status: None,
        }
    }

    fn matches(&self, log: &WorkLog) -> bool {
        self.owner_id.is_none_or(|o| log.owner() == Some(o))
            && self.status.is_none_or(|s| log.status == s)
    }
}

/// Work log storage.
///
/// The store applies change sets; it does not decide who may produce them.
pub trait LogStore: Send + Sync {
    fn insert(&self, log: WorkLog) -> Result<WorkLog, StoreError>;
    fn get(&self, id: LogId) -> Option<WorkLog>;
    /// Matching logs ordered by date, then creation.
    fn list(&self, filter: LogFilter) -> Vec<WorkLog>;
    fn apply(
        &self,
        id: LogId,
        changes: &LogChangeSet,
        now: DateTime<Utc>,
    ) -> Result<WorkLog, StoreError>;
    /// Remove every log owned by `owner_id`, returning how many were removed.
    fn delete_owned_by(&self, owner_id: UserId) -> usize;
}

impl<S> LogStore for Arc<S>
where
    S: LogStore + ?Sized,
{
    fn insert(&self, log: WorkLog) -> Result<WorkLog, StoreError> {
        (**self).insert(log)
    }

    fn get(&self, id: LogId) -> Option<WorkLog> {
        (**self).get(id)
    }

    fn list(&self, filter: LogFilter) -> Vec<WorkLog> {
        (**self).list(filter)
    }

    fn apply(
        &self,
        id: LogId,
        changes: &LogChangeSet,
        now: DateTime<Utc>,
    ) -> Result<WorkLog, StoreError> {
        (**self).apply(id, changes, now)
    }

    fn delete_owned_by(&self, owner_id: UserId) -> usize {
        (**self).delete_owned_by(owner_id)
    }
}

/// In-memory log store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryLogStore {
    inner: RwLock<HashMap<LogId, WorkLog>>,
}

impl InMemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LogStore for InMemoryLogStore {
    fn insert(&self, log: WorkLog) -> Result<WorkLog, StoreError> {
        let mut map = self.inner.write().map_err(|_| StoreError::Unavailable)?;
        if map.contains_key(log.id()) {
            return Err(StoreError::Conflict(format!("log {} already exists", log.id)));
        }
        map.insert(log.id, log.clone());
        Ok(log)
    }

    fn get(&self, id: LogId) -> Option<WorkLog> {
        let map = self.inner.read().ok()?;
        map.get(&id).cloned()
    }

    fn list(&self, filter: LogFilter) -> Vec<WorkLog> {
        let map = match self.inner.read() {
            Ok(m) => m,
            Err(_) => return vec![],
        };

        let mut logs: Vec<WorkLog> = map.values().filter(|l| filter.matches(l)).cloned().collect();
        logs.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        logs
    }

    fn apply(
        &self,
        id: LogId,
        changes: &LogChangeSet,
        now: DateTime<Utc>,
    ) -> Result<WorkLog, StoreError> {
        changes.validate()?;

        let mut map = self.inner.write().map_err(|_| StoreError::Unavailable)?;
        let log = map.get_mut(&id).ok_or(StoreError::NotFound)?;
        changes.apply_to(log, now);
        Ok(log.clone())
    }

    fn delete_owned_by(&self, owner_id: UserId) -> usize {
        let Ok(mut map) = self.inner.write() else {
            return 0;
        };
        let before = map.len();
        map.retain(|_, log| log.owner_id != owner_id);
        let removed = before - map.len();
        tracing::debug!(owner_id = %owner_id, removed, "deleted logs for owner");
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use worklog_auth::{ContentChanges, ReviewChanges};
    use worklog_core::NewWorkLog;

    fn log(owner: UserId, day: u32) -> WorkLog {
        WorkLog::create(
            LogId::new(),
            owner,
            NewWorkLog {
                date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
                start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                working_hours: 8.0,
                task_description: format!("day {day}"),
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn list_filters_by_owner_and_status_in_date_order() {
        let store = InMemoryLogStore::new();
        let alice = UserId::new();
        let bob = UserId::new();

        store.insert(log(alice, 22)).unwrap();
        let first = store.insert(log(alice, 21)).unwrap();
        store.insert(log(bob, 21)).unwrap();

        let mine = store.list(LogFilter::owned_by(alice));
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].id, first.id);

        store
            .apply(
                first.id,
                &LogChangeSet::Review(ReviewChanges {
                    status: Some(LogStatus::Approved),
                    reviewer_id: bob,
                }),
                Utc::now(),
            )
            .unwrap();

        let pending = store.list(LogFilter {
            owner_id: None,
            status: Some(LogStatus::Pending),
        });
        assert_eq!(pending.len(), 2);
        assert!(pending.iter().all(|l| l.id != first.id));
    }

    #[test]
    fn apply_validates_content() {
        let store = InMemoryLogStore::new();
        let stored = store.insert(log(UserId::new(), 21)).unwrap();

        let bad = LogChangeSet::Content(ContentChanges {
            working_hours: Some(30.0),
            ..Default::default()
        });
        assert!(matches!(
            store.apply(stored.id, &bad, Utc::now()),
            Err(StoreError::Validation(_))
        ));
        assert_eq!(store.get(stored.id).unwrap().working_hours, 8.0);
    }

    #[test]
    fn empty_change_set_leaves_log_untouched() {
        let store = InMemoryLogStore::new();
        let stored = store.insert(log(UserId::new(), 21)).unwrap();

        let after = store.apply(stored.id, &LogChangeSet::Empty, Utc::now()).unwrap();
        assert_eq!(after, stored);
    }

    #[test]
    fn apply_to_missing_log_is_not_found() {
        let store = InMemoryLogStore::new();
        assert_eq!(
            store.apply(LogId::new(), &LogChangeSet::Empty, Utc::now()).unwrap_err(),
            StoreError::NotFound
        );
    }

    #[test]
    fn delete_owned_by_cascades_only_that_owner() {
        let store = InMemoryLogStore::new();
        let alice = UserId::new();
        let bob = UserId::new();
        store.insert(log(alice, 21)).unwrap();
        store.insert(log(alice, 22)).unwrap();
        store.insert(log(bob, 21)).unwrap();

        assert_eq!(store.delete_owned_by(alice), 2);
        assert_eq!(store.list(LogFilter::default()).len(), 1);
    }
}
