//! Typed query cache.
//!
//! Each entry holds the last value for a [`QueryKey`], a stale flag, and at
//! most one in-flight read. Concurrent reads of a key share that read.
//! Writes are synchronous and always win over a read that was in flight when
//! the key was cancelled: completion is matched against the fetch id, so a
//! cancelled read can never store its result.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::client::{ClientError, Session};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// Articles under one headword, as seen by one session.
    ArticleGroup { word: String, session: Session },
    /// Prefix search results, split by whether drafts are visible.
    Lookup { term: String, is_admin: bool },
    UserAdmin { session: Session },
}

impl QueryKey {
    pub fn article_group(word: &str, session: &Session) -> Self {
        QueryKey::ArticleGroup {
            word: word.to_string(),
            session: session.clone(),
        }
    }

    pub fn lookup(term: &str, is_admin: bool) -> Self {
        QueryKey::Lookup {
            term: term.to_string(),
            is_admin,
        }
    }

    pub fn user_admin(session: &Session) -> Self {
        QueryKey::UserAdmin {
            session: session.clone(),
        }
    }
}

type SharedFetch<V> = Shared<BoxFuture<'static, Result<V, ClientError>>>;

struct InFlight<V> {
    id: u64,
    cancel: CancellationToken,
    result: SharedFetch<V>,
}

struct Entry<V> {
    data: Option<V>,
    stale: bool,
    fetch: Option<InFlight<V>>,
}

impl<V> Default for Entry<V> {
    fn default() -> Self {
        Self {
            data: None,
            stale: true,
            fetch: None,
        }
    }
}

pub struct QueryCache<V> {
    entries: Mutex<HashMap<QueryKey, Entry<V>>>,
    next_fetch: AtomicU64,
}

impl<V> Default for QueryCache<V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            next_fetch: AtomicU64::new(0),
        }
    }
}

impl<V> QueryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &QueryKey) -> Option<V> {
        self.lock().get(key).and_then(|entry| entry.data.clone())
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.lock().get(key).map_or(true, |entry| entry.stale)
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.lock()
            .get(key)
            .is_some_and(|entry| entry.fetch.is_some())
    }

    /// Replace the value through `updater`, which sees the current value.
    ///
    /// Returning `None` clears the value. Updated data counts as fresh.
    pub fn update<F>(&self, key: &QueryKey, updater: F)
    where
        F: FnOnce(Option<V>) -> Option<V>,
    {
        let mut entries = self.lock();
        let entry = entries.entry(key.clone()).or_default();
        entry.data = updater(entry.data.take());
        entry.stale = false;
    }

    pub fn set(&self, key: &QueryKey, data: V) {
        self.update(key, |_| Some(data));
    }

    /// Put back a value captured with [`QueryCache::get`], including "nothing cached".
    pub fn restore(&self, key: &QueryKey, snapshot: Option<V>) {
        self.update(key, |_| snapshot);
    }

    /// Abort the in-flight read for `key`, if any. Its result is discarded.
    pub fn cancel(&self, key: &QueryKey) {
        let in_flight = self
            .lock()
            .get_mut(key)
            .and_then(|entry| entry.fetch.take());
        if let Some(in_flight) = in_flight {
            debug!("cancelling fetch {} for {:?}", in_flight.id, key);
            in_flight.cancel.cancel();
        }
    }

    /// Mark `key` stale; its value stays readable and the next read refetches.
    pub fn invalidate(&self, key: &QueryKey) {
        if let Some(entry) = self.lock().get_mut(key) {
            entry.stale = true;
        }
    }

    pub fn invalidate_all(&self) {
        for entry in self.lock().values_mut() {
            entry.stale = true;
        }
    }

    /// Return the cached value if fresh, otherwise join or start a read.
    ///
    /// If the read is cancelled, awaiters get the value cached at completion
    /// instead, or [`ClientError::Cancelled`] when there is none.
    ///
    /// `fetcher` is only called when no read is in flight for `key`; it must
    /// not touch this cache.
    pub async fn fetch<F, Fut>(&self, key: &QueryKey, fetcher: F) -> Result<V, ClientError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, ClientError>> + Send + 'static,
    {
        let (id, result) = {
            let mut entries = self.lock();
            let entry = entries.entry(key.clone()).or_default();

            if let (false, Some(data)) = (entry.stale, &entry.data) {
                return Ok(data.clone());
            }

            match &entry.fetch {
                Some(in_flight) => (in_flight.id, in_flight.result.clone()),
                None => {
                    let id = self.next_fetch.fetch_add(1, Ordering::Relaxed);
                    let cancel = CancellationToken::new();
                    let cancelled = cancel.clone();
                    let request = fetcher();
                    let result = async move {
                        tokio::select! {
                            biased;
                            _ = cancelled.cancelled() => Err(ClientError::Cancelled),
                            result = request => result,
                        }
                    }
                    .boxed()
                    .shared();

                    entry.fetch = Some(InFlight {
                        id,
                        cancel,
                        result: result.clone(),
                    });
                    (id, result)
                }
            }
        };

        let result = result.await;

        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key) else {
            return result;
        };
        if entry.fetch.as_ref().is_some_and(|in_flight| in_flight.id == id) {
            entry.fetch = None;
            if let Ok(data) = &result {
                entry.data = Some(data.clone());
                entry.stale = false;
            }
        }

        // a cancelled read hands back whatever the cancelling write left behind
        match result {
            Err(ClientError::Cancelled) => entry.data.clone().ok_or(ClientError::Cancelled),
            result => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use tokio::sync::oneshot;

    fn key() -> QueryKey {
        QueryKey::article_group("घर", &Session::Anonymous)
    }

    #[tokio::test]
    async fn test_fresh_value_skips_fetcher() {
        let cache = QueryCache::<u32>::new();
        cache.set(&key(), 7);

        let value = cache
            .fetch(&key(), || async { Ok(0) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch_but_keeps_value() {
        let cache = QueryCache::<u32>::new();
        cache.set(&key(), 1);
        cache.invalidate(&key());

        assert!(cache.is_stale(&key()));
        assert_eq!(cache.get(&key()), Some(1));

        let value = cache.fetch(&key(), || async { Ok(2) }).await.unwrap();
        assert_eq!(value, 2);
        assert!(!cache.is_stale(&key()));
    }

    #[tokio::test]
    async fn test_concurrent_reads_share_one_fetch() {
        let cache = Arc::new(QueryCache::<u32>::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let (release, gate) = oneshot::channel::<()>();
        let gate = gate.shared();

        let first = {
            let cache = cache.clone();
            let calls = calls.clone();
            tokio::spawn(async move {
                cache
                    .fetch(&key(), move || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        async move {
                            let _ = gate.await;
                            Ok(5)
                        }
                    })
                    .await
            })
        };
        while !cache.is_fetching(&key()) {
            tokio::task::yield_now().await;
        }

        let second = {
            let cache = cache.clone();
            let calls = calls.clone();
            tokio::spawn(async move {
                cache
                    .fetch(&key(), move || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        async { Ok(6) }
                    })
                    .await
            })
        };
        tokio::task::yield_now().await;
        release.send(()).unwrap();

        assert_eq!(first.await.unwrap().unwrap(), 5);
        assert_eq!(second.await.unwrap().unwrap(), 5);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_fetch_without_value_errors() {
        let cache = Arc::new(QueryCache::<u32>::new());
        let (release, gate) = oneshot::channel::<()>();

        let reader = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .fetch(&key(), move || async move {
                        let _ = gate.await;
                        Ok(1)
                    })
                    .await
            })
        };
        while !cache.is_fetching(&key()) {
            tokio::task::yield_now().await;
        }

        cache.cancel(&key());
        let _ = release.send(());

        assert_eq!(reader.await.unwrap(), Err(ClientError::Cancelled));
        assert_eq!(cache.get(&key()), None);
    }

    #[tokio::test]
    async fn test_cancelled_fetch_does_not_store() {
        let cache = Arc::new(QueryCache::<u32>::new());
        let (release, gate) = oneshot::channel::<()>();

        let reader = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .fetch(&key(), move || async move {
                        let _ = gate.await;
                        Ok(1)
                    })
                    .await
            })
        };
        while !cache.is_fetching(&key()) {
            tokio::task::yield_now().await;
        }

        cache.cancel(&key());
        cache.set(&key(), 99);
        let _ = release.send(());

        assert_eq!(reader.await.unwrap(), Ok(99));
        assert_eq!(cache.get(&key()), Some(99));
    }

    #[tokio::test]
    async fn test_restore_none_clears_value() {
        let cache = QueryCache::<u32>::new();
        let snapshot = cache.get(&key());
        cache.set(&key(), 3);
        cache.restore(&key(), snapshot);
        assert_eq!(cache.get(&key()), None);
    }

    #[test]
    fn test_keys_split_by_session() {
        let anonymous = QueryKey::article_group("घर", &Session::Anonymous);
        let signed_in = QueryKey::article_group("घर", &Session::token("t"));
        assert_ne!(anonymous, signed_in);
        assert_ne!(QueryKey::lookup("घर", true), QueryKey::lookup("घर", false));
    }
}
