// src/common/cache.rs

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

use axum::body::Bytes;
use uuid::Uuid;

// Identifica uma resposta: URL completa (com query) + dono da requisição.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub url: String,
    pub owner: CacheOwner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheOwner {
    Public,
    User(Uuid),
}

impl CacheKey {
    pub fn new(url: impl Into<String>, user_id: Option<Uuid>) -> Self {
        Self {
            url: url.into(),
            owner: user_id.map_or(CacheOwner::Public, CacheOwner::User),
        }
    }

    fn path(&self) -> &str {
        self.url.split_once('?').map_or(self.url.as_str(), |(path, _)| path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheScope {
    All,
    User(Uuid),
    // Todas as entradas de um caminho, de qualquer dono e com qualquer query.
    Path(&'static str),
}

// Cache de respostas em memória. É só um overlay de performance:
// nunca é fonte da verdade e não sobrevive a um restart.
pub trait ResponseCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<Bytes>;
    fn put(&self, key: CacheKey, body: Bytes, ttl: Duration);
    fn invalidate(&self, scope: CacheScope);
}

struct Entry {
    body: Bytes,
    expires_at: Instant,
}

#[derive(Default)]
pub struct InMemoryResponseCache {
    entries: Mutex<HashMap<CacheKey, Entry>>,
}

impl InMemoryResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl ResponseCache for InMemoryResponseCache {
    fn get(&self, key: &CacheKey) -> Option<Bytes> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.body.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn put(&self, key: CacheKey, body: Bytes, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key,
            Entry {
                body,
                expires_at: now + ttl,
            },
        );
    }

    fn invalidate(&self, scope: CacheScope) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        match scope {
            CacheScope::All => entries.clear(),
            CacheScope::User(id) => entries.retain(|key, _| key.owner != CacheOwner::User(id)),
            CacheScope::Path(path) => entries.retain(|key, _| key.path() != path),
        }
        tracing::debug!(?scope, "Cache invalidado");
    }
}

// Usado quando o cache deve ficar desligado (testes determinísticos).
#[cfg(test)]
pub struct NoopResponseCache;

#[cfg(test)]
impl ResponseCache for NoopResponseCache {
    fn get(&self, _key: &CacheKey) -> Option<Bytes> {
        None
    }

    fn put(&self, _key: CacheKey, _body: Bytes, _ttl: Duration) {}

    fn invalidate(&self, _scope: CacheScope) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[test]
    fn returns_stored_body_within_ttl() {
        let cache = InMemoryResponseCache::new();
        let key = CacheKey::new("/api/v1/admin/periodos", Some(Uuid::nil()));

        cache.put(key.clone(), Bytes::from_static(b"{\"success\":true}"), TTL);

        assert_eq!(cache.get(&key), Some(Bytes::from_static(b"{\"success\":true}")));
    }

    #[test]
    fn expired_entries_are_dropped_on_read() {
        let cache = InMemoryResponseCache::new();
        let key = CacheKey::new("/api/v1/admin/dashboard", None);

        cache.put(key.clone(), Bytes::from_static(b"{}"), Duration::ZERO);

        assert_eq!(cache.get(&key), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn same_url_is_isolated_per_user() {
        let cache = InMemoryResponseCache::new();
        let ana = Uuid::new_v4();
        let bruno = Uuid::new_v4();

        cache.put(CacheKey::new("/estudiante/dashboard", Some(ana)), Bytes::from_static(b"ana"), TTL);

        assert_eq!(cache.get(&CacheKey::new("/estudiante/dashboard", Some(bruno))), None);
        assert_eq!(cache.get(&CacheKey::new("/estudiante/dashboard", None)), None);
    }

    #[test]
    fn invalidating_one_user_keeps_the_others() {
        let cache = InMemoryResponseCache::new();
        let ana = Uuid::new_v4();
        let bruno = Uuid::new_v4();
        let ana_key = CacheKey::new("/estudiante/dashboard", Some(ana));
        let bruno_key = CacheKey::new("/estudiante/dashboard", Some(bruno));

        cache.put(ana_key.clone(), Bytes::from_static(b"ana"), TTL);
        cache.put(bruno_key.clone(), Bytes::from_static(b"bruno"), TTL);
        cache.invalidate(CacheScope::User(ana));

        assert_eq!(cache.get(&ana_key), None);
        assert_eq!(cache.get(&bruno_key), Some(Bytes::from_static(b"bruno")));
    }

    #[test]
    fn invalidating_all_clears_everything() {
        let cache = InMemoryResponseCache::new();

        cache.put(CacheKey::new("/a", None), Bytes::from_static(b"a"), TTL);
        cache.put(CacheKey::new("/b", Some(Uuid::new_v4())), Bytes::from_static(b"b"), TTL);
        cache.invalidate(CacheScope::All);

        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn invalidating_a_path_drops_every_owner_and_query() {
        let cache = InMemoryResponseCache::new();
        let admin = Uuid::new_v4();
        let other_page = CacheKey::new("/api/v1/admin/periodos", Some(admin));

        cache.put(CacheKey::new("/api/v1/admin/dashboard", Some(admin)), Bytes::from_static(b"a"), TTL);
        cache.put(
            CacheKey::new("/api/v1/admin/dashboard?x=1", Some(Uuid::new_v4())),
            Bytes::from_static(b"b"),
            TTL,
        );
        cache.put(other_page.clone(), Bytes::from_static(b"c"), TTL);
        cache.invalidate(CacheScope::Path("/api/v1/admin/dashboard"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&other_page), Some(Bytes::from_static(b"c")));
    }

    #[test]
    fn noop_cache_never_hits() {
        let cache = NoopResponseCache;
        let key = CacheKey::new("/a", None);

        cache.put(key.clone(), Bytes::from_static(b"a"), TTL);

        assert_eq!(cache.get(&key), None);
    }
}
