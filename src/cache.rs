use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, PoisonError},
};

use crate::fetch::{FetchOptions, VideoData};

/// Everything that changes what yt-dlp would give back for a video.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub url: String,
    pub language: String,
    pub options: FetchOptions,
}

impl CacheKey {
    pub fn new(url: &str, language: &str, options: FetchOptions) -> Self {
        Self {
            url: url.to_string(),
            language: language.to_string(),
            options,
        }
    }
}

#[derive(Default)]
struct Inner {
    entries: HashMap<CacheKey, Arc<VideoData>>,
    // least recently used at the front
    order: VecDeque<CacheKey>,
}

impl Inner {
    fn touch(&mut self, key: &CacheKey) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }
}

/// Fetched videos, so resubmitting the same form does not run yt-dlp again.
pub struct ResultCache {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl ResultCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<VideoData>> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let hit = inner.entries.get(key).cloned();
        if hit.is_some() {
            inner.touch(key);
        }
        hit
    }

    pub fn insert(&self, key: CacheKey, data: Arc<VideoData>) {
        if self.capacity == 0 {
            return;
        }
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.entries.insert(key.clone(), data).is_some() {
            inner.touch(&key);
            return;
        }
        inner.order.push_back(key);
        while inner.entries.len() > self.capacity {
            match inner.order.pop_front() {
                Some(old) => {
                    inner.entries.remove(&old);
                }
                None => break,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(url: &str) -> Arc<VideoData> {
        Arc::new(VideoData {
            url: url.to_string(),
            title: "t".into(),
            transcript: String::new(),
            cues: Vec::new(),
            comments: Vec::new(),
            actual_lang: String::new(),
        })
    }

    fn key(url: &str) -> CacheKey {
        CacheKey::new(url, "fr", FetchOptions::both())
    }

    #[test]
    fn key_includes_language_and_options() {
        let cache = ResultCache::new(4);
        cache.insert(key("a"), data("a"));

        assert!(cache.get(&key("a")).is_some());
        assert!(cache.get(&CacheKey::new("a", "en", FetchOptions::both())).is_none());
        let comments_only = FetchOptions {
            transcript: false,
            comments: true,
        };
        assert!(cache.get(&CacheKey::new("a", "fr", comments_only)).is_none());
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = ResultCache::new(2);
        cache.insert(key("a"), data("a"));
        cache.insert(key("b"), data("b"));
        // "a" becomes the most recent
        assert!(cache.get(&key("a")).is_some());
        cache.insert(key("c"), data("c"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&key("a")).is_some());
        assert!(cache.get(&key("b")).is_none());
        assert!(cache.get(&key("c")).is_some());
    }

    #[test]
    fn reinserting_replaces_without_growing() {
        let cache = ResultCache::new(2);
        cache.insert(key("a"), data("a"));
        cache.insert(key("a"), data("a2"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key("a")).unwrap().url, "a2");
    }

    #[test]
    fn zero_capacity_disables_caching() {
        let cache = ResultCache::new(0);
        cache.insert(key("a"), data("a"));
        assert!(cache.is_empty());
    }
}
