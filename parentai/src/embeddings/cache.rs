use lru::LruCache;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// Thread-safe LRU cache of question embeddings.
///
/// Keys are hashes of the trimmed question text, exactly as embedded. A capacity of zero
/// disables the cache: every lookup misses and nothing is stored.
#[derive(Clone)]
pub struct QueryEmbeddingCache {
    cache: Option<Arc<Mutex<LruCache<String, Vec<f32>>>>>,
}

impl QueryEmbeddingCache {
    pub fn new(capacity: usize) -> Self {
        let cache = NonZeroUsize::new(capacity).map(|cap| Arc::new(Mutex::new(LruCache::new(cap))));
        Self { cache }
    }

    pub fn get(&self, key: &str) -> Option<Vec<f32>> {
        let cache = self.cache.as_ref()?;
        let mut cache = cache.lock().ok()?;
        cache.get(key).cloned()
    }

    pub fn put(&self, key: String, value: Vec<f32>) {
        if let Some(cache) = &self.cache {
            if let Ok(mut cache) = cache.lock() {
                cache.put(key, value);
            }
        }
    }

    /// Drops every entry. Used when the embedding model changes.
    pub fn clear(&self) {
        if let Some(cache) = &self.cache {
            if let Ok(mut cache) = cache.lock() {
                cache.clear();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.cache
            .as_ref()
            .and_then(|cache| cache.lock().ok().map(|c| c.len()))
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stable key for a question: trimmed, then hashed. Case is kept because
    /// the stored embedding is of the text as asked.
    pub fn generate_key(&self, question: &str) -> String {
        let mut hasher = DefaultHasher::new();
        question.trim().as_bytes().hash(&mut hasher);
        format!("{:x}", hasher.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn hit_after_put() {
        let cache = QueryEmbeddingCache::new(10);
        let key = cache.generate_key("why is my baby crying");
        cache.put(key.clone(), vec![0.1, 0.2]);

        assert_eq!(cache.get(&key), Some(vec![0.1, 0.2]));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn key_ignores_surrounding_whitespace_only() {
        let cache = QueryEmbeddingCache::new(10);
        assert_eq!(
            cache.generate_key("  Why is my baby crying "),
            cache.generate_key("Why is my baby crying")
        );
        assert_ne!(
            cache.generate_key("Why is my baby crying"),
            cache.generate_key("why is my baby crying")
        );
        assert_ne!(cache.generate_key("q1"), cache.generate_key("q2"));
    }

    #[test]
    fn lru_eviction() {
        let cache = QueryEmbeddingCache::new(2);
        let k1 = cache.generate_key("q1");
        let k2 = cache.generate_key("q2");
        let k3 = cache.generate_key("q3");

        cache.put(k1.clone(), vec![1.0]);
        cache.put(k2.clone(), vec![2.0]);
        let _ = cache.get(&k1);
        cache.put(k3.clone(), vec![3.0]);

        assert_eq!(cache.get(&k1), Some(vec![1.0]));
        assert_eq!(cache.get(&k2), None);
        assert_eq!(cache.get(&k3), Some(vec![3.0]));
    }

    #[test]
    fn zero_capacity_disables_cache() {
        let cache = QueryEmbeddingCache::new(0);
        let key = cache.generate_key("q");
        cache.put(key.clone(), vec![1.0]);
        assert_eq!(cache.get(&key), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn clear_drops_entries() {
        let cache = QueryEmbeddingCache::new(4);
        cache.put("a".into(), vec![1.0]);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn concurrent_access() {
        let cache = QueryEmbeddingCache::new(100);
        let handles: Vec<_> = (0..10)
            .map(|i| {
                let cache = cache.clone();
                thread::spawn(move || {
                    let key = cache.generate_key(&format!("question {i}"));
                    cache.put(key.clone(), vec![i as f32]);
                    assert_eq!(cache.get(&key), Some(vec![i as f32]));
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 10);
    }
}
