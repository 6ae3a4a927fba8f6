use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use futures::future;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::http::{Request, Response};
use crate::net::Fetcher;

use super::CachedEntry;

/// File extension for entry metadata
const META_EXT: &str = "json";

/// File extension for entry body blobs
const BODY_EXT: &str = "bin";

/// Storage for the named cache generations.
///
/// Each generation is a subdirectory of the root; the directory name is the
/// cache name. At most one generation is current at any time - the others
/// exist only until the next activation deletes them.
#[derive(Debug, Clone)]
pub struct CacheStorage {
    root: PathBuf,
}

impl CacheStorage {
    pub fn open_at(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create cache root: {}", root.display()))?;
        Ok(Self { root })
    }

    /// Open (or create) the cache with the given name.
    pub fn open(&self, name: &str) -> Result<Cache> {
        let dir = self.root.join(name);
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create cache: {}", name))?;
        Ok(Cache {
            name: name.to_string(),
            dir,
        })
    }

    /// Names of all existing cache generations, sorted.
    pub fn names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("Failed to list cache root: {}", self.root.display()))?;
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Delete a whole cache generation. Returns false if it did not exist.
    pub fn delete(&self, name: &str) -> Result<bool> {
        let dir = self.root.join(name);
        if !dir.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&dir).with_context(|| format!("Failed to delete cache: {}", name))?;
        Ok(true)
    }
}

/// Handle to one named cache generation.
#[derive(Debug, Clone)]
pub struct Cache {
    name: String,
    dir: PathBuf,
}

impl Cache {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn entry_stem(key: &str) -> String {
        hex::encode(Sha256::digest(key.as_bytes()))
    }

    fn meta_path(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", stem, META_EXT))
    }

    fn body_path(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", stem, BODY_EXT))
    }

    /// Store a response under the request's exact key.
    pub fn put(&self, request: &Request, response: &Response) -> Result<()> {
        let key = request.cache_key();
        let stem = Self::entry_stem(&key);
        let entry = CachedEntry::from_response(&key, response);

        // Body first: an entry only becomes visible once its metadata lands.
        fs::write(self.body_path(&stem), &response.body)
            .with_context(|| format!("Failed to write cache body: {}", key))?;
        let contents = serde_json::to_string_pretty(&entry)?;
        fs::write(self.meta_path(&stem), contents)
            .with_context(|| format!("Failed to write cache entry: {}", key))?;

        debug!(cache = %self.name, key = %key, "Stored entry");
        Ok(())
    }

    /// Exact-match lookup. Unreadable or truncated entries are logged and
    /// reported as a miss.
    pub fn match_request(&self, request: &Request) -> Option<Response> {
        match self.try_match(request) {
            Ok(found) => found,
            Err(e) => {
                warn!(key = %request.cache_key(), error = %e, "Unreadable cache entry, treating as miss");
                None
            }
        }
    }

    fn try_match(&self, request: &Request) -> Result<Option<Response>> {
        let key = request.cache_key();
        let stem = Self::entry_stem(&key);
        let meta_path = self.meta_path(&stem);
        if !meta_path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&meta_path)
            .with_context(|| format!("Failed to read cache entry: {}", key))?;
        let entry: CachedEntry = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache entry: {}", key))?;

        let body = fs::read(self.body_path(&stem))
            .with_context(|| format!("Failed to read cache body: {}", key))?;
        if body.len() as u64 != entry.body_len {
            anyhow::bail!(
                "Cache body is truncated: {} ({} of {} bytes)",
                key,
                body.len(),
                entry.body_len
            );
        }

        Ok(Some(entry.into_response(body)))
    }

    pub fn contains(&self, request: &Request) -> bool {
        self.meta_path(&Self::entry_stem(&request.cache_key())).exists()
    }

    /// Bulk population from a locator list: fetch every request and store
    /// the successful responses. An individual failure (or an error status)
    /// is logged and skipped - it never aborts the rest of the batch.
    /// Returns how many entries were stored.
    pub async fn add_all(&self, fetcher: &dyn Fetcher, requests: &[Request]) -> usize {
        let fetches = requests.iter().map(|request| fetcher.fetch(request));
        let results = future::join_all(fetches).await;

        let mut stored = 0;
        for (request, result) in requests.iter().zip(results) {
            match result {
                Ok(response) if response.is_success() => match self.put(request, &response) {
                    Ok(()) => stored += 1,
                    Err(e) => {
                        warn!(url = %request.url(), error = %e, "Failed to store precached resource");
                    }
                },
                Ok(response) => {
                    warn!(url = %request.url(), status = response.status, "Skipping precache resource with error status");
                }
                Err(e) => {
                    warn!(url = %request.url(), error = %e, "Failed to fetch precache resource");
                }
            }
        }
        stored
    }

    /// Number of entries in this cache.
    pub fn len(&self) -> Result<usize> {
        let mut count = 0;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.path().extension().and_then(|ext| ext.to_str()) == Some(META_EXT) {
                count += 1;
            }
        }
        Ok(count)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Destination, Url};
    use crate::net::fetcher::testing::MockFetcher;
    use tempfile::TempDir;

    fn request(url: &str) -> Request {
        Request::get(Url::parse(url).unwrap(), Destination::Other)
    }

    fn response(body: &str, url: &str) -> Response {
        Response::new(
            200,
            vec![("content-type".to_string(), "text/plain".to_string())],
            body.as_bytes().to_vec(),
            url,
        )
    }

    #[test]
    fn test_put_then_match_roundtrip() {
        let dir = TempDir::new().unwrap();
        let storage = CacheStorage::open_at(dir.path()).unwrap();
        let cache = storage.open("planning-cache-v1").unwrap();

        let req = request("http://planning.test/app.js");
        cache.put(&req, &response("console.log(1)", "http://planning.test/app.js")).unwrap();

        let found = cache.match_request(&req).expect("entry should match");
        assert_eq!(found.status, 200);
        assert_eq!(found.text(), "console.log(1)");
        assert!(cache.contains(&req));
        assert_eq!(cache.len().unwrap(), 1);
    }

    #[test]
    fn test_match_miss_on_absent_entry() {
        let dir = TempDir::new().unwrap();
        let storage = CacheStorage::open_at(dir.path()).unwrap();
        let cache = storage.open("planning-cache-v1").unwrap();

        assert!(cache.match_request(&request("http://planning.test/missing")).is_none());
        assert!(cache.is_empty().unwrap());
    }

    #[test]
    fn test_truncated_body_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let storage = CacheStorage::open_at(dir.path()).unwrap();
        let cache = storage.open("planning-cache-v1").unwrap();

        let req = request("http://planning.test/app.js");
        cache.put(&req, &response("full body", "http://planning.test/app.js")).unwrap();

        // Truncate the blob behind the metadata's back.
        let stem = Cache::entry_stem(&req.cache_key());
        fs::write(cache.body_path(&stem), b"fu").unwrap();

        assert!(cache.match_request(&req).is_none());
    }

    #[test]
    fn test_names_and_delete() {
        let dir = TempDir::new().unwrap();
        let storage = CacheStorage::open_at(dir.path()).unwrap();
        storage.open("planning-cache-v1").unwrap();
        storage.open("planning-cache-v2").unwrap();

        assert_eq!(
            storage.names().unwrap(),
            vec!["planning-cache-v1".to_string(), "planning-cache-v2".to_string()]
        );

        assert!(storage.delete("planning-cache-v1").unwrap());
        assert!(!storage.delete("planning-cache-v1").unwrap());
        assert_eq!(storage.names().unwrap(), vec!["planning-cache-v2".to_string()]);
    }

    #[tokio::test]
    async fn test_add_all_skips_individual_failures() {
        let dir = TempDir::new().unwrap();
        let storage = CacheStorage::open_at(dir.path()).unwrap();
        let cache = storage.open("planning-cache-v1").unwrap();

        let fetcher = MockFetcher::new();
        fetcher.insert_ok("http://planning.test/index.html", "text/html", "<html>");
        // No canned response for manifest.json - that fetch fails.

        let requests = vec![
            request("http://planning.test/index.html"),
            request("http://planning.test/manifest.json"),
        ];
        let stored = cache.add_all(&fetcher, &requests).await;

        assert_eq!(stored, 1);
        assert!(cache.contains(&requests[0]));
        assert!(!cache.contains(&requests[1]));
    }

    #[tokio::test]
    async fn test_add_all_skips_error_statuses() {
        let dir = TempDir::new().unwrap();
        let storage = CacheStorage::open_at(dir.path()).unwrap();
        let cache = storage.open("planning-cache-v1").unwrap();

        let fetcher = MockFetcher::new();
        fetcher.insert(
            "http://planning.test/gone.png",
            Response::new(404, Vec::new(), Vec::new(), "http://planning.test/gone.png"),
        );

        let requests = vec![request("http://planning.test/gone.png")];
        assert_eq!(cache.add_all(&fetcher, &requests).await, 0);
        assert!(cache.is_empty().unwrap());
    }
}
