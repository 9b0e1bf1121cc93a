//! File-backed cache of raw API responses
//!
//! Keys are the SHA-256 of the query text plus its canonical variables, so
//! the same request always maps to the same entry. The cache file is rotated
//! to `<file>.1 … <file>.N` once it outgrows the configured size.

use crate::config::CacheConfig;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

pub const CACHE_FILE_NAME: &str = "api_cache.json";

pub struct ResponseCache {
    /// None keeps entries in memory only
    path: Option<PathBuf>,
    max_file_bytes: u64,
    max_rotated_files: usize,
    entries: HashMap<String, Value>,
    hits: u64,
    misses: u64,
}

impl ResponseCache {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            max_file_bytes: 0,
            max_rotated_files: 0,
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Open the cache file under `directory`, loading existing entries
    ///
    /// A corrupted file is logged and treated as empty.
    pub fn open(directory: &Path, max_file_bytes: u64, max_rotated_files: usize) -> Self {
        let path = directory.join(CACHE_FILE_NAME);
        let entries = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                warn!("Cache file {} is corrupted, starting empty: {}", path.display(), e);
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };
        debug!("Loaded {} cached responses from {}", entries.len(), path.display());

        Self {
            path: Some(path),
            max_file_bytes,
            max_rotated_files,
            entries,
            hits: 0,
            misses: 0,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        if config.enabled {
            Self::open(
                &config.directory,
                config.max_file_bytes,
                config.max_rotated_files,
            )
        } else {
            Self::in_memory()
        }
    }

    /// Hex SHA-256 of the query and its variables
    ///
    /// `serde_json` maps keep keys sorted, so the variables serialise
    /// canonically.
    pub fn cache_key(query: &str, variables: &Value) -> String {
        let mut hasher = Sha256::new();
        hasher.update(query.as_bytes());
        hasher.update(b"\n");
        hasher.update(variables.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn get(&mut self, query: &str, variables: &Value) -> Option<Value> {
        let key = Self::cache_key(query, variables);
        match self.entries.get(&key) {
            Some(value) => {
                self.hits += 1;
                debug!("Cache hit: {}", &key[..12]);
                Some(value.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Store a response and persist the cache; write failures are logged
    pub fn insert(&mut self, query: &str, variables: &Value, response: Value) {
        self.entries
            .insert(Self::cache_key(query, variables), response);
        if let Err(e) = self.save() {
            error!("Failed to save cache: {}", e);
        }
    }

    fn save(&self) -> io::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        self.rotate(path)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string(&self.entries).map_err(io::Error::other)?;
        fs::write(path, text)
    }

    fn rotated(path: &Path, generation: usize) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push(format!(".{}", generation));
        PathBuf::from(name)
    }

    fn rotate(&self, path: &Path) -> io::Result<()> {
        let size = match fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(_) => return Ok(()),
        };
        if size < self.max_file_bytes || self.max_rotated_files == 0 {
            return Ok(());
        }

        info!("Rotating cache file {} ({} bytes)", path.display(), size);
        let oldest = Self::rotated(path, self.max_rotated_files);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for generation in (1..self.max_rotated_files).rev() {
            let from = Self::rotated(path, generation);
            if from.exists() {
                fs::rename(&from, Self::rotated(path, generation + 1))?;
            }
        }
        fs::rename(path, Self::rotated(path, 1))
    }

    /// Drop all entries and delete the cache file with every rotated generation
    ///
    /// Returns the number of files removed.
    pub fn clear(&mut self) -> io::Result<usize> {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
        let Some(path) = &self.path else {
            return Ok(0);
        };

        let mut removed = 0;
        let candidates = std::iter::once(path.clone())
            .chain((1..=self.max_rotated_files).map(|g| Self::rotated(path, g)));
        for file in candidates {
            if file.exists() {
                fs::remove_file(&file)?;
                removed += 1;
            }
        }
        info!("Removed {} cache files", removed);
        Ok(removed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
        }
    }
}

/// Cache performance statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        if self.hits + self.misses == 0 {
            0.0
        } else {
            (self.hits as f64 / (self.hits + self.misses) as f64) * 100.0
        }
    }

    pub fn total_requests(&self) -> u64 {
        self.hits + self.misses
    }
}
