use crate::api::ResponseCache;
use crate::config::AppConfig;
use crate::errors::AppResult;
use clap::Args;

/// Delete the cache file and its rotated generations
#[derive(Args)]
pub struct ClearCacheCommand {}

impl ClearCacheCommand {
    pub fn run(&self, config: &AppConfig) -> AppResult<()> {
        let cache = &config.cache;
        let mut response_cache =
            ResponseCache::open(&cache.directory, cache.max_file_bytes, cache.max_rotated_files);
        let entries = response_cache.len();
        let removed = response_cache.clear()?;
        println!(
            "Cleared {} cached responses ({} files) from {}",
            entries,
            removed,
            cache.directory.display()
        );
        Ok(())
    }
}
