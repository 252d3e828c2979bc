// Copyright 2024 Andrew Conway.
// This file is part of MunicipalVotes.
// MunicipalVotes is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MunicipalVotes is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MunicipalVotes.  If not, see <https://www.gnu.org/licenses/>.

use std::path::{PathBuf, Path};
use std::thread::sleep;
use std::time::Duration;
use std::sync::Mutex;
use anyhow::{anyhow, Context};
use once_cell::sync::OnceCell;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use tracing::{info, warn};
use crate::parse_util::decode_page_bytes;

/// How hard to try when a download fails for what may be a temporary reason.
#[derive(Debug,Clone,Copy)]
pub struct RetryPolicy {
    /// total number of attempts, including the first.
    pub attempts : u32,
    /// pause after the first failure. Doubles after each subsequent failure.
    pub initial_backoff : Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self { RetryPolicy{ attempts: 3, initial_backoff: Duration::from_secs(2) } }
}

impl RetryPolicy {
    pub fn backoff_before_attempt(&self,attempt:u32) -> Duration {
        // attempt is 1 based; there is no pause before attempt 1.
        if attempt<=1 { Duration::ZERO } else { self.initial_backoff*2u32.saturating_pow(attempt-2) }
    }
}

/// Helper for downloading a URL to a local file equivalent.
/// Tries to make this an obvious mirror of the URL.
/// This is not possible for URLs ending in / (or the root dir); these have index.html added on.
#[derive(Clone)]
pub struct CacheDir {
    base : PathBuf,
    retry : RetryPolicy,
    client : Client,
}

/// Whether a failed request is worth trying again.
fn is_transient(error:&reqwest::Error) -> bool {
    if let Some(status) = error.status() { status.is_server_error() || status==StatusCode::TOO_MANY_REQUESTS }
    else { error.is_timeout() || error.is_connect() || error.is_request() || error.is_body() }
}

impl CacheDir {
    fn rate_limit() {
        static DOWNLOAD_RATE_LIMIT_MUTEX: OnceCell<Mutex<()>> = OnceCell::new();
        let _lock = DOWNLOAD_RATE_LIMIT_MUTEX.get_or_init(||Mutex::new(())).lock().unwrap_or_else(|poisoned|poisoned.into_inner());
        sleep(Duration::from_millis(1000));
    }
    pub fn new<P:AsRef<Path>>(path:P) -> anyhow::Result<Self> {
        let path : &Path = path.as_ref();
        let client = Client::builder()
            .user_agent(concat!("municipal_votes/",env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(CacheDir{ base: path.to_path_buf(), retry: RetryPolicy::default(), client })
    }

    pub fn with_retry(mut self,retry:RetryPolicy) -> Self {
        self.retry=retry;
        self
    }

    /// Get where a file representing said path should be stored.
    pub fn file(&self,url_path:&str) -> PathBuf {
        let res = self.base.join(url_path);
        if url_path.chars().last().map(std::path::is_separator).unwrap_or(true) { res.join("index.html")} else {res}
    }

    /// Get the path a url should be stored to.
    pub fn get_file_path(&self,url:&str) -> PathBuf {
        let url_path = url.trim_start_matches("https://").trim_start_matches("http://");
        self.file(url_path)
    }

    /// Download a url with retries, without touching the cache. A permanent failure, or
    /// running out of attempts, is an error; nothing is ever substituted for the real contents.
    fn download(&self,url:&str) -> anyhow::Result<Vec<u8>> {
        let mut attempt = 1;
        loop {
            sleep(self.retry.backoff_before_attempt(attempt));
            Self::rate_limit();
            info!(url,attempt,"downloading");
            let result = self.client.get(url).send().and_then(|r|r.error_for_status()).and_then(|r|r.bytes());
            match result {
                Ok(bytes) => return Ok(bytes.to_vec()),
                Err(e) if is_transient(&e) && attempt<self.retry.attempts => {
                    warn!(url,attempt,error=%e,"transient download failure, will retry");
                    attempt+=1;
                }
                Err(e) => return Err(anyhow!(e).context(format!("Could not download {} after {} attempt(s)",url,attempt))),
            }
        }
    }

    /// Download a url using Reqwest and store, unless it has been stored already. Returns the path to the stored file.
    pub fn get_or_download(&self,url:&str) -> anyhow::Result<PathBuf> {
        let file = self.get_file_path(url);
        if !file.exists() {
            let contents = self.download(url)?;
            if let Some(p) = file.parent() {
                std::fs::create_dir_all(p)?;
            }
            std::fs::write(&file,contents).with_context(||format!("Could not store {} in {}",url,file.to_string_lossy()))?;
        }
        Ok(file)
    }

    /// Download a url using Reqwest, and return as a string.
    pub fn get_or_download_string(&self,url:&str) -> anyhow::Result<String> {
        let path = self.get_or_download(url)?;
        let bytes = std::fs::read(&path)?;
        Ok(decode_page_bytes(&bytes).into_owned())
    }
}
