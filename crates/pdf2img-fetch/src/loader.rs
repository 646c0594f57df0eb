use crate::config::RangeLoaderConfig;
use crate::retry::RetryConfig;
use crate::stats::{LoaderStats, RangeLoaderStats};
use futures::future::try_join_all;
use pdf2img_types::error::ConvertOutcome;
use pdf2img_types::ConvertError;
use reqwest::header::{ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, RANGE};
use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Fetches a remote PDF's bytes via chunked HTTP byte ranges (spec.md
/// §4.4). Grounded on `riptide-fetch::fetch::ReliableHttpClient`'s client
/// construction (gzip, explicit connect/total timeouts) and retry shape.
pub struct RangeLoader {
    client: Client,
    url: String,
    config: RangeLoaderConfig,
    retry: RetryConfig,
    stats: Arc<LoaderStats>,
    accepts_ranges: std::sync::atomic::AtomicBool,
}

impl RangeLoader {
    pub fn new(url: impl Into<String>, config: RangeLoaderConfig) -> ConvertOutcome<Self> {
        let client = Client::builder()
            .gzip(true)
            .connect_timeout(std::time::Duration::from_secs(5))
            .timeout(config.overall_timeout)
            .build()
            .map_err(|e| ConvertError::fetch_failed(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
            config,
            retry: RetryConfig::default(),
            stats: Arc::new(LoaderStats::default()),
            accepts_ranges: std::sync::atomic::AtomicBool::new(true),
        })
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Content length via `HEAD`, falling back to a one-byte range
    /// request when the server doesn't answer `HEAD` usefully.
    pub async fn head(&self) -> ConvertOutcome<u64> {
        let start = Instant::now();
        let resp = self
            .client
            .head(&self.url)
            .send()
            .await
            .map_err(|e| ConvertError::fetch_failed(format!("HEAD {}: {e}", self.url)))?;

        let accepts_ranges = resp
            .headers()
            .get(ACCEPT_RANGES)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.eq_ignore_ascii_case("bytes"))
            .unwrap_or(false);
        self.accepts_ranges
            .store(accepts_ranges, std::sync::atomic::Ordering::Relaxed);

        let length = resp
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        self.stats.record(0, start.elapsed().as_millis() as u64);

        match length {
            Some(len) => Ok(len),
            None => {
                debug!(url = %self.url, "HEAD returned no Content-Length, falling back to ranged probe");
                self.head_via_range().await
            }
        }
    }

    async fn head_via_range(&self) -> ConvertOutcome<u64> {
        let start = Instant::now();
        let resp = self
            .client
            .get(&self.url)
            .header(RANGE, "bytes=0-0")
            .send()
            .await
            .map_err(|e| ConvertError::fetch_failed(format!("ranged HEAD probe {}: {e}", self.url)))?;

        let accepts_ranges = resp.status().as_u16() == 206;
        self.accepts_ranges
            .store(accepts_ranges, std::sync::atomic::Ordering::Relaxed);

        let total = resp
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.rsplit('/').next())
            .and_then(|v| v.parse::<u64>().ok());

        self.stats.record(0, start.elapsed().as_millis() as u64);

        total.ok_or_else(|| ConvertError::fetch_failed("server did not report a total content length"))
    }

    /// Returns exactly `end_inclusive - start + 1` bytes, or fails with
    /// `RangeFetchFailed`. Splits into `small_chunk_size` sub-requests
    /// issued in parallel, stitched back in order.
    pub async fn fetch_range(&self, start: u64, end_inclusive: u64) -> ConvertOutcome<Vec<u8>> {
        if end_inclusive < start {
            return Err(ConvertError::invalid_input("fetch_range: end before start"));
        }
        let total_len = end_inclusive - start + 1;

        if !self.accepts_ranges.load(std::sync::atomic::Ordering::Relaxed) {
            return self.fetch_full_fallback(start, end_inclusive).await;
        }

        let small = self.config.small_chunk_size as u64;
        let mut sub_ranges = Vec::new();
        let mut cursor = start;
        while cursor <= end_inclusive {
            let sub_end = (cursor + small - 1).min(end_inclusive);
            sub_ranges.push((cursor, sub_end));
            cursor = sub_end + 1;
        }

        let futures = sub_ranges
            .iter()
            .copied()
            .map(|(s, e)| self.fetch_sub_range_with_retry(s, e));
        let chunks = try_join_all(futures).await?;

        let mut out = Vec::with_capacity(total_len as usize);
        for chunk in chunks {
            out.extend_from_slice(&chunk);
        }
        if out.len() as u64 != total_len {
            return Err(ConvertError::range_fetch_failed(format!(
                "expected {total_len} bytes, assembled {}",
                out.len()
            )));
        }
        Ok(out)
    }

    async fn fetch_full_fallback(&self, start: u64, end_inclusive: u64) -> ConvertOutcome<Vec<u8>> {
        warn!(url = %self.url, "server does not advertise Accept-Ranges; falling back to full download");
        let req_start = Instant::now();
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ConvertError::fetch_failed(format!("GET {}: {e}", self.url)))?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ConvertError::fetch_failed(format!("reading body: {e}")))?;
        self.stats.record(bytes.len() as u64, req_start.elapsed().as_millis() as u64);

        let start = start as usize;
        let end = (end_inclusive as usize).min(bytes.len().saturating_sub(1));
        if start > end || end >= bytes.len() {
            return Err(ConvertError::range_fetch_failed(
                "requested range exceeds downloaded content",
            ));
        }
        Ok(bytes[start..=end].to_vec())
    }

    async fn fetch_sub_range_with_retry(&self, start: u64, end_inclusive: u64) -> ConvertOutcome<Vec<u8>> {
        let mut last_err = None;
        for attempt in 0..self.retry.max_attempts {
            if attempt > 0 {
                tokio::time::sleep(self.retry.delay_for(attempt - 1)).await;
            }
            match self.fetch_sub_range_once(start, end_inclusive).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) => {
                    debug!(attempt, start, end_inclusive, error = %e, "range sub-request failed");
                    last_err = Some(e);
                }
            }
        }
        Err(ConvertError::range_fetch_failed(format!(
            "range {start}-{end_inclusive} failed after {} attempts: {}",
            self.retry.max_attempts,
            last_err.map(|e| e.message).unwrap_or_default()
        )))
    }

    async fn fetch_sub_range_once(&self, start: u64, end_inclusive: u64) -> ConvertOutcome<Vec<u8>> {
        let req_start = Instant::now();
        let resp = tokio::time::timeout(
            self.config.request_timeout,
            self.client
                .get(&self.url)
                .header(RANGE, format!("bytes={start}-{end_inclusive}"))
                .send(),
        )
        .await
        .map_err(|_| ConvertError::range_fetch_failed("sub-request timed out"))?
        .map_err(|e| ConvertError::range_fetch_failed(format!("{e}")))?;

        if resp.status().as_u16() != 206 && resp.status().as_u16() != 200 {
            return Err(ConvertError::range_fetch_failed(format!(
                "unexpected status {}",
                resp.status()
            )));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ConvertError::range_fetch_failed(format!("reading body: {e}")))?;
        self.stats.record(bytes.len() as u64, req_start.elapsed().as_millis() as u64);

        let expected = (end_inclusive - start + 1) as usize;
        if bytes.len() != expected {
            return Err(ConvertError::range_fetch_failed(format!(
                "expected {expected} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(bytes.to_vec())
    }

    pub fn stats(&self) -> RangeLoaderStats {
        self.stats.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_delay_grows_and_caps() {
        let retry = RetryConfig {
            jitter: false,
            ..RetryConfig::default()
        };
        let d0 = retry.delay_for(0);
        let d1 = retry.delay_for(1);
        assert!(d1 >= d0);
        assert!(retry.delay_for(20) <= retry.max_delay);
    }
}
