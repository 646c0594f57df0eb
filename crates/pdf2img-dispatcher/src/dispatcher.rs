use crate::config::DispatcherConfig;
use crate::plan::resolve_batches;
use pdf2img_fetch::{RangeLoader, RangeLoaderConfig};
use pdf2img_pool::WorkerPool;
use pdf2img_types::error::ConvertOutcome;
use pdf2img_types::{
    CancelToken, ConvertError, ConvertResult, ErrorKind, PageResult, PageSelector, PdfInput, RenderOptions,
    StreamStats, Task,
};
use pdf2img_tracker::{Aggregates, Event, Phase, RequestTracker};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Owns per-request page planning and batch submission (spec.md §4.5).
/// Stateless beyond its pool handle and planning knobs; a fresh
/// `Dispatcher` (or a shared one — it holds no per-request state) is
/// cheap to construct per request.
pub struct Dispatcher {
    pool: Arc<WorkerPool>,
    config: DispatcherConfig,
    metrics: Option<Arc<Aggregates>>,
}

impl Dispatcher {
    pub fn new(pool: Arc<WorkerPool>, config: DispatcherConfig) -> Self {
        Self { pool, config, metrics: None }
    }

    pub fn with_defaults(pool: Arc<WorkerPool>) -> Self {
        Self::new(pool, DispatcherConfig::default())
    }

    /// Attaches the process-wide aggregate sink (spec.md §4.6) so range-
    /// fetch and worker-task stats feed `/metrics` rather than sitting
    /// unused. Optional: a `Dispatcher` built without one (tests, the
    /// standalone CLI) just skips recording.
    pub fn with_metrics(mut self, metrics: Arc<Aggregates>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Runs the full per-request pipeline: materialize input, resolve the
    /// page plan, submit batches, collate results.
    pub async fn convert(
        &self,
        input: PdfInput,
        selector: PageSelector,
        options: RenderOptions,
        cancel: CancelToken,
        tracker: Option<&RequestTracker>,
    ) -> ConvertOutcome<ConvertResult> {
        let overall_start = Instant::now();
        if cancel.is_cancelled() {
            return Err(ConvertError::cancelled());
        }
        options.validate().map_err(ConvertError::invalid_input)?;

        if let Some(t) = tracker {
            t.start_phase(Phase::PdfInfo);
        }
        let (materialized, stream_stats) = self.materialize(input, &cancel).await?;
        let input = Arc::new(materialized);
        let total = self.pool.page_count(input.clone()).await?;
        if let Some(t) = tracker {
            t.end_phase();
        }

        let batches = resolve_batches(&selector, total, &self.config);

        if let Some(t) = tracker {
            t.start_phase(Phase::Render);
        }
        let pages = self.run_batches(&input, batches, &options, &cancel, tracker).await?;
        if let Some(t) = tracker {
            t.end_phase();
        }

        let num_rendered = pages.iter().filter(|p| p.success).count();
        if num_rendered == 0 && !pages.is_empty() {
            let dominant = dominant_error_kind(&pages);
            if let Some(t) = tracker {
                t.record_event(Event::Error);
            }
            return Err(ConvertError::new(dominant, "every requested page failed to render"));
        }

        let render_ms = pages.iter().map(|p| p.render_ms).sum();
        let encode_ms = pages.iter().map(|p| p.encode_ms).sum();

        Ok(ConvertResult {
            num_pages_total: total,
            num_rendered,
            format: options.format,
            pages,
            total_ms: overall_start.elapsed().as_millis() as u64,
            render_ms,
            encode_ms,
            stream_stats,
            worker_count: self.pool.stats().workers,
        })
    }

    async fn run_batches(
        &self,
        input: &Arc<PdfInput>,
        batches: Vec<Vec<usize>>,
        options: &RenderOptions,
        cancel: &CancelToken,
        tracker: Option<&RequestTracker>,
    ) -> ConvertOutcome<Vec<PageResult>> {
        let batch_futures = batches.into_iter().map(|batch| {
            let input = input.clone();
            let options = *options;
            let pool = self.pool.clone();
            async move {
                let page_futures = batch
                    .into_iter()
                    .map(|page_num| pool.submit(Task::new(input.clone(), page_num, options)));
                futures::future::join_all(page_futures).await
            }
        });

        let collate = futures::future::join_all(batch_futures);
        tokio::pin!(collate);

        let all_batches = tokio::select! {
            biased;
            result = &mut collate => result,
            _ = cancel.cancelled() => {
                return Err(ConvertError::cancelled());
            }
        };

        let mut first_image_recorded = false;
        let mut pages = Vec::new();
        for batch_pages in all_batches {
            for page in batch_pages {
                if let Some(metrics) = &self.metrics {
                    metrics.record_worker_task(page.render_ms + page.encode_ms);
                }
                if page.success && !first_image_recorded {
                    first_image_recorded = true;
                    if let Some(t) = tracker {
                        t.record_event(Event::FirstImageReady);
                    }
                }
                pages.push(page);
            }
        }
        pages.sort_by_key(|p| p.page_num);
        Ok(pages)
    }

    /// Resolves a `PdfInput` into a form the Rasterizer contract accepts
    /// directly (a local path or an in-memory buffer). `Url` inputs are
    /// fetched in full via the RangeLoader first: the Rasterizer contract
    /// operates on a complete buffer or path, so true incremental
    /// rendering mid-transfer isn't achievable without a PDF-aware
    /// incremental parser, which sits outside the Rasterizer's black-box
    /// contract. The RangeLoader's parallel sub-range fetching still
    /// overlaps connection setup and transfer the way it would for a
    /// partial fetch.
    async fn materialize(
        &self,
        input: PdfInput,
        cancel: &CancelToken,
    ) -> ConvertOutcome<(PdfInput, Option<StreamStats>)> {
        match input {
            PdfInput::Url(url) => {
                if cancel.is_cancelled() {
                    return Err(ConvertError::cancelled());
                }
                let loader = RangeLoader::new(url, RangeLoaderConfig::default())?;
                let total_len = loader.head().await?;
                let end = total_len.saturating_sub(1);
                let fetch = loader.fetch_range(0, end);
                tokio::pin!(fetch);
                let bytes = tokio::select! {
                    biased;
                    result = &mut fetch => result?,
                    _ = cancel.cancelled() => return Err(ConvertError::cancelled()),
                };
                let stats = loader.stats();
                if let Some(metrics) = &self.metrics {
                    metrics.record_range_fetch(stats.total_bytes, stats.request_count);
                }
                let stream_stats = StreamStats {
                    request_count: stats.request_count,
                    total_bytes: stats.total_bytes,
                    avg_request_ms: stats.avg_request_ms,
                };
                Ok((PdfInput::BytesOwned(Arc::new(bytes)), Some(stream_stats)))
            }
            other => Ok((other, None)),
        }
    }
}

/// Most common error kind among the request's failed pages, used as the
/// surfaced error when every page failed (spec.md §7 policy).
fn dominant_error_kind(pages: &[PageResult]) -> ErrorKind {
    let mut counts: HashMap<ErrorKind, usize> = HashMap::new();
    for page in pages {
        if let Some(kind) = page.error_kind {
            *counts.entry(kind).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .max_by_key(|(_, count)| *count)
        .map(|(kind, _)| kind)
        .unwrap_or(ErrorKind::PageRenderFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdf2img_pool::WorkerPoolConfig;
    use pdf2img_rasterize::create_rasterizer;
    use std::time::Duration;

    fn sample_pdf(pages: usize) -> PdfInput {
        let mut body = String::from("%PDF-1.4\n");
        for _ in 0..pages {
            body.push_str("/Type/Page\n");
        }
        PdfInput::BytesOwned(Arc::new(body.into_bytes()))
    }

    fn test_dispatcher(worker_count: usize) -> Dispatcher {
        let pool = WorkerPool::new_with_rasterizer(
            WorkerPoolConfig {
                worker_count,
                idle_timeout: Duration::from_millis(500),
                queue_capacity: 64,
            },
            create_rasterizer(),
        );
        Dispatcher::with_defaults(pool)
    }

    #[tokio::test]
    async fn first_n_renders_min_of_n_and_total() {
        let dispatcher = test_dispatcher(2);
        let result = dispatcher
            .convert(
                sample_pdf(3),
                PageSelector::FirstN(10),
                RenderOptions::default(),
                CancelToken::new(),
                None,
            )
            .await
            .unwrap();
        assert_eq!(result.num_pages_total, 3);
        assert_eq!(result.num_rendered, 3);
        assert!(result.pages_are_sorted_and_unique());
    }

    #[tokio::test]
    async fn all_covers_every_page_across_batches() {
        let dispatcher = test_dispatcher(4);
        let result = dispatcher
            .convert(
                sample_pdf(20),
                PageSelector::All,
                RenderOptions::default(),
                CancelToken::new(),
                None,
            )
            .await
            .unwrap();
        assert_eq!(result.num_rendered, 20);
        let page_nums: Vec<usize> = result.pages.iter().map(|p| p.page_num).collect();
        assert_eq!(page_nums, (1..=20).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn explicit_selector_drops_out_of_range_pages() {
        let dispatcher = test_dispatcher(2);
        let selector = PageSelector::normalize(vec![1, 2, 100]);
        let result = dispatcher
            .convert(sample_pdf(2), selector, RenderOptions::default(), CancelToken::new(), None)
            .await
            .unwrap();
        assert_eq!(result.num_rendered, 2);
    }

    #[tokio::test]
    async fn already_cancelled_token_fails_immediately() {
        let dispatcher = test_dispatcher(1);
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = dispatcher
            .convert(
                sample_pdf(1),
                PageSelector::FirstN(1),
                RenderOptions::default(),
                cancel,
                None,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Cancelled);
    }

    #[tokio::test]
    async fn empty_buffer_fails_with_malformed() {
        let dispatcher = test_dispatcher(1);
        let input = PdfInput::BytesOwned(Arc::new(Vec::new()));
        let err = dispatcher
            .convert(
                input,
                PageSelector::FirstN(1),
                RenderOptions::default(),
                CancelToken::new(),
                None,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Malformed);
    }
}
