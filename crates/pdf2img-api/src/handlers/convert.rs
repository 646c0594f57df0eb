use crate::dto::{convert_result_to_pages, ConvertRequest, Envelope};
use crate::errors::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use pdf2img_types::{CancelToken, ErrorKind, PdfInput};
use pdf2img_tracker::{Phase, RequestTracker};
use tracing::instrument;

/// `POST /pdf2img` (spec.md §4.7, §6): validates, checks health, acquires
/// a render permit, then hands off to the Dispatcher. Generalizes
/// `riptide-api::handlers::pdf::process_pdf`'s guard-acquisition and
/// `ResourceResult` match-dispatch shape.
#[instrument(skip(state, request))]
pub async fn convert(State(state): State<AppState>, Json(request): Json<ConvertRequest>) -> ApiResult<Json<Envelope<serde_json::Value>>> {
    let tracker = RequestTracker::new();
    tracing::info!(request_id = %tracker.request_id(), "convert request received");

    tracker.start_phase(Phase::Validation);
    let (url, _global_pad_id, selector, options) = request.into_parts()?;
    tracker.end_phase();

    tracker.start_phase(Phase::HealthCheck);
    let health = state.health.check().await;
    tracker.end_phase();
    if !health.healthy {
        let summary = tracker.finish(false, Some(ErrorKind::Overloaded.to_string()));
        state.metrics.record_request(&summary);
        return Err(ApiError::overloaded(health.reasons, health.metrics));
    }

    let cancel = CancelToken::new();
    tracker.start_phase(Phase::Queue);
    let permit = state.semaphore.acquire(&cancel).await;
    tracker.end_phase();
    let permit = match permit {
        Ok(permit) => permit,
        Err(e) => {
            let summary = tracker.finish(false, Some(e.kind.to_string()));
            state.metrics.record_request(&summary);
            return Err(e.into());
        }
    };
    state.metrics.enter_in_flight();

    let input = PdfInput::Url(url);
    let result = state
        .dispatcher
        .convert(input, selector, options, cancel, Some(&tracker))
        .await;

    state.metrics.exit_in_flight();
    drop(permit);

    match result {
        Ok(converted) => {
            let summary = tracker.finish(true, None);
            state.metrics.record_request(&summary);
            for page in &converted.pages {
                state.metrics.record_page_render(page.render_ms);
            }
            let pages = convert_result_to_pages(&converted);
            Ok(Json(Envelope::ok(serde_json::to_value(pages).unwrap_or_default())))
        }
        Err(e) => {
            let summary = tracker.finish(false, Some(e.kind.to_string()));
            state.metrics.record_request(&summary);
            Err(e.into())
        }
    }
}
