//! ID photo processing handler.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use photoid_media::{decode_matted, prepare_source, render_photo, EncodedPhoto, PhotoJob};
use photoid_models::ProcessRequest;
use tracing::info;
use validator::Validate;

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

const MISSING_IMAGE_URL: &str = "Missing 'image_url' in request body";

/// Turn a photo URL into a framed ID photo.
///
/// Download, background removal, face detection, crop, resize and encode
/// run in that order; the response body is the encoded image.
pub async fn process_photo(
    State(state): State<AppState>,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let result = run_pipeline(&state, payload).await;
    if let Err(e) = &result {
        metrics::record_photo_failed(e.kind());
    }
    result
}

async fn run_pipeline(
    state: &AppState,
    payload: Result<Json<ProcessRequest>, JsonRejection>,
) -> ApiResult<Response> {
    let Json(request) = payload.map_err(|e| {
        ApiError::bad_request(format!(
            "Invalid request body, expected a JSON object with 'image_url': {}",
            e.body_text()
        ))
    })?;

    let image_url = match request.image_url.as_deref() {
        Some(url) => url.to_string(),
        None => return Err(ApiError::bad_request(MISSING_IMAGE_URL)),
    };

    request
        .validate()
        .map_err(|e| ApiError::bad_request(format!("Invalid request body: {}", e)))?;

    let (output_width, output_height) = request.output_size();
    let job = PhotoJob {
        output_width,
        output_height,
        bg_color: request.bg_color,
        policy: state.config.crop_policy,
    };

    info!(
        url = %image_url,
        width = output_width,
        height = output_height,
        bg_color = %job.bg_color,
        "Processing ID photo"
    );

    // Download
    let start = Instant::now();
    let source = state.fetcher.fetch(&image_url).await?;
    metrics::record_download_duration(start.elapsed().as_secs_f64());

    // Background removal works on a PNG of the decoded source
    let start = Instant::now();
    let png = tokio::task::spawn_blocking(move || prepare_source(&source)).await??;
    let matted = state.remover.remove_background(png).await?;
    metrics::record_bg_removal_duration(start.elapsed().as_secs_f64());

    // Detect, crop, composite, encode
    let start = Instant::now();
    let detector = Arc::clone(&state.detector);
    let rendered = tokio::task::spawn_blocking(move || {
        let matted = decode_matted(&matted)?;
        render_photo(&matted, detector.as_ref(), &job)
    })
    .await??;
    metrics::record_render_duration(start.elapsed().as_secs_f64());

    let branch = if rendered.face.is_some() { "face" } else { "fallback" };
    metrics::record_photo_processed(branch, rendered.photo.format.extension());

    info!(
        branch,
        faces = rendered.faces_detected,
        bytes = rendered.photo.data.len(),
        "ID photo ready"
    );

    Ok(photo_response(rendered.photo))
}

fn photo_response(photo: EncodedPhoto) -> Response {
    let disposition = format!("inline; filename=\"{}\"", photo.format.download_name());

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, photo.format.mime_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        photo.data,
    )
        .into_response()
}
