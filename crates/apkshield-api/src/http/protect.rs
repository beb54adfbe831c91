//! Protect upload handler: multipart parsing, validation, job execution, and
//! artifact streaming.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Multipart, State},
    http::{StatusCode, header},
    response::Response,
};
use tracing::{info, warn};

use apkshield_jobs::{Artifact, JobError, ProtectionOptions, RawOptions, check_upload};

use crate::http::constants::{CACHE_CONTROL_DOWNLOAD, CONTENT_TYPE_PACKAGE, FIELD_FILE};
use crate::http::errors::ApiError;
use crate::state::ApiState;

/// One parsed multipart request.
struct Upload {
    filename: String,
    bytes: Vec<u8>,
    raw: RawOptions,
}

/// `POST /protect`: validate the upload, run the external tool, and stream the
/// protected artifact back. The handler blocks on the tool invocation; there
/// is no job polling surface.
pub(crate) async fn protect(
    State(state): State<Arc<ApiState>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = read_upload(multipart).await?;
    info!(filename = %upload.filename, size_bytes = upload.bytes.len(), "protect request received");

    match run_job(&state, &upload).await {
        Ok(artifact) => {
            state.metrics.inc_protect_request("completed");
            artifact_response(artifact)
        }
        Err(err) => {
            if let JobError::Validation { code, .. } = &err {
                state.metrics.inc_rejected_upload(code);
            }
            warn!(filename = %upload.filename, error = %err, detail = %err.detail(), "protect request failed");
            let api = ApiError::from(err);
            state.metrics.inc_protect_request(api.outcome());
            Err(api)
        }
    }
}

/// Validate and execute one job. Rejections happen before any subprocess or
/// scratch file exists.
async fn run_job(state: &ApiState, upload: &Upload) -> Result<Artifact, JobError> {
    check_upload(
        &upload.filename,
        upload.bytes.len() as u64,
        state.config.max_upload_bytes,
    )?;
    let options = ProtectionOptions::parse(&upload.raw)?;
    state
        .runner
        .run(&upload.filename, &upload.bytes, &options)
        .await
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut raw = RawOptions::default();

    while let Some(field) = multipart.next_field().await.map_err(|err| {
        ApiError::bad_request("malformed multipart body").with_details(err.to_string())
    })? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if name == FIELD_FILE {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|err| {
                    ApiError::bad_request("failed to read uploaded file")
                        .with_details(err.to_string())
                })?
                .to_vec();
            file = Some((filename, bytes));
            continue;
        }

        let value = field.text().await.map_err(|err| {
            ApiError::bad_request("malformed form field").with_details(err.to_string())
        })?;
        match name.as_str() {
            "debug" => raw.debug = Some(value),
            "disable_acf" => raw.disable_acf = Some(value),
            "dump_code" => raw.dump_code = Some(value),
            "keep_classes" => raw.keep_classes = Some(value),
            "noisy_log" => raw.noisy_log = Some(value),
            "smaller" => raw.smaller = Some(value),
            "use_protect_config" => raw.use_protect_config = Some(value),
            "exclude_abis" => raw.exclude_abis = Some(value),
            // Unknown form fields are ignored, matching the upload form.
            _ => {}
        }
    }

    let (filename, bytes) =
        file.ok_or_else(|| ApiError::bad_request("no APK file provided"))?;
    Ok(Upload {
        filename,
        bytes,
        raw,
    })
}

fn artifact_response(artifact: Artifact) -> Result<Response, ApiError> {
    let disposition = format!("attachment; filename=\"{}\"", artifact.filename);
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, CONTENT_TYPE_PACKAGE)
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::CACHE_CONTROL, CACHE_CONTROL_DOWNLOAD)
        .body(Body::from(artifact.bytes))
        .map_err(|err| {
            ApiError::internal("failed to build artifact response").with_details(err.to_string())
        })
}
