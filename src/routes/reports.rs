use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, Path, Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use crate::{
    AppState,
    error::AppError,
    services::{
        excel::{report_file_name, types::XLSX_CONTENT_TYPE, SheetWriter},
        file_processor::{self, ProcessedUpload, RawPreview, SheetStats},
        stats::Report,
    },
};
use tower_http::cors::{CorsLayer, Any};

pub fn routes(max_file_size: usize) -> Router<Arc<AppState>> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/reports", post(upload_report))
        .route("/reports/:id", get(get_report))
        .route("/reports/:id/download", get(download_report))
        .layer(DefaultBodyLimit::max(max_file_size))
        .layer(cors)
}

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    file_name: String,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    report_id: Uuid,
    file_name: String,
    download_url: String,
    stats: SheetStats,
    raw_preview: RawPreview,
    report: Report,
}

impl AnalysisResponse {
    fn new(id: Uuid, upload: &ProcessedUpload, preview_rows: usize) -> Self {
        Self {
            report_id: id,
            file_name: upload.file_name.clone(),
            download_url: format!("/reports/{}/download", id),
            stats: upload.stats,
            raw_preview: RawPreview::from_table(&upload.table, preview_rows),
            report: upload.report.clone(),
        }
    }
}

#[axum::debug_handler]
async fn upload_report(
    State(state): State<Arc<AppState>>,
    Query(params): Query<UploadParams>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let start = std::time::Instant::now();
    let body = read_body(body, state.config.max_file_size)?;

    let upload = file_processor::process_upload(params.file_name, body, state.config.analyzer).await?;
    let (id, upload) = state.reports.insert(upload);

    tracing::info!("Report {} ready for {} in {:?}", id, upload.file_name, start.elapsed());
    Ok(Json(AnalysisResponse::new(id, &upload, state.config.preview_rows)))
}

/// Turns body extraction failures into JSON errors; the body limit layer
/// otherwise answers 413 in plain text.
fn read_body(body: Result<Bytes, BytesRejection>, limit: usize) -> Result<Bytes, AppError> {
    let body = match body {
        Ok(body) => body,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return Err(AppError::PayloadTooLarge { limit });
        }
        Err(rejection) => return Err(AppError::InvalidInput(rejection.body_text())),
    };

    if body.is_empty() {
        return Err(AppError::InvalidInput("No file provided".to_string()));
    }
    if body.len() > limit {
        return Err(AppError::PayloadTooLarge { limit });
    }
    Ok(body)
}

async fn get_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let upload = state.reports.get(&id)
        .ok_or_else(|| AppError::ReportNotFound(id.to_string()))?;

    Ok(Json(AnalysisResponse::new(id, &upload, state.config.preview_rows)))
}

async fn download_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let upload = state.reports.get(&id)
        .ok_or_else(|| AppError::ReportNotFound(id.to_string()))?;

    if upload.report.is_empty() {
        return Err(AppError::InvalidInput("No report to download".to_string()));
    }

    let buffer = tokio::task::spawn_blocking(move || {
        SheetWriter.write_report(&upload.table, &upload.report)
    })
    .await??;

    let file_name = report_file_name(chrono::Utc::now());
    tracing::info!("Serving report {} as {}", id, file_name);

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", file_name)),
        ],
        buffer,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::extract::{FromRequest, Request};
    use axum::body::Body;
    use rust_xlsxwriter::Workbook;

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(Config::default()))
    }

    fn params(file_name: &str) -> Query<UploadParams> {
        Query(UploadParams { file_name: file_name.to_string() })
    }

    fn people_workbook(sheet_name: &str) -> Bytes {
        let mut workbook = Workbook::new();
        let ws = workbook.add_worksheet();
        ws.set_name(sheet_name).unwrap();
        let rows = [["Name", "Age"], ["Al", "30"], ["Bo", "30"], ["Al", ""]];
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    ws.write_string(r as u32, c as u16, *value).unwrap();
                }
            }
        }
        Bytes::from(workbook.save_to_buffer().unwrap())
    }

    #[tokio::test]
    async fn upload_then_fetch_and_download() {
        let state = state();
        let Json(analysis) = upload_report(State(state.clone()), params("people.xlsx"), Ok(people_workbook("Rawdata")))
            .await
            .unwrap();

        assert_eq!(analysis.stats.total_rows, 3);
        assert_eq!(analysis.stats.numeric_columns, 1);
        assert_eq!(analysis.raw_preview.headers, vec!["Name", "Age"]);
        assert_eq!(analysis.report.len(), 4);

        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["report"][3]["top_values"], "30 (2)");
        assert_eq!(json["raw_preview"]["rows"][0]["Name"], "Al");

        let Json(again) = get_report(State(state.clone()), Path(analysis.report_id)).await.unwrap();
        assert_eq!(again.report, analysis.report);

        let response = download_report(State(state), Path(analysis.report_id)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], XLSX_CONTENT_TYPE);
        let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=\"Report_"));
        assert!(disposition.ends_with(".xlsx\""));
    }

    #[tokio::test]
    async fn missing_sheet_is_unprocessable() {
        let err = upload_report(State(state()), params("people.xlsx"), Ok(people_workbook("Sheet1")))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.to_string().contains("Rawdata"));
    }

    #[tokio::test]
    async fn rejects_bad_uploads() {
        let err = upload_report(State(state()), params("people.csv"), Ok(people_workbook("Rawdata")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidFileType(_)));

        let err = upload_report(State(state()), params("people.xlsx"), Ok(Bytes::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let small = Arc::new(AppState::new(Config { max_file_size: 4, ..Config::default() }));
        let err = upload_report(State(small), params("people.xlsx"), Ok(people_workbook("Rawdata")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge { limit: 4 }));
    }

    #[tokio::test]
    async fn oversized_body_is_a_json_payload_error() {
        // 3 MiB is past the extractor's default 2 MiB cap
        let request = Request::new(Body::from(vec![0u8; 3 * 1024 * 1024]));
        let body = Bytes::from_request(request, &()).await;
        assert!(body.is_err());

        let err = read_body(body, 1024).unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge { limit: 1024 }));

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(json["error"].as_str().unwrap().contains("1024"));
    }

    #[tokio::test]
    async fn unknown_report_is_not_found() {
        let err = download_report(State(state()), Path(Uuid::new_v4())).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
