use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};
use serde_json::json;
use axum::Json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Only Excel files can be uploaded (.xlsx, .xls): {0}")]
    InvalidFileType(String),

    #[error("Sheet \"{required}\" not found. Available sheets: {available}")]
    MissingRequiredSheet { required: String, available: String },

    #[error("Sheet \"{0}\" contains no data rows")]
    EmptySheet(String),

    #[error("Failed to read workbook: {0}")]
    Codec(String),

    #[error("Failed to write report workbook: {0}")]
    Export(String),

    #[error("Report {0} not found or expired")]
    ReportNotFound(String),

    #[error("File exceeds the {limit} byte upload limit")]
    PayloadTooLarge { limit: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<calamine::Error> for AppError {
    fn from(err: calamine::Error) -> Self {
        AppError::Codec(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        AppError::Export(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidFileType(_) => StatusCode::BAD_REQUEST,
            AppError::MissingRequiredSheet { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::EmptySheet(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Codec(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ReportNotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("{}", self);
        }

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_by_kind() {
        assert_eq!(AppError::InvalidFileType("a.csv".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::EmptySheet("Rawdata".into()).status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(AppError::ReportNotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::PayloadTooLarge { limit: 1 }.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn missing_sheet_message_lists_available_sheets() {
        let err = AppError::MissingRequiredSheet {
            required: "Rawdata".into(),
            available: "Sheet1, Data".into(),
        };
        assert_eq!(
            err.to_string(),
            "Sheet \"Rawdata\" not found. Available sheets: Sheet1, Data"
        );
    }
}
