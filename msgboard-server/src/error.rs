use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use eyre::Report;
use handlebars::RenderError;

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("table `{table}` does not exist")]
    MissingTable { table: Box<str> },
    #[error("database error")]
    Database(Report),
    #[error("failed to render page")]
    Render(#[from] RenderError),
    #[error("missing form field `message`")]
    MissingField,
}

impl PageError {
    pub fn response(&self) -> (StatusCode, String) {
        match self {
            Self::MissingTable { table } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("❌ Table '{table}' does not exist in database."),
            ),
            Self::Database(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("❌ Database error: {err:#}"),
            ),
            Self::Render(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_owned(),
            ),
            Self::MissingField => (
                StatusCode::BAD_REQUEST,
                "❌ Missing form field 'message'.".to_owned(),
            ),
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let (status_code, msg) = self.response();

        match self {
            Self::Database(err) => warn!("{:?}", err.wrap_err("database request failed")),
            err => warn!("{:?}", Report::new(err)),
        }

        (status_code, msg).into_response()
    }
}
