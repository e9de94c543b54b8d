//! axum integration: [`RequestParams`] is an extractor reading the widget's
//! bracket-notation query string, and [`DataTablesResponse`] is a JSON response.
//!
//! ```rust,ignore
//! async fn users(
//!     State(db): State<DatabaseConnection>,
//!     params: RequestParams,
//! ) -> Result<DataTablesResponse, ApiError> {
//!     let mut table = DataTables::new(&db, params);
//!     table.query("SELECT id, name, email FROM users")?;
//!     Ok(table.generate().await?)
//! }
//!
//! let app = Router::new().route("/users", get(users)).with_state(db);
//! ```
//!
//! Widgets configured to POST a JSON body can use `Json<RequestParams>` instead.

use axum::{
    Json,
    extract::{FromRequestParts, Query},
    http::request::Parts,
    response::{IntoResponse, Response},
};

use crate::errors::ApiError;
use crate::models::{DataTablesResponse, RequestParams};

impl<S> FromRequestParts<S> for RequestParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

        Self::from_pairs(pairs).map_err(|err| {
            tracing::debug!(error = %err, "Rejecting malformed DataTables request");
            ApiError::bad_request(format!("Invalid DataTables request: {err}"))
        })
    }
}

impl IntoResponse for DataTablesResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
