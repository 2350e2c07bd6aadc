//! Shared response envelope.
//!
//! Every successful API response is `{ "data": ... }`.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Body of responses that tell the client where to go next.
#[derive(Debug, Serialize)]
pub struct Redirect<T: Serialize> {
    pub redirect_to: String,
    #[serde(flatten)]
    pub result: T,
}
