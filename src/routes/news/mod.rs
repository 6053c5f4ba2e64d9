mod headlines;
mod search;
mod store;

pub use headlines::*;
pub use search::*;
pub use store::*;

use crate::connectors::ConnectorError;
use crate::helpers::JsonResponse;

/// Envelope for a failed provider call: fetch failures carry the route's code,
/// anything else is reported as unexpected.
fn provider_error(err: ConnectorError, failure_code: &str) -> actix_web::Error {
    if err.is_fetch_failure() {
        tracing::error!(error = %err, code = failure_code, "News provider request failed");
        JsonResponse::<()>::build()
            .set_code(failure_code)
            .bad_request("Failed to fetch news articles")
    } else {
        tracing::error!(error = %err, "Unexpected news provider failure");
        JsonResponse::<()>::build()
            .set_code("UNEXPECTED_ERROR")
            .bad_request("An unexpected error occurred")
    }
}
