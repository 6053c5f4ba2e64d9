use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::{Error, HttpResponse};
use serde::Serialize;

/// Envelope returned by every endpoint except the 401 responses of the auth layer.
#[derive(Serialize, Debug)]
pub struct JsonResponse<T> {
    pub message: String,
    pub error: bool,
    pub code: String,
    pub data: Option<T>,
}

pub struct JsonResponseBuilder<T> {
    code: Option<String>,
    data: Option<T>,
}

impl<T> JsonResponse<T>
where
    T: Serialize,
{
    pub fn build() -> JsonResponseBuilder<T> {
        JsonResponseBuilder {
            code: None,
            data: None,
        }
    }
}

impl<T> JsonResponseBuilder<T>
where
    T: Serialize,
{
    pub fn set_code(mut self, code: &str) -> Self {
        self.code = Some(code.to_string());
        self
    }

    pub fn set_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }

    fn into_body(self, message: String, error: bool) -> JsonResponse<T> {
        JsonResponse {
            message,
            error,
            code: self.code.unwrap_or_else(|| "GENERIC".to_string()),
            data: self.data,
        }
    }

    pub fn ok<M: Into<String>>(self, message: M) -> HttpResponse {
        HttpResponse::Ok().json(self.into_body(message.into(), false))
    }

    pub fn bad_request<M: Into<String>>(self, message: M) -> Error {
        self.to_error(message.into(), StatusCode::BAD_REQUEST)
    }

    pub fn internal_server_error<M: Into<String>>(self, message: M) -> Error {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "Internal error".to_string()
        } else {
            message
        };
        self.to_error(message, StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn to_error(self, message: String, status: StatusCode) -> Error {
        let response = HttpResponse::build(status).json(self.into_body(message.clone(), true));
        InternalError::from_response(message, response).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn ok_envelope_carries_code_and_data() {
        let resp = JsonResponse::build()
            .set_code("NEWS_FETCHED")
            .set_data(serde_json::json!({"status": "ok"}))
            .ok("done");
        assert_eq!(resp.status(), StatusCode::OK);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["message"], "done");
        assert_eq!(body["error"], false);
        assert_eq!(body["code"], "NEWS_FETCHED");
        assert_eq!(body["data"]["status"], "ok");
    }

    #[actix_web::test]
    async fn error_envelope_defaults_code_and_keeps_status() {
        let err = JsonResponse::<()>::build().bad_request("nope");
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"], true);
        assert_eq!(body["code"], "GENERIC");
        assert!(body["data"].is_null());
    }

    #[actix_web::test]
    async fn empty_internal_error_message_is_replaced() {
        let resp = JsonResponse::<()>::build()
            .set_code("DB_ERROR")
            .internal_server_error("")
            .error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["message"], "Internal error");
        assert_eq!(body["code"], "DB_ERROR");
    }
}
