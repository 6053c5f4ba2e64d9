use crate::forms::TokenRequest;
use crate::helpers::JsonResponse;
use crate::services::{AuthError, TokenService};
use actix_web::{post, web, Either, HttpResponse};
use std::sync::Arc;

#[tracing::instrument(name = "Issue token.", skip(tokens))]
#[post("/token")]
pub async fn issue_handler(
    body: Either<web::Json<TokenRequest>, web::Form<TokenRequest>>,
    tokens: web::Data<Arc<TokenService>>,
) -> Result<HttpResponse, AuthError> {
    let request = match body {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    };

    let issued = tokens.issue(&request.client_id, &request.client_secret)?;

    Ok(JsonResponse::build()
        .set_code("TOKEN_GENERATED")
        .set_data(issued)
        .ok("Token generated successfully"))
}
