use crate::middleware::authentication::get_header;
use crate::services::token::{extract_bearer_token, AuthError};
use crate::services::TokenService;
use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse},
    Error,
};
use futures::{
    future::{FutureExt, LocalBoxFuture},
    task::{Context, Poll},
};
use std::rc::Rc;
use std::sync::Arc;

pub struct BearerAuthMiddleware<S> {
    pub service: Rc<S>,
    pub tokens: Arc<TokenService>,
}

impl<S, B> Service<ServiceRequest> for BearerAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<ServiceResponse<B>, Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let tokens = self.tokens.clone();

        async move {
            let claims = authenticate(&req, &tokens)?;
            tracing::debug!(sub = %claims.sub, "Bearer token accepted");
            service.call(req).await
        }
        .boxed_local()
    }
}

#[tracing::instrument(name = "Authenticate bearer token", skip(req, tokens), fields(path = %req.path()))]
fn authenticate(
    req: &ServiceRequest,
    tokens: &TokenService,
) -> Result<crate::services::token::Claims, AuthError> {
    let authorization = get_header::<String>(req, "authorization")
        .map_err(|err| {
            tracing::debug!("Unreadable authorization header: {}", err);
            AuthError::MissingToken
        })?
        .ok_or(AuthError::MissingToken)?;

    let token = extract_bearer_token(&authorization)?;

    tokens.verify(token).map_err(|err| {
        tracing::warn!("Bearer token rejected: {}", err);
        err
    })
}
