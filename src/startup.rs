use crate::configuration::Settings;
use crate::connectors;
use crate::helpers::JsonResponse;
use crate::middleware::authentication::BearerAuth;
use crate::routes;
use crate::services::TokenService;
use actix_cors::Cors;
use actix_web::{dev::Server, web, App, HttpServer};
use sqlx::{Pool, Postgres};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

fn invalid_request(err: impl std::fmt::Display) -> actix_web::Error {
    tracing::debug!("Rejected malformed request: {}", err);
    JsonResponse::<()>::build()
        .set_code("INVALID_REQUEST")
        .bad_request(format!("Invalid request: {}", err))
}

pub fn run(
    listener: TcpListener,
    pg_pool: Pool<Postgres>,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let news_provider = connectors::init_news_provider(&settings.news_api)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;

    let token_service = Arc::new(TokenService::new(&settings.auth));
    let token_data = web::Data::new(token_service.clone());

    let settings = web::Data::new(settings);
    let pg_pool = web::Data::new(pg_pool);

    let json_config = web::JsonConfig::default().error_handler(|err, _req| invalid_request(err));
    let query_config = web::QueryConfig::default().error_handler(|err, _req| invalid_request(err));

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(Cors::permissive())
            .app_data(json_config.clone())
            .app_data(web::FormConfig::default().error_handler(|err, _req| invalid_request(err)))
            .app_data(query_config.clone())
            .service(web::scope("/health_check").service(routes::health_check))
            .service(routes::token::issue_handler)
            .service(
                web::scope("/news")
                    .wrap(BearerAuth::new(token_service.clone()))
                    .service(routes::news::search_handler)
                    .service(routes::news::save_latest_handler)
                    .service(routes::news::list_handler)
                    .service(routes::news::by_country_handler)
                    .service(routes::news::by_source_handler)
                    .service(routes::news::filter_handler),
            )
            .app_data(pg_pool.clone())
            .app_data(token_data.clone())
            .app_data(news_provider.clone())
            .app_data(settings.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
