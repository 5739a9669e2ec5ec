use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, middleware, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::results::requests::{HistoryListParams, ResultsQuery};
use crate::services::ResultService;
use crate::utils::SafeIDI64;

// 懒加载的全局 ResultService 实例
static RESULT_SERVICE: Lazy<ResultService> = Lazy::new(ResultService::new_lazy);

pub async fn result_summary(
    req: HttpRequest,
    query: web::Query<ResultsQuery>,
) -> ActixResult<HttpResponse> {
    RESULT_SERVICE.summary(&req, query.into_inner()).await
}

pub async fn list_results(
    req: HttpRequest,
    query: web::Query<ResultsQuery>,
) -> ActixResult<HttpResponse> {
    RESULT_SERVICE.list_results(&req, query.into_inner()).await
}

pub async fn list_comments(
    req: HttpRequest,
    query: web::Query<ResultsQuery>,
) -> ActixResult<HttpResponse> {
    RESULT_SERVICE.list_comments(&req, query.into_inner()).await
}

pub async fn list_history(
    req: HttpRequest,
    query: web::Query<HistoryListParams>,
) -> ActixResult<HttpResponse> {
    RESULT_SERVICE.list_history(&req, query.into_inner()).await
}

pub async fn get_history(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    RESULT_SERVICE.get_history(&req, path.0).await
}

// 配置路由
pub fn configure_result_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/results")
            .wrap(middleware::Compress::default())
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(result_summary))
            .route("/sections", web::get().to(list_results))
            .route("/comments", web::get().to(list_comments))
            .route("/history", web::get().to(list_history))
            .route("/history/{id}", web::get().to(get_history)),
    );
}
