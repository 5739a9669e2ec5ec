use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, middleware, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::activity_logs::requests::ActivityLogListParams;
use crate::models::evaluations::entities::EvaluationType;
use crate::models::results::requests::{ProcessResultsRequest, ResetFailuresRequest};
use crate::models::users::entities::UserRole;
use crate::services::{ActivityLogService, EvaluationService, ResultService};

static ACTIVITY_LOG_SERVICE: Lazy<ActivityLogService> = Lazy::new(ActivityLogService::new_lazy);
static EVALUATION_SERVICE: Lazy<EvaluationService> = Lazy::new(EvaluationService::new_lazy);
static RESULT_SERVICE: Lazy<ResultService> = Lazy::new(ResultService::new_lazy);

// 操作日志
pub async fn list_activity_logs(
    req: HttpRequest,
    query: web::Query<ActivityLogListParams>,
) -> ActixResult<HttpResponse> {
    ACTIVITY_LOG_SERVICE
        .list_logs(query.into_inner(), &req)
        .await
}

pub async fn cleanup_activity_logs(req: HttpRequest) -> ActixResult<HttpResponse> {
    ACTIVITY_LOG_SERVICE.cleanup(&req).await
}

// 发布控制
pub async fn release(
    req: HttpRequest,
    path: web::Path<EvaluationType>,
) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE.release(&req, path.into_inner()).await
}

pub async fn unrelease(
    req: HttpRequest,
    path: web::Path<EvaluationType>,
) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE.unrelease(&req, path.into_inner()).await
}

pub async fn release_all(req: HttpRequest) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE.release_all(&req).await
}

pub async fn unrelease_all(req: HttpRequest) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE.unrelease_all(&req).await
}

// 未通过跟踪
pub async fn failure_stats(req: HttpRequest) -> ActixResult<HttpResponse> {
    RESULT_SERVICE.failure_stats(&req).await
}

pub async fn reset_failures(
    req: HttpRequest,
    body: web::Json<ResetFailuresRequest>,
) -> ActixResult<HttpResponse> {
    RESULT_SERVICE.reset_failures(&req, body.into_inner()).await
}

pub async fn process_results(
    req: HttpRequest,
    body: web::Json<ProcessResultsRequest>,
) -> ActixResult<HttpResponse> {
    RESULT_SERVICE.process(&req, body.into_inner()).await
}

// 配置路由
pub fn configure_admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/admin")
            .wrap(middleware::Compress::default())
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                    .route("/activity-logs", web::get().to(list_activity_logs))
                    .route(
                        "/activity-logs/cleanup",
                        web::post().to(cleanup_activity_logs),
                    )
                    .route("/evaluations/release-all", web::post().to(release_all))
                    .route("/evaluations/unrelease-all", web::post().to(unrelease_all))
                    .route("/evaluations/{type}/release", web::post().to(release))
                    .route("/evaluations/{type}/unrelease", web::post().to(unrelease))
                    .route("/failures", web::get().to(failure_stats))
                    .route("/failures/reset", web::post().to(reset_failures))
                    .route("/results/process", web::post().to(process_results)),
            ),
    );
}
