use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, middleware, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RateLimit};
use crate::models::evaluations::requests::{PeriodListParams, SubmitEvaluationRequest};
use crate::services::EvaluationService;

// 懒加载的全局 EvaluationService 实例
static EVALUATION_SERVICE: Lazy<EvaluationService> = Lazy::new(EvaluationService::new_lazy);

pub async fn evaluation_form(req: HttpRequest) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE.form(&req).await
}

pub async fn submit_evaluation(
    req: HttpRequest,
    body: web::Json<SubmitEvaluationRequest>,
) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE.submit(&req, body.into_inner()).await
}

pub async fn list_periods(
    req: HttpRequest,
    query: web::Query<PeriodListParams>,
) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE.list_periods(&req, query.into_inner()).await
}

pub async fn release_status(req: HttpRequest) -> ActixResult<HttpResponse> {
    EVALUATION_SERVICE.release_status(&req).await
}

// 配置路由
pub fn configure_evaluation_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/evaluations")
            .wrap(middleware::Compress::default())
            .wrap(middlewares::RequireJWT)
            .route("/form", web::get().to(evaluation_form))
            .service(
                web::resource("/submit")
                    .wrap(RateLimit::submit_evaluation())
                    .route(web::post().to(submit_evaluation)),
            )
            .route("/periods", web::get().to(list_periods))
            .route("/status", web::get().to(release_status)),
    );
}
