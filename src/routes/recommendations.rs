use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, RateLimit};
use crate::models::recommendations::requests::RecommendationQuery;
use crate::services::RecommendationService;

// 懒加载的全局 RecommendationService 实例
static RECOMMENDATION_SERVICE: Lazy<RecommendationService> =
    Lazy::new(RecommendationService::new_lazy);

pub async fn generate_recommendations(
    req: HttpRequest,
    query: web::Query<RecommendationQuery>,
) -> ActixResult<HttpResponse> {
    RECOMMENDATION_SERVICE
        .generate(&req, query.into_inner())
        .await
}

pub async fn list_recommendations(
    req: HttpRequest,
    query: web::Query<RecommendationQuery>,
) -> ActixResult<HttpResponse> {
    RECOMMENDATION_SERVICE.list(&req, query.into_inner()).await
}

// 配置路由
pub fn configure_recommendation_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/recommendations")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_recommendations))
            .service(
                web::resource("/generate")
                    .wrap(RateLimit::ai_recommendations())
                    .route(web::post().to(generate_recommendations)),
            ),
    );
}
