use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::RecommendationService;
use crate::middlewares::RequireJWT;
use crate::models::recommendations::requests::RecommendationQuery;
use crate::models::recommendations::responses::StoredRecommendationListResponse;
use crate::models::{ApiResponse, ErrorCode};

/// 当前用户已保存的建议，可按周期、类型过滤
pub async fn list_recommendations(
    service: &RecommendationService,
    request: &HttpRequest,
    query: RecommendationQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(user_id) = RequireJWT::extract_user_id(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized: missing user id",
        )));
    };

    match storage.list_recommendations(user_id, query.period_id).await {
        Ok(items) => {
            let items = items
                .into_iter()
                .filter(|r| {
                    query
                        .evaluation_type
                        .is_none_or(|t| r.evaluation_type == t)
                })
                .collect();
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                StoredRecommendationListResponse { items },
                "Recommendations retrieved successfully",
            )))
        }
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to retrieve recommendations: {e}"),
            )),
        ),
    }
}
