use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::EvaluationService;
use crate::errors::Result;
use crate::models::evaluations::entities::{EvaluationPeriod, EvaluationType};
use crate::models::evaluations::requests::PeriodListParams;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

/// 查询结果时使用的周期
///
/// 指定 ID 时取该周期（类型不符视为不存在），否则取最近结束的周期，
/// 再没有则取进行中的周期。
pub async fn resolve_period(
    storage: &Arc<dyn Storage>,
    evaluation_type: EvaluationType,
    period_id: Option<i64>,
) -> Result<Option<EvaluationPeriod>> {
    if let Some(id) = period_id {
        return Ok(storage
            .get_period_by_id(id)
            .await?
            .filter(|p| p.evaluation_type == evaluation_type));
    }

    if let Some(period) = storage.get_latest_inactive_period(evaluation_type).await? {
        return Ok(Some(period));
    }

    storage.get_active_period(evaluation_type).await
}

pub async fn list_periods(
    service: &EvaluationService,
    request: &HttpRequest,
    query: PeriodListParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage
        .list_periods_with_pagination(
            query.evaluation_type,
            Some(query.pagination.page),
            Some(query.pagination.size),
        )
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Evaluation periods retrieved successfully",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to retrieve evaluation periods: {e}"),
            )),
        ),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    #[tokio::test]
    async fn test_resolve_period_prefers_latest_closed() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::new_in_memory().await.unwrap());
        let now = Utc::now();

        assert!(resolve_period(&storage, EvaluationType::Peer, None)
            .await
            .unwrap()
            .is_none());

        let active = storage
            .create_period("Peer Now", EvaluationType::Peer, now, now + Duration::days(7), true)
            .await
            .unwrap();
        let resolved = resolve_period(&storage, EvaluationType::Peer, None).await.unwrap();
        assert_eq!(resolved.map(|p| p.id), Some(active.id));

        let closed = storage
            .create_period(
                "Peer Before",
                EvaluationType::Peer,
                now - Duration::days(40),
                now - Duration::days(10),
                false,
            )
            .await
            .unwrap();
        let resolved = resolve_period(&storage, EvaluationType::Peer, None).await.unwrap();
        assert_eq!(resolved.map(|p| p.id), Some(closed.id));

        // 类型不符
        let other = resolve_period(&storage, EvaluationType::Student, Some(active.id))
            .await
            .unwrap();
        assert!(other.is_none());
    }
}
