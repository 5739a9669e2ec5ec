pub mod comments;
pub mod failures;
pub mod history;
pub mod list;
pub mod process;
pub mod summary;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::models::results::requests::{
    HistoryListParams, ProcessResultsRequest, ResetFailuresRequest, ResultsQuery,
};
use crate::models::users::entities::{User, UserRole};
use crate::storage::Storage;

pub struct ResultService {
    storage: Option<Arc<dyn Storage>>,
}

impl ResultService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            request
                .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
                .expect("Storage not found in app data")
                .get_ref()
                .clone()
        }
    }

    pub(crate) fn get_cache(&self, request: &HttpRequest) -> Arc<dyn ObjectCache> {
        request
            .app_data::<actix_web::web::Data<Arc<dyn ObjectCache>>>()
            .expect("Cache not found in app data")
            .get_ref()
            .clone()
    }

    // 实时计算的评估结果
    pub async fn summary(
        &self,
        request: &HttpRequest,
        query: ResultsQuery,
    ) -> ActixResult<HttpResponse> {
        summary::result_summary(self, request, query).await
    }

    // 已保存的各班级结果
    pub async fn list_results(
        &self,
        request: &HttpRequest,
        query: ResultsQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_results(self, request, query).await
    }

    pub async fn list_history(
        &self,
        request: &HttpRequest,
        query: HistoryListParams,
    ) -> ActixResult<HttpResponse> {
        history::list_history(self, request, query).await
    }

    pub async fn get_history(&self, request: &HttpRequest, id: i64) -> ActixResult<HttpResponse> {
        history::get_history(self, request, id).await
    }

    // 匿名评语
    pub async fn list_comments(
        &self,
        request: &HttpRequest,
        query: ResultsQuery,
    ) -> ActixResult<HttpResponse> {
        comments::list_comments(self, request, query).await
    }

    pub async fn failure_stats(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        failures::failure_stats(self, request).await
    }

    pub async fn reset_failures(
        &self,
        request: &HttpRequest,
        data: ResetFailuresRequest,
    ) -> ActixResult<HttpResponse> {
        failures::reset_failures(self, request, data).await
    }

    // 手动重新计算某周期结果
    pub async fn process(
        &self,
        request: &HttpRequest,
        data: ProcessResultsRequest,
    ) -> ActixResult<HttpResponse> {
        process::process_results(self, request, data).await
    }
}

/// 要查看的用户：管理员可指定 user_id，其他人只能看自己
pub(crate) fn target_user_id(viewer: &User, requested: Option<i64>) -> i64 {
    match requested {
        Some(id) if viewer.role == UserRole::Admin => id,
        _ => viewer.id,
    }
}
