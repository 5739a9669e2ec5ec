pub mod failures;
pub mod form;
pub mod periods;
pub mod processing;
pub mod release;
pub mod scoring;
pub mod submit;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::mail::Mailer;
use crate::models::evaluations::entities::EvaluationType;
use crate::models::evaluations::requests::{PeriodListParams, SubmitEvaluationRequest};
use crate::storage::Storage;

pub struct EvaluationService {
    storage: Option<Arc<dyn Storage>>,
}

impl EvaluationService {
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

    pub(crate) fn get_mailer(&self, request: &HttpRequest) -> Arc<dyn Mailer> {
        request
            .app_data::<actix_web::web::Data<Arc<dyn Mailer>>>()
            .expect("Mailer not found in app data")
            .get_ref()
            .clone()
    }

    // 提交评估
    pub async fn submit(
        &self,
        request: &HttpRequest,
        data: SubmitEvaluationRequest,
    ) -> ActixResult<HttpResponse> {
        submit::submit_evaluation(self, request, data).await
    }

    // 当前用户的评估表
    pub async fn form(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        form::evaluation_form(self, request).await
    }

    // 评估周期列表
    pub async fn list_periods(
        &self,
        request: &HttpRequest,
        query: PeriodListParams,
    ) -> ActixResult<HttpResponse> {
        periods::list_periods(self, request, query).await
    }

    // 发布状态
    pub async fn release_status(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        release::status(self, request).await
    }

    pub async fn release(
        &self,
        request: &HttpRequest,
        evaluation_type: EvaluationType,
    ) -> ActixResult<HttpResponse> {
        release::release(self, evaluation_type, request).await
    }

    pub async fn unrelease(
        &self,
        request: &HttpRequest,
        evaluation_type: EvaluationType,
    ) -> ActixResult<HttpResponse> {
        release::unrelease(self, evaluation_type, request).await
    }

    pub async fn release_all(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        release::set_all(self, true, request).await
    }

    pub async fn unrelease_all(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        release::set_all(self, false, request).await
    }
}
