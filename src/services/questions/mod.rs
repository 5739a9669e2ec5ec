pub mod defaults;
pub mod list;
pub mod reset;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

pub use defaults::sync_default_questions;

use crate::models::evaluations::entities::EvaluationType;
use crate::models::evaluations::requests::{
    BulkUpdateQuestionsRequest, QuestionListParams, ResetQuestionsRequest, UpdateQuestionRequest,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

pub struct QuestionService {
    storage: Option<Arc<dyn Storage>>,
}

impl QuestionService {
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

    pub async fn list_questions(
        &self,
        request: &HttpRequest,
        query: QuestionListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_questions(self, request, query).await
    }

    pub async fn update_question(
        &self,
        request: &HttpRequest,
        question_id: i64,
        data: UpdateQuestionRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_question(self, request, question_id, data).await
    }

    pub async fn bulk_update(
        &self,
        request: &HttpRequest,
        data: BulkUpdateQuestionsRequest,
    ) -> ActixResult<HttpResponse> {
        update::bulk_update_questions(self, request, data).await
    }

    pub async fn reset_questions(
        &self,
        request: &HttpRequest,
        data: ResetQuestionsRequest,
    ) -> ActixResult<HttpResponse> {
        reset::reset_questions(self, request, data).await
    }
}

/// upward 表单没有题库
pub(crate) fn reject_without_questions(evaluation_type: EvaluationType) -> Option<HttpResponse> {
    if defaults::default_questions(evaluation_type).is_some() {
        return None;
    }
    Some(HttpResponse::BadRequest().json(ApiResponse::error_empty(
        ErrorCode::BadRequest,
        format!("{} evaluations have no question set", evaluation_type.label()),
    )))
}
