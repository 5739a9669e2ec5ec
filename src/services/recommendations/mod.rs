//! 改进建议
//!
//! 根据教职工的评估结果生成建议。AI 可用时调用 OpenAI 兼容接口，
//! 接口失败或内容过于笼统时改用按得分挑选的预设建议。

pub mod client;
pub mod context;
pub mod fallback;
pub mod generate;
pub mod list;
pub mod parser;
pub mod sentiment;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

pub use client::{ChatClient, create_chat_client};

use crate::models::recommendations::requests::RecommendationQuery;
use crate::storage::Storage;

pub struct RecommendationService {
    storage: Option<Arc<dyn Storage>>,
}

impl RecommendationService {
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

    /// 未注册客户端时返回 None，使用预设建议
    pub(crate) fn get_chat_client(&self, request: &HttpRequest) -> Option<Arc<dyn ChatClient>> {
        request
            .app_data::<actix_web::web::Data<Arc<dyn ChatClient>>>()
            .map(|client| client.get_ref().clone())
    }

    pub async fn generate(
        &self,
        request: &HttpRequest,
        query: RecommendationQuery,
    ) -> ActixResult<HttpResponse> {
        generate::generate_recommendations(self, request, query).await
    }

    pub async fn list(
        &self,
        request: &HttpRequest,
        query: RecommendationQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_recommendations(self, request, query).await
    }
}
