pub mod cleanup;
pub mod list;
pub mod log;

pub use cleanup::spawn_cleanup_task;
pub use log::log_admin_activity;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::activity_logs::requests::ActivityLogListParams;
use crate::storage::Storage;

pub struct ActivityLogService {
    storage: Option<Arc<dyn Storage>>,
}

impl ActivityLogService {
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

    // 分页列出操作日志
    pub async fn list_logs(
        &self,
        query: ActivityLogListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_activity_logs(self, query, request).await
    }

    // 立即清理过期日志
    pub async fn cleanup(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        cleanup::handle_cleanup(self, request).await
    }
}
