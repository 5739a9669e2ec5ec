pub mod assignments;
pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::sections::requests::{
    AssignSectionRequest, CreateSectionRequest, SectionListParams, UpdateSectionRequest,
};
use crate::storage::Storage;

pub struct SectionService {
    storage: Option<Arc<dyn Storage>>,
}

impl SectionService {
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

    // 获取班级列表
    pub async fn list_sections(
        &self,
        request: &HttpRequest,
        query: SectionListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_sections(self, request, query).await
    }

    pub async fn create_section(
        &self,
        request: &HttpRequest,
        data: CreateSectionRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_section(self, request, data).await
    }

    pub async fn get_section(
        &self,
        request: &HttpRequest,
        section_id: i64,
    ) -> ActixResult<HttpResponse> {
        get::get_section(self, request, section_id).await
    }

    pub async fn update_section(
        &self,
        request: &HttpRequest,
        section_id: i64,
        data: UpdateSectionRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_section(self, request, section_id, data).await
    }

    pub async fn delete_section(
        &self,
        request: &HttpRequest,
        section_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_section(self, request, section_id).await
    }

    // 教职工任课班级
    pub async fn list_assignments(
        &self,
        request: &HttpRequest,
        user_id: i64,
    ) -> ActixResult<HttpResponse> {
        assignments::list_assignments(self, request, user_id).await
    }

    pub async fn assign_section(
        &self,
        request: &HttpRequest,
        user_id: i64,
        data: AssignSectionRequest,
    ) -> ActixResult<HttpResponse> {
        assignments::assign_section(self, request, user_id, data.section_id).await
    }

    pub async fn remove_assignment(
        &self,
        request: &HttpRequest,
        user_id: i64,
        section_id: i64,
    ) -> ActixResult<HttpResponse> {
        assignments::remove_assignment(self, request, user_id, section_id).await
    }
}
