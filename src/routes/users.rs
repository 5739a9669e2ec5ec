use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::middlewares::{self, RateLimit};
use crate::models::sections::requests::AssignSectionRequest;
use crate::models::users::entities::UserRole;
use crate::models::users::requests::{
    CreateUserRequest, UpdateUserRequest, UserExportParams, UserListParams,
};
use crate::services::{SectionService, UserService};
use crate::utils::{SafeIDI64, SafeSectionIdI64};

// 懒加载的全局 UserService 实例
static USER_SERVICE: Lazy<UserService> = Lazy::new(UserService::new_lazy);
static SECTION_SERVICE: Lazy<SectionService> = Lazy::new(SectionService::new_lazy);

#[derive(Debug, Deserialize)]
pub struct TemplateParams {
    pub format: Option<String>,
}

// HTTP处理程序
pub async fn list_users(
    req: HttpRequest,
    query: web::Query<UserListParams>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE.list_users(query.into_inner(), &req).await
}

pub async fn create_user(
    req: HttpRequest,
    user_data: web::Json<CreateUserRequest>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE.create_user(user_data.into_inner(), &req).await
}

pub async fn get_user(req: HttpRequest, user_id: SafeIDI64) -> ActixResult<HttpResponse> {
    USER_SERVICE.get_user(user_id.0, &req).await
}

pub async fn update_user(
    req: HttpRequest,
    user_id: SafeIDI64,
    update_data: web::Json<UpdateUserRequest>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE
        .update_user(user_id.0, update_data.into_inner(), &req)
        .await
}

pub async fn delete_user(req: HttpRequest, user_id: SafeIDI64) -> ActixResult<HttpResponse> {
    USER_SERVICE.delete_user(user_id.0, &req).await
}

pub async fn import_users(req: HttpRequest, payload: Multipart) -> ActixResult<HttpResponse> {
    USER_SERVICE.import_users(payload, &req).await
}

pub async fn export_users(
    req: HttpRequest,
    query: web::Query<UserExportParams>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE.export_users(query.into_inner(), &req).await
}

pub async fn download_template(query: web::Query<TemplateParams>) -> ActixResult<HttpResponse> {
    USER_SERVICE
        .download_template(query.format.as_deref())
        .await
}

// 任课班级
pub async fn list_assignments(req: HttpRequest, user_id: SafeIDI64) -> ActixResult<HttpResponse> {
    SECTION_SERVICE.list_assignments(&req, user_id.0).await
}

pub async fn assign_section(
    req: HttpRequest,
    user_id: SafeIDI64,
    body: web::Json<AssignSectionRequest>,
) -> ActixResult<HttpResponse> {
    SECTION_SERVICE
        .assign_section(&req, user_id.0, body.into_inner())
        .await
}

pub async fn remove_assignment(
    req: HttpRequest,
    user_id: SafeIDI64,
    section_id: SafeSectionIdI64,
) -> ActixResult<HttpResponse> {
    SECTION_SERVICE
        .remove_assignment(&req, user_id.0, section_id.0)
        .await
}

// 配置路由
pub fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/users")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                    .route("", web::get().to(list_users))
                    .route("", web::post().to(create_user))
                    .service(
                        web::resource("/import")
                            .wrap(RateLimit::import_users())
                            .route(web::post().to(import_users)),
                    )
                    .route("/export", web::get().to(export_users))
                    .route("/import/template", web::get().to(download_template))
                    .route("/{id}", web::get().to(get_user))
                    .route("/{id}", web::put().to(update_user))
                    .route("/{id}", web::delete().to(delete_user))
                    .route("/{id}/sections", web::get().to(list_assignments))
                    .route("/{id}/sections", web::post().to(assign_section))
                    .route(
                        "/{id}/sections/{section_id}",
                        web::delete().to(remove_assignment),
                    ),
            ),
    );
}
