use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::evaluations::requests::{
    BulkUpdateQuestionsRequest, QuestionListParams, ResetQuestionsRequest, UpdateQuestionRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::QuestionService;
use crate::utils::SafeIDI64;

// 懒加载的全局 QuestionService 实例
static QUESTION_SERVICE: Lazy<QuestionService> = Lazy::new(QuestionService::new_lazy);

pub async fn list_questions(
    req: HttpRequest,
    query: web::Query<QuestionListParams>,
) -> ActixResult<HttpResponse> {
    QUESTION_SERVICE.list_questions(&req, query.into_inner()).await
}

pub async fn update_question(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<UpdateQuestionRequest>,
) -> ActixResult<HttpResponse> {
    QUESTION_SERVICE
        .update_question(&req, path.0, body.into_inner())
        .await
}

pub async fn bulk_update(
    req: HttpRequest,
    body: web::Json<BulkUpdateQuestionsRequest>,
) -> ActixResult<HttpResponse> {
    QUESTION_SERVICE.bulk_update(&req, body.into_inner()).await
}

pub async fn reset_questions(
    req: HttpRequest,
    body: web::Json<ResetQuestionsRequest>,
) -> ActixResult<HttpResponse> {
    QUESTION_SERVICE.reset_questions(&req, body.into_inner()).await
}

// 配置路由
pub fn configure_question_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/questions")
            .wrap(middlewares::RequireJWT)
            .route("", web::get().to(list_questions))
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::admin_roles()))
                    .route("", web::put().to(bulk_update))
                    .route("/reset", web::post().to(reset_questions))
                    .route("/{id}", web::put().to(update_question)),
            ),
    );
}
