use super::SeaOrmStorage;
use crate::entity::sections::Entity as Sections;
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::{EdulyticsError, Result};
use crate::models::{
    PaginationInfo,
    users::{
        entities::{User, UserRole, UserStatus},
        requests::{CreateUserRequest, UpdateUserRequest, UserListQuery},
        responses::UserListResponse,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};

impl SeaOrmStorage {
    /// 创建用户
    pub async fn create_user_impl(&self, req: CreateUserRequest) -> Result<User> {
        let now = chrono::Utc::now().timestamp();
        let profile = req.profile;

        let model = ActiveModel {
            username: Set(req.username),
            email: Set(req.email),
            password_hash: Set(req.password),
            role: Set(req.role.to_string()),
            status: Set(UserStatus::Active.to_string()),
            display_name: Set(profile.display_name),
            student_number: Set(profile.student_number),
            course: Set(profile.course),
            section_id: Set(profile.section_id),
            institute: Set(profile.institute),
            is_irregular: Set(profile.is_irregular),
            evaluation_failure_count: Set(0),
            failure_alert_sent: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("创建用户失败: {e}")))?;

        // 重新查询以带上班级代码
        self.get_user_by_id_impl(result.id)
            .await?
            .ok_or_else(|| EdulyticsError::not_found(format!("用户 {} 创建后未找到", result.id)))
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .find_also_related(Sections)
            .one(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|(m, s)| m.into_user(s)))
    }

    /// 通过用户名获取用户
    pub async fn get_user_by_username_impl(&self, username: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Username.eq(username))
            .find_also_related(Sections)
            .one(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|(m, s)| m.into_user(s)))
    }

    /// 通过邮箱获取用户（邮箱不区分大小写，入库前已转小写）
    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Email.eq(email.trim().to_lowercase()))
            .find_also_related(Sections)
            .one(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|(m, s)| m.into_user(s)))
    }

    /// 通过用户名或邮箱获取用户
    pub async fn get_user_by_username_or_email_impl(
        &self,
        identifier: &str,
    ) -> Result<Option<User>> {
        let identifier = identifier.trim();
        let result = Users::find()
            .filter(
                Condition::any()
                    .add(Column::Username.eq(identifier))
                    .add(Column::Email.eq(identifier.to_lowercase())),
            )
            .find_also_related(Sections)
            .one(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|(m, s)| m.into_user(s)))
    }

    /// 分页列出用户
    pub async fn list_users_with_pagination_impl(
        &self,
        query: UserListQuery,
    ) -> Result<UserListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = Users::find();

        // 搜索条件
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Username.contains(&escaped))
                    .add(Column::Email.contains(&escaped))
                    .add(Column::DisplayName.contains(&escaped))
                    .add(Column::StudentNumber.contains(&escaped)),
            );
        }

        // 角色筛选
        if let Some(ref role) = query.role {
            select = select.filter(Column::Role.eq(role.to_string()));
        }

        // 状态筛选
        if let Some(ref status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        // 班级筛选
        if let Some(section_id) = query.section_id {
            select = select.filter(Column::SectionId.eq(section_id));
        }

        let paginator = select
            .order_by_desc(Column::CreatedAt)
            .find_also_related(Sections)
            .paginate(&self.db, size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询用户总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询用户页数失败: {e}")))?;

        let users = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询用户列表失败: {e}")))?;

        Ok(UserListResponse {
            items: users.into_iter().map(|(m, s)| m.into_user(s)).collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    /// 按角色列出用户
    pub async fn list_users_by_roles_impl(&self, roles: &[UserRole]) -> Result<Vec<User>> {
        if roles.is_empty() {
            return Ok(Vec::new());
        }

        let users = Users::find()
            .filter(Column::Role.is_in(roles.iter().map(|r| r.to_string())))
            .order_by_asc(Column::Username)
            .find_also_related(Sections)
            .all(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询用户列表失败: {e}")))?;

        Ok(users.into_iter().map(|(m, s)| m.into_user(s)).collect())
    }

    /// 更新用户最后登录时间
    pub async fn update_last_login_impl(&self, id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();

        let result = Users::update_many()
            .col_expr(Column::LastLogin, sea_orm::sea_query::Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| {
                EdulyticsError::database_operation(format!("更新最后登录时间失败: {e}"))
            })?;

        Ok(result.rows_affected > 0)
    }

    /// 更新用户信息
    pub async fn update_user_impl(
        &self,
        id: i64,
        update: UpdateUserRequest,
    ) -> Result<Option<User>> {
        // 先检查用户是否存在
        let existing = self.get_user_by_id_impl(id).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(email) = update.email {
            model.email = Set(email);
        }

        if let Some(password) = update.password {
            model.password_hash = Set(password);
        }

        if let Some(role) = update.role {
            model.role = Set(role.to_string());
        }

        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }

        // 档案整体替换
        if let Some(profile) = update.profile {
            model.display_name = Set(profile.display_name);
            model.student_number = Set(profile.student_number);
            model.course = Set(profile.course);
            model.section_id = Set(profile.section_id);
            model.institute = Set(profile.institute);
            model.is_irregular = Set(profile.is_irregular);
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("更新用户失败: {e}")))?;

        self.get_user_by_id_impl(id).await
    }

    /// 删除用户
    pub async fn delete_user_impl(&self, id: i64) -> Result<bool> {
        let result = Users::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("删除用户失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 统计用户数量
    pub async fn count_users_impl(&self) -> Result<u64> {
        let count = Users::find()
            .count(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("统计用户数量失败: {e}")))?;

        Ok(count)
    }
}
