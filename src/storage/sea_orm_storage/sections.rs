//! 班级与任课分配存储操作

use super::SeaOrmStorage;
use crate::entity::section_assignments::{
    ActiveModel as AssignmentActiveModel, Column as AssignmentColumn,
    Entity as SectionAssignments,
};
use crate::entity::sections::{ActiveModel, Column, Entity as Sections};
use crate::errors::{EdulyticsError, Result};
use crate::models::{
    PaginationInfo,
    sections::{
        entities::{Section, SectionAssignment},
        requests::{CreateSectionRequest, SectionListQuery, UpdateSectionRequest},
        responses::SectionListResponse,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};

impl SeaOrmStorage {
    /// 创建班级
    pub async fn create_section_impl(&self, req: CreateSectionRequest) -> Result<Section> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            code: Set(req.code),
            name: Set(req.name),
            year_level: Set(req.year_level),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("创建班级失败: {e}")))?;

        Ok(result.into_section())
    }

    /// 通过 ID 获取班级
    pub async fn get_section_by_id_impl(&self, id: i64) -> Result<Option<Section>> {
        let result = Sections::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询班级失败: {e}")))?;

        Ok(result.map(|m| m.into_section()))
    }

    /// 通过班级代码获取班级
    pub async fn get_section_by_code_impl(&self, code: &str) -> Result<Option<Section>> {
        let result = Sections::find()
            .filter(Column::Code.eq(code))
            .one(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询班级失败: {e}")))?;

        Ok(result.map(|m| m.into_section()))
    }

    /// 分页列出班级
    pub async fn list_sections_with_pagination_impl(
        &self,
        query: SectionListQuery,
    ) -> Result<SectionListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = Sections::find();

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Code.contains(&escaped))
                    .add(Column::Name.contains(&escaped)),
            );
        }

        let paginator = select.order_by_asc(Column::Code).paginate(&self.db, size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询班级总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询班级页数失败: {e}")))?;

        let sections = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询班级列表失败: {e}")))?;

        Ok(SectionListResponse {
            items: sections.into_iter().map(|m| m.into_section()).collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    /// 更新班级
    pub async fn update_section_impl(
        &self,
        id: i64,
        update: UpdateSectionRequest,
    ) -> Result<Option<Section>> {
        let existing = self.get_section_by_id_impl(id).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(code) = update.code {
            model.code = Set(code);
        }

        if let Some(name) = update.name {
            model.name = Set(Some(name));
        }

        if let Some(year_level) = update.year_level {
            model.year_level = Set(Some(year_level));
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("更新班级失败: {e}")))?;

        Ok(Some(result.into_section()))
    }

    /// 删除班级（学生的 section_id 置空，任课分配级联删除）
    pub async fn delete_section_impl(&self, id: i64) -> Result<bool> {
        let result = Sections::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("删除班级失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 为教职工分配任课班级
    pub async fn assign_section_impl(
        &self,
        user_id: i64,
        section_id: i64,
    ) -> Result<SectionAssignment> {
        let section = self
            .get_section_by_id_impl(section_id)
            .await?
            .ok_or_else(|| EdulyticsError::not_found(format!("班级 {section_id} 不存在")))?;

        let model = AssignmentActiveModel {
            user_id: Set(user_id),
            section_id: Set(section_id),
            assigned_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("分配班级失败: {e}")))?;

        Ok(result.into_assignment(section.code))
    }

    /// 取消任课班级
    pub async fn remove_section_assignment_impl(
        &self,
        user_id: i64,
        section_id: i64,
    ) -> Result<bool> {
        let result = SectionAssignments::delete_many()
            .filter(AssignmentColumn::UserId.eq(user_id))
            .filter(AssignmentColumn::SectionId.eq(section_id))
            .exec(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("取消班级分配失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 列出教职工的任课班级
    pub async fn list_user_section_assignments_impl(
        &self,
        user_id: i64,
    ) -> Result<Vec<SectionAssignment>> {
        let rows = SectionAssignments::find()
            .filter(AssignmentColumn::UserId.eq(user_id))
            .find_also_related(Sections)
            .order_by_asc(AssignmentColumn::AssignedAt)
            .all(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询班级分配失败: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|(a, s)| {
                let code = s.map(|s| s.code).unwrap_or_default();
                a.into_assignment(code)
            })
            .collect())
    }

    /// 检查任课分配是否存在
    pub async fn has_section_assignment_impl(&self, user_id: i64, section_id: i64) -> Result<bool> {
        let count = SectionAssignments::find()
            .filter(AssignmentColumn::UserId.eq(user_id))
            .filter(AssignmentColumn::SectionId.eq(section_id))
            .count(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询班级分配失败: {e}")))?;

        Ok(count > 0)
    }
}
