use serde::Deserialize;
use ts_rs::TS;

use crate::models::common::PaginationQuery;
use crate::models::evaluations::entities::EvaluationType;

// 结果查询
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct ResultsQuery {
    pub evaluation_type: Option<EvaluationType>,
    pub period_id: Option<i64>,
    /// 班级代码；"irregular" 表示非正常班学生答卷；为空表示全部
    pub section: Option<String>,
    /// 管理员查看他人结果
    pub user_id: Option<i64>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct HistoryListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub user_id: Option<i64>,
    pub evaluation_type: Option<EvaluationType>,
    pub period_id: Option<i64>,
}

// 存储层查询参数
#[derive(Debug, Clone, Default)]
pub struct HistoryListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub user_id: Option<i64>,
    pub evaluation_type: Option<EvaluationType>,
    pub period_id: Option<i64>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct ResetFailuresRequest {
    /// 为空时重置全部
    #[serde(default)]
    pub user_ids: Vec<i64>,
}

// 手动重新计算某周期结果
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct ProcessResultsRequest {
    pub period_id: i64,
}
