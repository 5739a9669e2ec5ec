use serde::Serialize;
use ts_rs::TS;

use super::entities::{Section, SectionAssignment};
use crate::models::common::PaginationInfo;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/section.ts")]
pub struct SectionListResponse {
    pub items: Vec<Section>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/section.ts")]
pub struct SectionAssignmentListResponse {
    pub user_id: i64,
    pub items: Vec<SectionAssignment>,
}
