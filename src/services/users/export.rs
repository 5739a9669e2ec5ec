//! 账号导出与导入模板

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use rust_xlsxwriter::{Format, Workbook};
use tracing::error;

use super::UserService;
use crate::models::activity_logs::entities::ActivityAction;
use crate::models::users::entities::{User, UserRole};
use crate::models::users::requests::UserExportParams;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::activity_logs::{log::ActivityTarget, log_admin_activity};

const EXPORT_HEADERS: [&str; 9] = [
    "Username",
    "Email",
    "Display Name",
    "Role",
    "Student Number",
    "Course",
    "Section",
    "Institute",
    "Date Joined",
];

const TEMPLATE_HEADERS: [&str; 9] = [
    "username",
    "email",
    "password",
    "display_name",
    "role",
    "student_number",
    "course",
    "section",
    "institute",
];

const TEMPLATE_ROWS: [[&str; 9]; 2] = [
    [
        "jdelacruz",
        "jdelacruz@cca.edu.ph",
        "Student#2024",
        "Juan Dela Cruz",
        "student",
        "24-0001",
        "BSIT",
        "BSIT-1A",
        "",
    ],
    [
        "mreyes",
        "mreyes@cca.edu.ph",
        "Faculty#2024",
        "Maria Reyes",
        "faculty",
        "",
        "",
        "",
        "ICSLIS",
    ],
];

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// 导出用户列表
pub async fn export_users(
    service: &UserService,
    params: UserExportParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let roles: Vec<UserRole> = match params.role {
        Some(role) => vec![role],
        None => UserRole::all_roles().iter().map(|r| (*r).clone()).collect(),
    };

    let mut users = match storage.list_users_by_roles(&roles).await {
        Ok(users) => users,
        Err(e) => {
            error!("Failed to export users: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::ExportFailed,
                    format!("Failed to export users: {e}"),
                )),
            );
        }
    };
    sort_for_export(&mut users);
    let rows: Vec<Vec<String>> = users.iter().map(export_row).collect();

    let stamp = Utc::now().format("%Y%m%d");
    let is_csv = params.format.as_deref() == Some("csv");
    let response = if is_csv {
        csv_response(&EXPORT_HEADERS, &rows, &format!("users_export_{stamp}.csv"))
    } else {
        xlsx_response(&EXPORT_HEADERS, &rows, &format!("users_export_{stamp}.xlsx"))
    };

    if response.is_ok() {
        log_admin_activity(
            &storage,
            request,
            ActivityAction::ExportAccounts,
            format!(
                "Exported {} accounts as {}",
                rows.len(),
                if is_csv { "CSV" } else { "XLSX" }
            ),
            ActivityTarget::default(),
        )
        .await;
    }
    response
}

/// 下载导入模板
pub async fn download_template(format: &str) -> ActixResult<HttpResponse> {
    let rows: Vec<Vec<String>> = TEMPLATE_ROWS
        .iter()
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect();
    match format {
        "csv" => csv_response(&TEMPLATE_HEADERS, &rows, "account_import_template.csv"),
        _ => xlsx_response(&TEMPLATE_HEADERS, &rows, "account_import_template.xlsx"),
    }
}

/// 按角色顺序再按用户名排序
fn sort_for_export(users: &mut [User]) {
    users.sort_by(|a, b| {
        a.role
            .sort_order()
            .cmp(&b.role.sort_order())
            .then_with(|| a.username.cmp(&b.username))
    });
}

fn export_row(user: &User) -> Vec<String> {
    let profile = &user.profile;
    vec![
        user.username.clone(),
        user.email.clone(),
        profile.display_name.clone(),
        user.role.label().to_string(),
        profile.student_number.clone().unwrap_or_default(),
        profile.course.clone().unwrap_or_default(),
        user.section_code.clone().unwrap_or_default(),
        profile.institute.clone().unwrap_or_default(),
        user.created_at.format("%Y-%m-%d %H:%M").to_string(),
    ]
}

fn export_error(kind: &str, e: impl std::fmt::Display) -> actix_web::Error {
    error!("{} generation failed: {}", kind, e);
    actix_web::error::ErrorInternalServerError(format!("{kind} generation failed: {e}"))
}

fn build_csv(headers: &[&str], rows: &[Vec<String>]) -> Result<Vec<u8>, actix_web::Error> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(headers).map_err(|e| export_error("CSV", e))?;
    for row in rows {
        wtr.write_record(row).map_err(|e| export_error("CSV", e))?;
    }
    wtr.into_inner().map_err(|e| export_error("CSV", e))
}

fn csv_response(
    headers: &[&str],
    rows: &[Vec<String>],
    file_name: &str,
) -> ActixResult<HttpResponse> {
    let data = build_csv(headers, rows)?;
    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{file_name}\""),
        ))
        .body(data))
}

fn xlsx_response(
    headers: &[&str],
    rows: &[Vec<String>],
    file_name: &str,
) -> ActixResult<HttpResponse> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let header_format = Format::new().set_bold();

    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(|e| export_error("XLSX", e))?;
    }
    for (row_idx, row) in rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            worksheet
                .write_string((row_idx + 1) as u32, col as u16, value)
                .map_err(|e| export_error("XLSX", e))?;
        }
    }
    worksheet.autofit();

    let buffer = workbook
        .save_to_buffer()
        .map_err(|e| export_error("XLSX", e))?;

    Ok(HttpResponse::Ok()
        .content_type(XLSX_CONTENT_TYPE)
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{file_name}\""),
        ))
        .body(buffer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::{FailureTracking, UserProfile, UserStatus};

    fn user(username: &str, role: UserRole) -> User {
        User {
            id: 1,
            username: username.to_string(),
            email: format!("{username}@cca.edu.ph"),
            password_hash: String::new(),
            role,
            status: UserStatus::Active,
            profile: UserProfile {
                display_name: username.to_uppercase(),
                ..Default::default()
            },
            section_code: None,
            failure: FailureTracking::default(),
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_sort_by_role_then_username() {
        let mut users = vec![
            user("zed", UserRole::Dean),
            user("bob", UserRole::Student),
            user("amy", UserRole::Faculty),
            user("abe", UserRole::Student),
        ];
        sort_for_export(&mut users);
        let names: Vec<_> = users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, ["abe", "bob", "amy", "zed"]);
    }

    #[test]
    fn test_export_row_uses_role_label_and_section_code() {
        let mut student = user("abe", UserRole::Student);
        student.section_code = Some("BSIT-3A".to_string());
        let row = export_row(&student);
        assert_eq!(row.len(), EXPORT_HEADERS.len());
        assert_eq!(row[3], "Student");
        assert_eq!(row[6], "BSIT-3A");
    }

    #[test]
    fn test_template_csv_has_all_columns() {
        let rows: Vec<Vec<String>> = TEMPLATE_ROWS
            .iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect();
        let data = String::from_utf8(build_csv(&TEMPLATE_HEADERS, &rows).unwrap()).unwrap();
        let first = data.lines().next().unwrap();
        assert_eq!(
            first,
            "username,email,password,display_name,role,student_number,course,section,institute"
        );
        assert_eq!(data.lines().count(), 3);
    }
}
