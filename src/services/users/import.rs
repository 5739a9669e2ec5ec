//! 账号批量导入
//!
//! 支持 CSV / XLSX / XLS。必需列为 username、email、password、display_name、role；
//! 学生可带 student_number、course、section（班级代码），教职工可带 institute。
//! 已存在的用户名按行内容更新，密码为 `***EXISTING***` 时保留原密码。

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use calamine::{Reader, Sheets, Xls, Xlsx};
use futures_util::StreamExt;
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::Arc;
use tracing::{error, info};

use super::UserService;
use crate::config::AppConfig;
use crate::middlewares::require_jwt::invalidate_user_cache;
use crate::models::activity_logs::entities::ActivityAction;
use crate::models::users::entities::{UserProfile, UserRole};
use crate::models::users::requests::{CreateUserRequest, UpdateUserRequest};
use crate::models::users::responses::{ImportRowError, UserImportResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::activity_logs::{log::ActivityTarget, log_admin_activity};
use crate::storage::Storage;
use crate::utils::file_magic::{ImportFormat, validate_magic_bytes};
use crate::utils::password::hash_password;
use crate::utils::validate::{
    validate_email, validate_password_simple, validate_profile, validate_username,
};

/// 保留原密码的占位符
pub const KEEP_PASSWORD: &str = "***EXISTING***";
const MAX_IMPORT_ROWS: usize = 1000;
const REQUIRED_COLUMNS: [&str; 5] = ["username", "email", "password", "display_name", "role"];

/// 导入解析错误
#[derive(Debug)]
enum ImportParseError {
    MissingColumn(String),
    ParseFailed(String),
    EmptyFile,
}

impl ImportParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::MissingColumn(_) => ErrorCode::ImportFileMissingColumn,
            Self::ParseFailed(_) => ErrorCode::ImportFileParseFailed,
            Self::EmptyFile => ErrorCode::ImportFileDataInvalid,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::MissingColumn(col) => format!("Missing required column: {col}"),
            Self::ParseFailed(msg) => msg.clone(),
            Self::EmptyFile => "The file contains no data".to_string(),
        }
    }
}

enum UploadError {
    Read(String),
    TooLarge,
}

/// 导入行数据
#[derive(Debug, Clone, Default)]
struct ImportRow {
    row_num: usize,
    username: String,
    email: String,
    password: String,
    display_name: String,
    role: String,
    student_number: String,
    course: String,
    section: String,
    institute: String,
    is_irregular: bool,
}

impl ImportRow {
    /// 第一个为空的必需字段
    fn missing_required(&self) -> Option<&'static str> {
        [
            ("username", &self.username),
            ("email", &self.email),
            ("password", &self.password),
            ("display_name", &self.display_name),
            ("role", &self.role),
        ]
        .into_iter()
        .find(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
    }
}

enum RowOutcome {
    Created,
    Updated,
}

/// 导入用户
pub async fn import_users(
    service: &UserService,
    mut payload: Multipart,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let upload = &AppConfig::get().upload;

    let (file_bytes, file_name) = match read_file_from_multipart(&mut payload, upload.max_size).await
    {
        Ok(result) => result,
        Err(UploadError::TooLarge) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::ImportFileSizeExceeded,
                format!("File exceeds the {} byte limit", upload.max_size),
            )));
        }
        Err(UploadError::Read(e)) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::ImportFileParseFailed,
                format!("Failed to read upload: {e}"),
            )));
        }
    };

    // 扩展名白名单 + 魔术字节
    let format = match ImportFormat::from_filename(&file_name) {
        Some(format) if upload.allowed_types.iter().any(|t| t == format.extension()) => format,
        _ => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::ImportFileTypeNotAllowed,
                format!(
                    "Unsupported file type. Allowed: {}",
                    upload.allowed_types.join(", ")
                ),
            )));
        }
    };
    if !validate_magic_bytes(&file_bytes, format) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ImportFileTypeNotAllowed,
            "File content does not match its extension",
        )));
    }

    let rows = match parse_file(&file_bytes, format) {
        Ok(rows) => rows,
        Err(e) => {
            return Ok(
                HttpResponse::BadRequest().json(ApiResponse::error_empty(e.error_code(), e.message()))
            );
        }
    };

    if rows.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ImportFileDataInvalid,
            "The file contains no data rows",
        )));
    }
    if rows.len() > MAX_IMPORT_ROWS {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ImportFileDataInvalid,
            format!("At most {MAX_IMPORT_ROWS} rows can be imported at once"),
        )));
    }

    let cache = service.get_cache(request);
    let mut report = UserImportResponse {
        total: rows.len(),
        created: 0,
        updated: 0,
        skipped: 0,
        failed: 0,
        errors: Vec::new(),
    };
    let mut seen = HashSet::new();
    let mut section_ids: HashMap<String, Option<i64>> = HashMap::new();

    for row in &rows {
        if let Some(field) = row.missing_required() {
            report.skipped += 1;
            report.errors.push(row_error(row.row_num, field, "Missing required field"));
            continue;
        }
        if !seen.insert(row.username.to_lowercase()) {
            report.skipped += 1;
            report.errors.push(row_error(
                row.row_num,
                "username",
                "Duplicate username in file",
            ));
            continue;
        }

        match import_row(&storage, row, &mut section_ids).await {
            Ok((RowOutcome::Created, _)) => report.created += 1,
            Ok((RowOutcome::Updated, user_id)) => {
                invalidate_user_cache(&cache, user_id).await;
                report.updated += 1;
            }
            Err(e) => {
                report.failed += 1;
                report.errors.push(e);
            }
        }
    }

    info!(
        "Account import '{}': {} created, {} updated, {} skipped, {} failed",
        file_name, report.created, report.updated, report.skipped, report.failed
    );
    log_admin_activity(
        &storage,
        request,
        ActivityAction::ImportAccounts,
        format!(
            "Imported accounts from '{}': {} created, {} updated, {} failed",
            file_name, report.created, report.updated, report.failed
        ),
        ActivityTarget::default(),
    )
    .await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(report, "Import completed")))
}

fn row_error(row: usize, field: &str, message: impl Into<String>) -> ImportRowError {
    ImportRowError {
        row,
        field: field.to_string(),
        message: message.into(),
    }
}

/// 处理单行，返回结果和用户ID
async fn import_row(
    storage: &Arc<dyn Storage>,
    row: &ImportRow,
    section_ids: &mut HashMap<String, Option<i64>>,
) -> Result<(RowOutcome, i64), ImportRowError> {
    let n = row.row_num;

    let role: UserRole = row
        .role
        .parse()
        .map_err(|e: String| row_error(n, "role", e))?;
    validate_username(&row.username).map_err(|e| row_error(n, "username", e))?;
    let email = row.email.to_lowercase();
    validate_email(&email).map_err(|e| row_error(n, "email", e))?;

    let profile = build_profile(storage, row, &role, section_ids).await?;

    let existing = storage
        .get_user_by_username(&row.username)
        .await
        .map_err(|e| row_error(n, "", e.to_string()))?;

    // 邮箱不能被其他账号占用
    let owner = storage
        .get_user_by_email(&email)
        .await
        .map_err(|e| row_error(n, "", e.to_string()))?;
    if let Some(owner) = owner
        && existing.as_ref().map(|u| u.id) != Some(owner.id)
    {
        return Err(row_error(n, "email", "Email already belongs to another account"));
    }

    match existing {
        Some(user) => {
            let password = if row.password == KEEP_PASSWORD {
                None
            } else {
                Some(hash_row_password(n, &row.password)?)
            };
            let update = UpdateUserRequest {
                email: Some(email),
                password,
                role: Some(role),
                status: None,
                profile: Some(profile),
            };
            match storage.update_user(user.id, update).await {
                Ok(Some(user)) => Ok((RowOutcome::Updated, user.id)),
                Ok(None) => Err(row_error(n, "username", "User disappeared during import")),
                Err(e) => Err(row_error(n, "", e.to_string())),
            }
        }
        None => {
            if row.password == KEEP_PASSWORD {
                return Err(row_error(
                    n,
                    "password",
                    "A password is required for new accounts",
                ));
            }
            let password = hash_row_password(n, &row.password)?;
            let created = storage
                .create_user(CreateUserRequest {
                    username: row.username.clone(),
                    email,
                    password,
                    role,
                    profile,
                })
                .await
                .map_err(|e| {
                    error!("Import row {} failed: {}", n, e);
                    row_error(n, "", e.to_string())
                })?;
            Ok((RowOutcome::Created, created.id))
        }
    }
}

fn hash_row_password(row: usize, password: &str) -> Result<String, ImportRowError> {
    validate_password_simple(password).map_err(|e| row_error(row, "password", e))?;
    hash_password(password).map_err(|e| row_error(row, "password", e.to_string()))
}

async fn build_profile(
    storage: &Arc<dyn Storage>,
    row: &ImportRow,
    role: &UserRole,
    section_ids: &mut HashMap<String, Option<i64>>,
) -> Result<UserProfile, ImportRowError> {
    let n = row.row_num;
    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

    let mut profile = UserProfile {
        display_name: row.display_name.clone(),
        ..Default::default()
    };

    if *role == UserRole::Student {
        profile.student_number = non_empty(&row.student_number);
        profile.course = non_empty(&row.course);
        profile.is_irregular = row.is_irregular;

        if !row.section.is_empty() {
            let code = row.section.to_uppercase();
            let section_id = match section_ids.get(&code) {
                Some(id) => *id,
                None => {
                    let id = storage
                        .get_section_by_code(&code)
                        .await
                        .map_err(|e| row_error(n, "section", e.to_string()))?
                        .map(|s| s.id);
                    section_ids.insert(code.clone(), id);
                    id
                }
            };
            profile.section_id = Some(section_id.ok_or_else(|| {
                row_error(n, "section", format!("Section '{code}' does not exist"))
            })?);
        }
    } else if role.is_staff() {
        profile.institute = non_empty(&row.institute);
    }

    validate_profile(role, &profile).map_err(|(field, msg)| row_error(n, field, msg))?;
    Ok(profile)
}

async fn read_file_from_multipart(
    payload: &mut Multipart,
    max_size: usize,
) -> Result<(Vec<u8>, String), UploadError> {
    let mut file_bytes = Vec::new();
    let mut file_name = String::new();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| UploadError::Read(format!("invalid field: {e}")))?;

        if field.name().map(|n| n == "file").unwrap_or(false) {
            if let Some(content_disposition) = field.content_disposition() {
                file_name = content_disposition
                    .get_filename()
                    .unwrap_or("upload.csv")
                    .to_string();
            }

            while let Some(chunk) = field.next().await {
                let data = chunk.map_err(|e| UploadError::Read(e.to_string()))?;
                if file_bytes.len() + data.len() > max_size {
                    return Err(UploadError::TooLarge);
                }
                file_bytes.extend_from_slice(&data);
            }
        }
    }

    if file_bytes.is_empty() {
        return Err(UploadError::Read("no file field found".to_string()));
    }

    Ok((file_bytes, file_name))
}

/// 表头统一为小写下划线，兼容导出文件的 "Display Name" 写法
fn normalize_header(header: &str) -> String {
    header
        .trim()
        .trim_start_matches('\u{feff}')
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

fn parse_file(data: &[u8], format: ImportFormat) -> Result<Vec<ImportRow>, ImportParseError> {
    let table = match format {
        ImportFormat::Csv => read_csv_table(data)?,
        ImportFormat::Xlsx | ImportFormat::Xls => read_workbook_table(data, format)?,
    };
    rows_from_table(table)
}

fn read_csv_table(data: &[u8]) -> Result<Vec<Vec<String>>, ImportParseError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(Cursor::new(data));

    rdr.records()
        .enumerate()
        .map(|(i, record)| {
            record
                .map(|r| r.iter().map(|c| c.trim().to_string()).collect())
                .map_err(|e| ImportParseError::ParseFailed(format!("Row {} is invalid: {e}", i + 1)))
        })
        .collect()
}

fn read_workbook_table(
    data: &[u8],
    format: ImportFormat,
) -> Result<Vec<Vec<String>>, ImportParseError> {
    let open_failed = |e: String| ImportParseError::ParseFailed(format!("Failed to open workbook: {e}"));
    let cursor = Cursor::new(data);
    let mut workbook = match format {
        ImportFormat::Xls => Sheets::Xls(Xls::new(cursor).map_err(|e| open_failed(e.to_string()))?),
        _ => Sheets::Xlsx(Xlsx::new(cursor).map_err(|e| open_failed(e.to_string()))?),
    };

    // 只读取第一个工作表
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ImportParseError::ParseFailed("Workbook has no sheets".to_string()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ImportParseError::ParseFailed(format!("Failed to read sheet: {e}")))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(|c| c.to_string().trim().to_string()).collect())
        .collect())
}

fn rows_from_table(table: Vec<Vec<String>>) -> Result<Vec<ImportRow>, ImportParseError> {
    let mut rows_iter = table.into_iter();
    let header_row = rows_iter.next().ok_or(ImportParseError::EmptyFile)?;
    let header_map: HashMap<String, usize> = header_row
        .iter()
        .enumerate()
        .map(|(i, h)| (normalize_header(h), i))
        .collect();

    for column in REQUIRED_COLUMNS {
        if !header_map.contains_key(column) {
            return Err(ImportParseError::MissingColumn(column.to_string()));
        }
    }

    let mut rows = Vec::new();
    for (i, record) in rows_iter.enumerate() {
        // 跳过空行
        if record.iter().all(|c| c.is_empty()) {
            continue;
        }
        let cell = |column: &str| -> String {
            header_map
                .get(column)
                .and_then(|idx| record.get(*idx))
                .cloned()
                .unwrap_or_default()
        };

        rows.push(ImportRow {
            row_num: i + 2, // 从 1 开始计数，跳过表头
            username: cell("username"),
            email: cell("email"),
            password: cell("password"),
            display_name: cell("display_name"),
            role: cell("role"),
            student_number: cell("student_number"),
            course: cell("course"),
            section: cell("section"),
            institute: cell("institute"),
            is_irregular: matches!(
                cell("is_irregular").to_lowercase().as_str(),
                "true" | "yes" | "1"
            ),
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_with_export_style_headers() {
        let data = b"Username,Email,Password,Display Name,Role,Student Number,Course,Section\n\
                     jdoe,jdoe@cca.edu.ph,Secret123!,John Doe,student,21-0001,BSIT,BSIT-3A\n";
        let rows = parse_file(data, ImportFormat::Csv).unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.row_num, 2);
        assert_eq!(row.display_name, "John Doe");
        assert_eq!(row.section, "BSIT-3A");
        assert!(row.institute.is_empty());
        assert!(row.missing_required().is_none());
    }

    #[test]
    fn test_missing_column_is_reported() {
        let data = b"username,email,password,role\nx,x@cca.edu.ph,pw,student\n";
        let err = parse_file(data, ImportFormat::Csv).unwrap_err();
        assert!(matches!(err, ImportParseError::MissingColumn(ref c) if c == "display_name"));
        assert_eq!(err.error_code(), ErrorCode::ImportFileMissingColumn);
    }

    #[test]
    fn test_blank_rows_skipped_and_numbering_kept() {
        let data = b"username,email,password,display_name,role\n\
                     ,,,,\n\
                     a,a@cca.edu.ph,,Anne,faculty\n";
        let rows = parse_file(data, ImportFormat::Csv).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row_num, 3);
        assert_eq!(rows[0].missing_required(), Some("password"));
    }

    #[test]
    fn test_empty_file() {
        assert!(matches!(
            parse_file(b"", ImportFormat::Csv),
            Err(ImportParseError::EmptyFile)
        ));
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("\u{feff}Username"), "username");
        assert_eq!(normalize_header(" Student  Number "), "student_number");
    }

    #[tokio::test]
    async fn test_import_row_creates_then_updates_keeping_password() {
        let storage: Arc<dyn Storage> = Arc::new(
            crate::storage::sea_orm_storage::SeaOrmStorage::new_in_memory()
                .await
                .unwrap(),
        );
        let mut sections = HashMap::new();
        let row = ImportRow {
            row_num: 2,
            username: "mreyes".to_string(),
            email: "mreyes@cca.edu.ph".to_string(),
            password: "Teach3r!pass".to_string(),
            display_name: "Maria Reyes".to_string(),
            role: "Faculty".to_string(),
            institute: "ICSLIS".to_string(),
            ..Default::default()
        };

        let (outcome, id) = import_row(&storage, &row, &mut sections).await.unwrap();
        assert!(matches!(outcome, RowOutcome::Created));
        let hash = storage.get_user_by_id(id).await.unwrap().unwrap().password_hash;

        let again = ImportRow {
            password: KEEP_PASSWORD.to_string(),
            display_name: "Maria Cruz Reyes".to_string(),
            ..row
        };
        let (outcome, same_id) = import_row(&storage, &again, &mut sections).await.unwrap();
        assert!(matches!(outcome, RowOutcome::Updated));
        assert_eq!(same_id, id);
        let user = storage.get_user_by_id(id).await.unwrap().unwrap();
        assert_eq!(user.password_hash, hash);
        assert_eq!(user.profile.display_name, "Maria Cruz Reyes");
    }

    #[tokio::test]
    async fn test_import_row_rejects_unknown_section() {
        let storage: Arc<dyn Storage> = Arc::new(
            crate::storage::sea_orm_storage::SeaOrmStorage::new_in_memory()
                .await
                .unwrap(),
        );
        let row = ImportRow {
            row_num: 5,
            username: "student1".to_string(),
            email: "student1@cca.edu.ph".to_string(),
            password: "Stud3nt!pass".to_string(),
            display_name: "Juan Cruz".to_string(),
            role: "student".to_string(),
            student_number: "21-0002".to_string(),
            course: "BSIT".to_string(),
            section: "zz-9".to_string(),
            ..Default::default()
        };
        let err = import_row(&storage, &row, &mut HashMap::new())
            .await
            .err()
            .unwrap();
        assert_eq!(err.row, 5);
        assert_eq!(err.field, "section");
    }
}
