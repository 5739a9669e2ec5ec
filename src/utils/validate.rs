use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::users::entities::{UserProfile, UserRole};

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("Invalid username regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

static DISPLAY_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z\s\-']+$").expect("Invalid display name regex"));

static STUDENT_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}-\d{4}$").expect("Invalid student number regex"));

static SECTION_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9][A-Z0-9-]{1,19}$").expect("Invalid section code regex"));

/// 学生只能使用学校邮箱
pub const SCHOOL_EMAIL_DOMAIN: &str = "@cca.edu.ph";
/// 教职工额外允许的邮箱域
pub const STAFF_EMAIL_DOMAINS: &[&str] = &["@gmail.com", SCHOOL_EMAIL_DOMAIN];

const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

pub fn validate_username(username: &str) -> Result<(), &'static str> {
    let len = username.chars().count();
    if !(3..=150).contains(&len) {
        return Err("Username length must be between 3 and 150 characters");
    }
    if !USERNAME_RE.is_match(username) {
        return Err("Username can only contain letters, numbers, dots, underscores or hyphens");
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.len() > 254 {
        return Err("Email address is too long");
    }
    if !EMAIL_RE.is_match(email) {
        return Err("Email format is invalid");
    }
    Ok(())
}

/// 注册邮箱域名规则
pub fn validate_email_domain(email: &str, role: &UserRole) -> Result<(), &'static str> {
    let email = email.trim().to_lowercase();
    match role {
        UserRole::Student => {
            if email.ends_with(SCHOOL_EMAIL_DOMAIN) {
                Ok(())
            } else {
                Err("Students must register with their @cca.edu.ph email address")
            }
        }
        _ => {
            if STAFF_EMAIL_DOMAINS.iter().any(|d| email.ends_with(d)) {
                Ok(())
            } else {
                Err("Email must end with @gmail.com or @cca.edu.ph")
            }
        }
    }
}

/// 由邮箱本地部分生成用户名前缀（仅保留字母数字）
pub fn username_base_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let base: String = local
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase();
    if base.is_empty() {
        "user".to_string()
    } else {
        base
    }
}

/// 密码策略验证结果
#[derive(Debug, Clone)]
pub struct PasswordValidationResult {
    pub is_valid: bool,
    pub errors: Vec<&'static str>,
}

impl PasswordValidationResult {
    pub fn error_message(&self) -> String {
        self.errors.join("; ")
    }
}

/// 验证密码是否符合安全策略
///
/// - 长度 8 到 128
/// - 必须包含大写字母、小写字母、数字与特殊字符
/// - 不能是常见弱密码
pub fn validate_password(password: &str) -> PasswordValidationResult {
    let mut errors = Vec::new();
    let len = password.chars().count();

    if len < 8 {
        errors.push("Password must be at least 8 characters long");
    }
    if len > 128 {
        errors.push("Password must be at most 128 characters long");
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must contain at least one uppercase letter");
    }

    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Password must contain at least one lowercase letter");
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one digit");
    }

    if !password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)) {
        errors.push("Password must contain at least one special character");
    }

    let weak_passwords = [
        "password",
        "12345678",
        "qwerty123",
        "admin123",
        "password1",
        "P@ssw0rd",
        "Passw0rd!",
    ];
    if weak_passwords
        .iter()
        .any(|&weak| password.eq_ignore_ascii_case(weak))
    {
        errors.push("Password is too common, please choose a stronger password");
    }

    PasswordValidationResult {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// 简化的密码验证（返回 Result）
pub fn validate_password_simple(password: &str) -> Result<(), String> {
    let result = validate_password(password);
    if result.is_valid {
        Ok(())
    } else {
        Err(result.error_message())
    }
}

/// 密码与确认密码一致
pub fn validate_password_confirmation(password: &str, confirm: &str) -> Result<(), &'static str> {
    if password != confirm {
        return Err("Passwords do not match");
    }
    Ok(())
}

pub fn validate_display_name(name: &str) -> Result<(), &'static str> {
    let len = name.trim().chars().count();
    if !(2..=150).contains(&len) {
        return Err("Display name must be between 2 and 150 characters");
    }
    if !DISPLAY_NAME_RE.is_match(name.trim()) {
        return Err("Display name can only contain letters, spaces, hyphens and apostrophes");
    }
    Ok(())
}

/// 学号格式 NN-NNNN
pub fn validate_student_number(number: &str) -> Result<(), &'static str> {
    if !STUDENT_NUMBER_RE.is_match(number.trim()) {
        return Err("Student number must use the format NN-NNNN");
    }
    Ok(())
}

/// 注册时学号去掉连字符后必须是 6 位数字
pub fn normalize_student_number(number: &str) -> Result<String, &'static str> {
    let digits: String = number.trim().chars().filter(|c| *c != '-').collect();
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err("Student number must contain exactly 6 digits");
    }
    Ok(format!("{}-{}", &digits[..2], &digits[2..]))
}

fn validate_short_text(value: &str, message: &'static str) -> Result<(), &'static str> {
    let len = value.trim().chars().count();
    if !(2..=50).contains(&len) {
        return Err(message);
    }
    Ok(())
}

pub fn validate_course(course: &str) -> Result<(), &'static str> {
    validate_short_text(course, "Course must be between 2 and 50 characters")
}

pub fn validate_institute(institute: &str) -> Result<(), &'static str> {
    validate_short_text(institute, "Institute must be between 2 and 50 characters")
}

/// 班级代码统一大写，`IRREGULAR` 保留给非正常班查询
pub fn normalize_section_code(code: &str) -> Result<String, &'static str> {
    let code = code.trim().to_uppercase();
    if !SECTION_CODE_RE.is_match(&code) {
        return Err("Section code must be 2-20 letters, digits or hyphens");
    }
    if code == "IRREGULAR" {
        return Err("Section code 'IRREGULAR' is reserved");
    }
    Ok(code)
}

/// 按角色检查档案必填项，返回 (字段, 错误)
///
/// 班级是否存在由服务层查询存储确认。
pub fn validate_profile(
    role: &UserRole,
    profile: &UserProfile,
) -> Result<(), (&'static str, &'static str)> {
    validate_display_name(&profile.display_name).map_err(|e| ("display_name", e))?;

    match role {
        UserRole::Student => {
            let number = profile
                .student_number
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .ok_or(("student_number", "Student number is required for students"))?;
            validate_student_number(number).map_err(|e| ("student_number", e))?;

            let course = profile
                .course
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .ok_or(("course", "Course is required for students"))?;
            validate_course(course).map_err(|e| ("course", e))?;

            if !profile.is_irregular && profile.section_id.is_none() {
                return Err(("section", "Section is required for regular students"));
            }
        }
        UserRole::Faculty | UserRole::Coordinator | UserRole::Dean => {
            let institute = profile
                .institute
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .ok_or(("institute", "Institute is required for staff members"))?;
            validate_institute(institute).map_err(|e| ("institute", e))?;
        }
        UserRole::Admin => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_password() {
        assert!(validate_password("SecureP@ss1").is_valid);
        assert!(validate_password("MyP@ssw0rd!").is_valid);
    }

    #[test]
    fn test_password_requires_special_char() {
        let result = validate_password("SecurePass123");
        assert!(!result.is_valid);
        assert!(
            result
                .errors
                .contains(&"Password must contain at least one special character")
        );
    }

    #[test]
    fn test_short_password() {
        let result = validate_password("Ab1!");
        assert!(!result.is_valid);
        assert!(
            result
                .errors
                .contains(&"Password must be at least 8 characters long")
        );
    }

    #[test]
    fn test_common_password() {
        let result = validate_password("P@ssw0rd");
        assert!(!result.is_valid);
    }

    #[test]
    fn test_username_rules() {
        assert!(validate_username("jdelacruz.21").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("juan dela cruz").is_err());
    }

    #[test]
    fn test_email_domain_rules() {
        assert!(validate_email_domain("a@cca.edu.ph", &UserRole::Student).is_ok());
        assert!(validate_email_domain("a@gmail.com", &UserRole::Student).is_err());
        assert!(validate_email_domain("A@GMAIL.COM", &UserRole::Faculty).is_ok());
        assert!(validate_email_domain("a@yahoo.com", &UserRole::Dean).is_err());
    }

    #[test]
    fn test_username_base_from_email() {
        assert_eq!(username_base_from_email("Juan.Dela-Cruz@cca.edu.ph"), "juandelacruz");
        assert_eq!(username_base_from_email("..@gmail.com"), "user");
    }

    #[test]
    fn test_student_number() {
        assert!(validate_student_number("21-1234").is_ok());
        assert!(validate_student_number("211234").is_err());
        assert_eq!(normalize_student_number("211234").unwrap(), "21-1234");
        assert_eq!(normalize_student_number("21-1234").unwrap(), "21-1234");
        assert!(normalize_student_number("21-12345").is_err());
    }

    #[test]
    fn test_section_code() {
        assert_eq!(normalize_section_code(" bsit-3a ").unwrap(), "BSIT-3A");
        assert!(normalize_section_code("A").is_err());
        assert!(normalize_section_code("BS IT").is_err());
        assert!(normalize_section_code("irregular").is_err());
    }

    #[test]
    fn test_display_name() {
        assert!(validate_display_name("Maria O'Neil-Santos").is_ok());
        assert!(validate_display_name("R2D2").is_err());
        assert!(validate_display_name("A").is_err());
    }

    #[test]
    fn test_profile_requirements() {
        let mut profile = UserProfile {
            display_name: "Juan Cruz".to_string(),
            student_number: Some("21-1234".to_string()),
            course: Some("BSIT".to_string()),
            ..Default::default()
        };
        assert_eq!(
            validate_profile(&UserRole::Student, &profile).unwrap_err().0,
            "section"
        );

        profile.is_irregular = true;
        assert!(validate_profile(&UserRole::Student, &profile).is_ok());

        assert_eq!(
            validate_profile(&UserRole::Faculty, &profile).unwrap_err().0,
            "institute"
        );
        assert!(validate_profile(&UserRole::Admin, &profile).is_ok());
    }
}
