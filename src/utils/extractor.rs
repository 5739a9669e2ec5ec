//! 路径参数提取器
//!
//! 在进入处理函数前校验路径参数，非法时直接返回统一格式的 400 响应。

use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, HttpResponse, dev::Payload, error::InternalError};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{ApiResponse, ErrorCode};

static SETTING_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_]+(\.[a-z_]+)+$").expect("Invalid setting key regex"));

fn bad_request(message: String) -> actix_web::Error {
    InternalError::from_response(
        message.clone(),
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, message)),
    )
    .into()
}

fn parse_positive_i64(req: &HttpRequest, name: &str) -> Result<i64, actix_web::Error> {
    let raw = req
        .match_info()
        .get(name)
        .ok_or_else(|| bad_request(format!("Missing path parameter: {name}")))?;

    match raw.parse::<i64>() {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(bad_request(format!("Invalid {name}: {raw}"))),
    }
}

macro_rules! define_safe_id {
    ($name:ident, $param:literal) => {
        /// 路径中的正整数 ID
        #[derive(Debug, Clone, Copy)]
        pub struct $name(pub i64);

        impl FromRequest for $name {
            type Error = actix_web::Error;
            type Future = Ready<Result<Self, Self::Error>>;

            fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
                ready(parse_positive_i64(req, $param).map($name))
            }
        }
    };
}

define_safe_id!(SafeIDI64, "id");
define_safe_id!(SafeSectionIdI64, "section_id");

/// 路径中的系统设置键，例如 `evaluation.passing_score`
#[derive(Debug, Clone)]
pub struct SafeSettingKey(pub String);

impl FromRequest for SafeSettingKey {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result = match req.match_info().get("key") {
            Some(key) if key.len() <= 64 && SETTING_KEY_RE.is_match(key) => {
                Ok(SafeSettingKey(key.to_string()))
            }
            Some(key) => Err(bad_request(format!("Invalid setting key: {key}"))),
            None => Err(bad_request("Missing path parameter: key".to_string())),
        };
        ready(result)
    }
}

/// 客户端 IP：优先取 X-Forwarded-For 第一项，否则取对端地址
pub fn client_ip(req: &HttpRequest) -> Option<String> {
    let forwarded = req
        .headers()
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    forwarded.or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn test_safe_id_accepts_positive() {
        let req = TestRequest::default().param("id", "42").to_http_request();
        let id = SafeIDI64::extract(&req).await.unwrap();
        assert_eq!(id.0, 42);
    }

    #[actix_web::test]
    async fn test_safe_id_rejects_invalid() {
        let req = TestRequest::default().param("id", "-3").to_http_request();
        assert!(SafeIDI64::extract(&req).await.is_err());

        let req = TestRequest::default().param("id", "abc").to_http_request();
        assert!(SafeIDI64::extract(&req).await.is_err());
    }

    #[actix_web::test]
    async fn test_setting_key() {
        let req = TestRequest::default()
            .param("key", "evaluation.passing_score")
            .to_http_request();
        assert!(SafeSettingKey::extract(&req).await.is_ok());

        let req = TestRequest::default()
            .param("key", "../etc")
            .to_http_request();
        assert!(SafeSettingKey::extract(&req).await.is_err());
    }

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "203.0.113.7, 10.0.0.1"))
            .peer_addr("127.0.0.1:8080".parse().unwrap())
            .to_http_request();
        assert_eq!(client_ip(&req).as_deref(), Some("203.0.113.7"));

        let req = TestRequest::default()
            .peer_addr("127.0.0.1:8080".parse().unwrap())
            .to_http_request();
        assert_eq!(client_ip(&req).as_deref(), Some("127.0.0.1"));
    }
}
