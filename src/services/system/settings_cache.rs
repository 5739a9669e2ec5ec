//! 动态配置缓存
//!
//! 提供从数据库加载的动态配置的全局缓存访问。
//! 使用 RwLock 保护，支持热更新。

use std::collections::HashMap;
use std::sync::OnceLock;
use tokio::sync::RwLock;

use crate::config::AppConfig;

/// 动态配置缓存
static DYNAMIC_CONFIG: OnceLock<RwLock<DynamicConfigCache>> = OnceLock::new();

/// 动态配置缓存内部结构
#[derive(Debug, Default)]
struct DynamicConfigCache {
    settings: HashMap<String, String>,
    initialized: bool,
}

/// 动态配置访问接口
pub struct DynamicConfig;

impl DynamicConfig {
    /// 初始化动态配置缓存
    /// 在应用启动时调用，从数据库加载配置
    pub async fn init(settings: Vec<(String, String)>) {
        let cache = DYNAMIC_CONFIG.get_or_init(|| RwLock::new(DynamicConfigCache::default()));

        let mut guard = cache.write().await;
        guard.settings.clear();
        for (key, value) in settings {
            guard.settings.insert(key, value);
        }
        guard.initialized = true;

        tracing::info!(
            "动态配置缓存初始化完成，加载了 {} 个配置项",
            guard.settings.len()
        );
    }

    /// 更新单个配置项
    pub async fn update(key: &str, value: &str) {
        if let Some(cache) = DYNAMIC_CONFIG.get() {
            let mut guard = cache.write().await;
            guard.settings.insert(key.to_string(), value.to_string());
            tracing::debug!("动态配置更新: {} = {}", key, value);
        }
    }

    /// 获取字符串配置
    async fn get_string(key: &str) -> Option<String> {
        if let Some(cache) = DYNAMIC_CONFIG.get() {
            let guard = cache.read().await;
            return guard.settings.get(key).cloned();
        }
        None
    }

    /// 获取整数配置
    async fn get_i64(key: &str) -> Option<i64> {
        Self::get_string(key).await.and_then(|v| v.parse().ok())
    }

    /// 获取浮点配置
    async fn get_f64(key: &str) -> Option<f64> {
        Self::get_string(key).await.and_then(|v| v.parse().ok())
    }

    /// 获取布尔配置
    async fn get_bool(key: &str) -> Option<bool> {
        Self::get_string(key)
            .await
            .and_then(|v| match v.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            })
    }

    // ============================================
    // 具体配置项访问方法
    // ============================================

    /// 获取系统名称
    pub async fn system_name() -> String {
        Self::get_string("app.system_name")
            .await
            .unwrap_or_else(|| AppConfig::get().app.system_name.clone())
    }

    /// 获取 Access Token 有效期（分钟）
    pub async fn access_token_expiry() -> i64 {
        Self::get_i64("jwt.access_token_expiry")
            .await
            .unwrap_or_else(|| AppConfig::get().jwt.access_token_expiry)
    }

    /// 获取 Refresh Token 有效期（天）
    pub async fn refresh_token_expiry() -> i64 {
        Self::get_i64("jwt.refresh_token_expiry")
            .await
            .unwrap_or_else(|| AppConfig::get().jwt.refresh_token_expiry)
    }

    /// 获取记住我 Refresh Token 有效期（天）
    pub async fn refresh_token_remember_me_expiry() -> i64 {
        AppConfig::get().jwt.refresh_token_remember_me_expiry
    }

    /// 及格线（百分制）
    pub async fn passing_score() -> f64 {
        Self::get_f64("evaluation.passing_score")
            .await
            .unwrap_or_else(|| AppConfig::get().evaluation.passing_score)
    }

    /// 触发校长警报的连续未通过次数
    pub async fn max_failure_attempts() -> i32 {
        Self::get_i64("evaluation.max_failure_attempts")
            .await
            .map(|v| v as i32)
            .unwrap_or_else(|| AppConfig::get().evaluation.max_failure_attempts)
    }

    /// 新评估周期天数
    pub async fn period_days() -> i64 {
        Self::get_i64("evaluation.period_days")
            .await
            .unwrap_or_else(|| AppConfig::get().evaluation.period_days)
    }

    /// 校长邮箱，数据库中为空时使用配置文件
    pub async fn school_head_email() -> String {
        Self::get_string("mail.school_head_email")
            .await
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| AppConfig::get().mail.school_head_email.clone())
    }

    /// 是否调用 AI 生成建议
    pub async fn ai_enabled() -> bool {
        Self::get_bool("ai.enabled")
            .await
            .unwrap_or_else(|| AppConfig::get().ai.enabled)
    }

    /// 操作日志保留天数
    pub async fn activity_log_retention_days() -> i64 {
        Self::get_i64("activity_log.retention_days")
            .await
            .unwrap_or_else(|| AppConfig::get().activity_log.retention_days)
    }

    /// 检查缓存是否已初始化
    pub async fn is_initialized() -> bool {
        if let Some(cache) = DYNAMIC_CONFIG.get() {
            let guard = cache.read().await;
            return guard.initialized;
        }
        false
    }
}
