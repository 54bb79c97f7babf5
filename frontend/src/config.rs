//! 运行时配置
//!
//! 后端地址在编译期通过 `DONAMATCH_API_URL` 注入（Trunk 构建时设置环境变量即可），
//! 未设置时使用本地开发地址。

/// 未配置时使用的后端地址
const DEFAULT_API_URL: &str = "http://localhost:8080/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// 后端 API 根地址，不带结尾的 `/`
    pub api_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::with_base_url(option_env!("DONAMATCH_API_URL").unwrap_or(DEFAULT_API_URL))
    }

    pub fn with_base_url(url: &str) -> Self {
        let trimmed = url.trim().trim_end_matches('/');
        let api_base_url = if trimmed.is_empty() {
            DEFAULT_API_URL.to_string()
        } else {
            trimmed.to_string()
        };
        Self { api_base_url }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
