use std::fmt;

use serde::Deserialize;

// =========================================================
// 错误状态枚举
// =========================================================

/// 错误状态枚举
/// 包含错误对应的语义（状态码）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorStatus {
    /// 本地表单校验失败，从未发送到网络
    Validation,
    /// 401: 令牌无效或已过期
    Unauthorized,
    /// 403: 无权限，会话保持
    Forbidden,
    /// 404: 资源未找到
    NotFound,
    /// 409: 资源冲突
    Conflict,
    /// 其它非 2xx 响应
    Server,
    /// 网络层失败（请求没有得到响应）
    Network,
    /// JSON 编解码失败
    Serialization,
}

impl ApiErrorStatus {
    /// 由 HTTP 状态码推导语义
    pub fn from_http(code: u16) -> Self {
        match code {
            401 => ApiErrorStatus::Unauthorized,
            403 => ApiErrorStatus::Forbidden,
            404 => ApiErrorStatus::NotFound,
            409 => ApiErrorStatus::Conflict,
            _ => ApiErrorStatus::Server,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiErrorStatus::Validation => "INVALID_INPUT",
            ApiErrorStatus::Unauthorized => "UNAUTHORIZED",
            ApiErrorStatus::Forbidden => "FORBIDDEN",
            ApiErrorStatus::NotFound => "RESOURCE_NOT_FOUND",
            ApiErrorStatus::Conflict => "RESOURCE_CONFLICT",
            ApiErrorStatus::Server => "SERVER_ERROR",
            ApiErrorStatus::Network => "NETWORK_ERROR",
            ApiErrorStatus::Serialization => "JSON_ERROR",
        }
    }
}

// =========================================================
// 错误上下文追踪
// =========================================================

/// 结构化的错误追踪片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSpan {
    /// 操作名称，如 "api.send", "session.establish"
    pub operation: String,
    /// 额外的细节信息，如请求路径
    pub detail: Option<String>,
}

// =========================================================
// 核心错误类型
// =========================================================

/// 前端调用后端时的统一错误
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: ApiErrorStatus,
    pub message: String,
    /// HTTP 状态码（网络错误/本地错误时为 None）
    http_status: Option<u16>,
    /// 后端响应体中的 `message` 字段
    server_message: Option<String>,
    spans: Vec<ErrorSpan>,
}

/// 后端错误响应体中我们关心的部分
#[derive(Deserialize)]
struct ServerErrorBody {
    #[serde(default)]
    message: Option<String>,
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// 视图对错误的处理方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorReaction {
    /// 注销并跳转到登录页
    LogoutAndRedirect,
    /// 在视图内显示消息，会话保持
    Inline(String),
}

pub const SESSION_EXPIRED_MESSAGE: &str = "Sessão expirada. Faça login novamente.";
pub const FORBIDDEN_MESSAGE: &str = "Você não tem permissão para realizar esta ação.";

impl ApiError {
    pub fn new(status: ApiErrorStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            http_status: None,
            server_message: None,
            spans: Vec::new(),
        }
    }

    // --- Convenience constructors ---

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ApiErrorStatus::Validation, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ApiErrorStatus::Network, message)
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ApiErrorStatus::Serialization, message)
    }

    /// 由非 2xx 响应构造，尽量提取后端提供的 `message`
    pub fn from_response(code: u16, body: &str) -> Self {
        let server_message = serde_json::from_str::<ServerErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());

        let message = server_message
            .clone()
            .unwrap_or_else(|| format!("HTTP {}", code));

        Self {
            status: ApiErrorStatus::from_http(code),
            message,
            http_status: Some(code),
            server_message,
            spans: Vec::new(),
        }
    }

    // --- Context builders ---

    pub fn in_op(mut self, operation: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan {
            operation: operation.into(),
            detail: None,
        });
        self
    }

    pub fn in_op_with(mut self, operation: impl Into<String>, detail: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan {
            operation: operation.into(),
            detail: Some(detail.into()),
        });
        self
    }

    // --- Accessors ---

    pub fn http_status(&self) -> Option<u16> {
        self.http_status
    }

    pub fn server_message(&self) -> Option<&str> {
        self.server_message.as_deref()
    }

    pub fn spans(&self) -> &[ErrorSpan] {
        &self.spans
    }

    pub fn error_code(&self) -> &'static str {
        self.status.error_code()
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == ApiErrorStatus::Unauthorized
    }

    /// 面向用户的消息：优先使用后端消息，否则使用调用方提供的本地化兜底文案
    pub fn user_message(&self, fallback: &str) -> String {
        match self.status {
            ApiErrorStatus::Unauthorized => SESSION_EXPIRED_MESSAGE.to_string(),
            ApiErrorStatus::Forbidden => FORBIDDEN_MESSAGE.to_string(),
            ApiErrorStatus::Validation => self.message.clone(),
            _ => self
                .server_message
                .clone()
                .unwrap_or_else(|| fallback.to_string()),
        }
    }

    pub fn reaction(&self, fallback: &str) -> ErrorReaction {
        if self.is_unauthorized() {
            ErrorReaction::LogoutAndRedirect
        } else {
            ErrorReaction::Inline(self.user_message(fallback))
        }
    }
}

// =========================================================
// Display & Error trait 实现
// =========================================================

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.error_code(), self.message)?;

        if !self.spans.is_empty() {
            write!(f, " | trace: ")?;
            for (i, span) in self.spans.iter().enumerate() {
                if i > 0 {
                    write!(f, " -> ")?;
                }
                write!(f, "{}", span.operation)?;
                if let Some(detail) = &span.detail {
                    write!(f, "({})", detail)?;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::serialization(e.to_string())
    }
}

impl From<donamatch_shared::TransitionError> for ApiError {
    fn from(e: donamatch_shared::TransitionError) -> Self {
        ApiError::validation(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_is_extracted_from_body() {
        let err = ApiError::from_response(400, r#"{"message":"Você já solicitou esta doação"}"#);
        assert_eq!(err.status, ApiErrorStatus::Server);
        assert_eq!(err.http_status(), Some(400));
        assert_eq!(err.server_message(), Some("Você já solicitou esta doação"));
        assert_eq!(err.user_message("Erro genérico"), "Você já solicitou esta doação");
    }

    #[test]
    fn non_json_body_uses_fallback_message() {
        let err = ApiError::from_response(500, "<html>oops</html>");
        assert_eq!(err.message, "HTTP 500");
        assert_eq!(err.user_message("Erro ao carregar"), "Erro ao carregar");
    }

    #[test]
    fn reactions_follow_error_taxonomy() {
        assert_eq!(
            ApiError::from_response(401, "").reaction("x"),
            ErrorReaction::LogoutAndRedirect
        );
        assert_eq!(
            ApiError::from_response(403, r#"{"message":"negado"}"#).reaction("x"),
            ErrorReaction::Inline(FORBIDDEN_MESSAGE.to_string())
        );
        assert_eq!(
            ApiError::validation("Título é obrigatório").reaction("x"),
            ErrorReaction::Inline("Título é obrigatório".to_string())
        );
        assert_eq!(
            ApiError::network("offline").reaction("Tente novamente"),
            ErrorReaction::Inline("Tente novamente".to_string())
        );
    }

    #[test]
    fn display_includes_trace() {
        let err = ApiError::from_response(404, "")
            .in_op_with("api.send", "/donations/9")
            .in_op("dashboard.load");
        assert_eq!(
            err.to_string(),
            "[RESOURCE_NOT_FOUND] HTTP 404 | trace: api.send(/donations/9) -> dashboard.load"
        );
    }
}
