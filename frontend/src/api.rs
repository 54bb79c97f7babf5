//! API 客户端
//!
//! 所有后端调用都经过 [`ApiClient::send`]：
//! - 拼接基础地址、路径与查询串
//! - 非认证端点在会话有效时附加 `Authorization: Bearer <token>`
//! - 非 2xx 响应统一转换为 [`ApiError`]，不做任何重试

use std::rc::Rc;

use donamatch_shared::protocol::ApiRequest;
use donamatch_shared::{BEARER_PREFIX, HEADER_AUTHORIZATION, is_auth_endpoint};
use leptos::logging::{error, warn};
use url::Url;

use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};
use crate::session::SessionStore;
use crate::web::clock::Clock;
use crate::web::http::{HttpClient, HttpRequest};
use crate::web::storage::KeyValueStore;

pub mod dashboard;
mod services;

#[cfg(test)]
mod tests;

/// 后端 API 客户端
///
/// H: HttpClient
/// S: KeyValueStore
/// C: Clock
pub struct ApiClient<H, S, C> {
    base_url: Rc<str>,
    http: Rc<H>,
    session: Rc<SessionStore<S, C>>,
}

impl<H, S, C> Clone for ApiClient<H, S, C> {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            http: self.http.clone(),
            session: self.session.clone(),
        }
    }
}

impl<H, S, C> ApiClient<H, S, C>
where
    H: HttpClient,
    S: KeyValueStore,
    C: Clock,
{
    pub fn new(config: &AppConfig, http: Rc<H>, session: Rc<SessionStore<S, C>>) -> Self {
        Self {
            base_url: Rc::from(config.api_base_url.as_str()),
            http,
            session,
        }
    }

    pub fn session(&self) -> &SessionStore<S, C> {
        &self.session
    }

    /// 完整请求地址
    pub fn url_for<R: ApiRequest>(&self, request: &R) -> ApiResult<String> {
        let raw = format!("{}{}", self.base_url, request.path());
        let mut url = Url::parse(&raw)
            .map_err(|e| ApiError::validation(format!("invalid url {}: {}", raw, e)))?;

        let query = request.query();
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url.to_string())
    }

    /// 附加认证头
    ///
    /// 登录/注册请求保持原样；没有有效会话时也不附加（过期会话在此被清除）。
    pub fn authorize(&self, request: HttpRequest) -> HttpRequest {
        if is_auth_endpoint(&request.url) {
            return request;
        }
        match self.session.token() {
            Some(token) => request.with_header(
                HEADER_AUTHORIZATION,
                &format!("{} {}", BEARER_PREFIX, token),
            ),
            None => request,
        }
    }

    /// 发送一个类型化请求
    pub async fn send<R: ApiRequest>(&self, request: &R) -> ApiResult<R::Response> {
        let path = request.path();
        let url = self
            .url_for(request)
            .map_err(|e| e.in_op_with("api.send", path.as_str()))?;

        let mut http_request = HttpRequest::new(&url, R::METHOD);
        if let Some(body) = request
            .body()
            .map_err(|e| ApiError::from(e).in_op_with("api.send", path.as_str()))?
        {
            http_request = http_request
                .with_header("Content-Type", "application/json")
                .with_body(body);
        }
        let http_request = self.authorize(http_request);

        let response = match self.http.send(http_request).await {
            Ok(response) => response,
            Err(e) => {
                let e = e.in_op_with("api.send", path.as_str());
                error!("[Api] {} {} failed: {}", R::METHOD.as_str(), path, e);
                return Err(e);
            }
        };

        if !response.ok() {
            let e = ApiError::from_response(response.status, &response.body)
                .in_op_with("api.send", path.as_str());
            if e.is_unauthorized() {
                warn!("[Api] {} {} rejected: session is no longer valid", R::METHOD.as_str(), path);
            } else {
                error!("[Api] {} {} failed: {}", R::METHOD.as_str(), path, e);
            }
            return Err(e);
        }

        R::parse_response(&response.body)
            .map_err(|e| ApiError::from(e).in_op_with("api.send", path.as_str()))
    }
}
