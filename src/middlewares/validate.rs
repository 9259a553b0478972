/*!
 * 令牌校验中间件
 *
 * 校验 `accesstoken` 请求头（subject 必须与 `id` 请求头一致），access token
 * 失效时回退到 `refreshtoken` 请求头。通过后把 `AuthContext` 写入请求扩展，
 * 其中携带一枚轮换后的新 access token，每个成功响应都会把它回传给客户端。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::{web, App};
 * use crate::middlewares::Validate;
 *
 * App::new().service(
 *     web::scope("/classroom")
 *         .wrap(Validate)
 *         .route("/create", web::post().to(create_class_handler))
 * )
 * ```
 *
 * 在处理程序中提取认证上下文：
 *
 * ```rust,ignore
 * if let Some(auth) = Validate::extract_auth(&req) {
 *     // auth.user / auth.access_token
 * }
 * ```
 */

use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::models::users::entities::{User, UserStatus};
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, info};

use super::create_error_response;

const ID_HEADER: &str = "id";
const ACCESS_TOKEN_HEADER: &str = "accesstoken";
const REFRESH_TOKEN_HEADER: &str = "refreshtoken";

/// 认证上下文：当前用户 + 轮换后的新 access token
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
    pub access_token: String,
}

#[derive(Clone)]
pub struct Validate;

// 辅助函数：提取请求头字符串
fn header_str<'a>(req: &'a ServiceRequest, name: &str) -> Option<&'a str> {
    req.headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .filter(|s| !s.is_empty())
}

// 辅助函数：校验令牌并产出轮换后的 access token
fn validate_tokens(req: &ServiceRequest, user_id: i64) -> Result<String, String> {
    // 优先走 access token，subject 必须与 id 头一致
    if let Some(token) = header_str(req, ACCESS_TOKEN_HEADER)
        && let Ok(claims) = JwtUtils::verify_access_token(token)
    {
        if claims.sub != user_id.to_string() {
            return Err("token subject mismatch".to_string());
        }
        return JwtUtils::generate_access_token(user_id).map_err(|err| {
            info!("Failed to rotate access token: {}", err);
            "failed to rotate access token".to_string()
        });
    }

    // access token 失效时回退 refresh token
    let refresh = header_str(req, REFRESH_TOKEN_HEADER)
        .ok_or_else(|| "missing or invalid token".to_string())?;
    let claims = JwtUtils::verify_refresh_token(refresh).map_err(|err| {
        info!("Refresh token validation failed: {}", err);
        "invalid refresh token".to_string()
    })?;
    if claims.sub != user_id.to_string() {
        return Err("token subject mismatch".to_string());
    }

    JwtUtils::refresh_access_token(refresh).map_err(|err| {
        info!("Failed to rotate access token: {}", err);
        "failed to rotate access token".to_string()
    })
}

// 辅助函数：加载用户（优先命中缓存）
async fn load_user(req: &ServiceRequest, user_id: i64) -> Result<User, String> {
    let cache = req
        .app_data::<actix_web::web::Data<Arc<dyn ObjectCache>>>()
        .expect("Cache not found in app data")
        .get_ref()
        .clone();

    let cache_key = format!("user:{user_id}");
    match cache.get_raw(&cache_key).await {
        CacheResult::Found(json) => match serde_json::from_str::<User>(&json) {
            Ok(user) => return Ok(user),
            Err(_) => {
                cache.remove(&cache_key).await;
                info!("Failed to deserialize cached user {}", user_id);
            }
        },
        _ => {
            debug!("User {} not found in cache", user_id);
        }
    }

    let storage = req
        .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
        .expect("Storage not found in app data")
        .get_ref()
        .clone();

    let user = storage
        .get_user_by_id(user_id)
        .await
        .map_err(|_| "failed to retrieve user".to_string())?
        .ok_or_else(|| "user not found".to_string())?;

    if let Ok(user_json) = serde_json::to_string(&user) {
        cache
            .insert_raw(cache_key, user_json, AppConfig::get().cache.default_ttl)
            .await;
    }

    Ok(user)
}

async fn authenticate(req: &ServiceRequest) -> Result<AuthContext, String> {
    let user_id = header_str(req, ID_HEADER)
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| "missing user id".to_string())?;

    let access_token = validate_tokens(req, user_id)?;
    let user = load_user(req, user_id).await?;

    if user.status != UserStatus::Active {
        return Err("user is not active".to_string());
    }

    Ok(AuthContext { user, access_token })
}

impl<S, B> Transform<S, ServiceRequest> for Validate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ValidateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ValidateMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct ValidateMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ValidateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // 处理 OPTIONS 请求
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(req.into_response(
                    create_error_response(StatusCode::NO_CONTENT, "").map_into_right_body(),
                ));
            }

            match authenticate(&req).await {
                Ok(auth) => {
                    debug!("Authentication successful for user {}", auth.user.id);
                    req.extensions_mut().insert(auth);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(err) => {
                    info!(
                        "Authentication failed for request to {}: {}",
                        req.path(),
                        err
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            &format!("Unauthorized: {err}"),
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

// 辅助函数：从请求中提取认证信息
impl Validate {
    /// 从请求扩展中提取认证上下文
    /// 此函数应该在应用了 Validate 中间件的路由处理程序中使用
    pub fn extract_auth(req: &actix_web::HttpRequest) -> Option<AuthContext> {
        req.extensions().get::<AuthContext>().cloned()
    }

    /// 从请求扩展中提取用户ID
    pub fn extract_user_id(req: &actix_web::HttpRequest) -> Option<i64> {
        req.extensions().get::<AuthContext>().map(|a| a.user.id)
    }
}
