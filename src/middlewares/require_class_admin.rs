/*!
 * 班级管理员门禁中间件
 *
 * 此中间件必须在 Validate 中间件之后使用：读取 `classid` 请求头，查询调用者
 * 在该班级中的成员记录，仅 admin 角色放行，并把成员记录写入请求扩展。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * web::scope("/classroom")
 *     .wrap(Validate)
 *     .route("/invite", web::get().to(issue_invite).wrap(RequireClassAdmin::new()))
 * ```
 *
 * 个别接口对缺失 classid 有专门的错误文案，可以覆盖默认值：
 *
 * ```rust,ignore
 * RequireClassAdmin::new().missing_classid_message("missing fields either [classid,memberid]")
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};

use crate::{middlewares::AuthContext, models::members::entities::ClassMember, storage::Storage};

use super::create_error_response;

const DEFAULT_MISSING_CLASSID: &str = "missing field(s) [classid]";

#[derive(Clone)]
pub struct RequireClassAdmin {
    missing_classid: &'static str,
}

impl RequireClassAdmin {
    pub fn new() -> Self {
        Self {
            missing_classid: DEFAULT_MISSING_CLASSID,
        }
    }

    /// 覆盖缺失 classid 时的错误文案
    pub fn missing_classid_message(mut self, message: &'static str) -> Self {
        self.missing_classid = message;
        self
    }
}

impl Default for RequireClassAdmin {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireClassAdmin
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireClassAdminMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireClassAdminMiddleware {
            service: Rc::new(service),
            missing_classid: self.missing_classid,
        }))
    }
}

pub struct RequireClassAdminMiddleware<S> {
    service: Rc<S>,
    missing_classid: &'static str,
}

impl<S, B> Service<ServiceRequest> for RequireClassAdminMiddleware<S>
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
        let missing_classid = self.missing_classid;

        Box::pin(async move {
            // 1. 校验认证上下文
            let auth = req.extensions().get::<AuthContext>().cloned();
            let auth = match auth {
                Some(auth) => auth,
                None => {
                    return Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            "Unauthorized: missing user claims",
                        )
                        .map_into_right_body(),
                    ));
                }
            };

            // 2. 校验 classid 请求头
            let class_id = match super::extract_class_id(req.request()) {
                Some(cid) => cid,
                None => {
                    return Ok(req.into_response(
                        create_error_response(StatusCode::BAD_REQUEST, missing_classid)
                            .map_into_right_body(),
                    ));
                }
            };

            // 3. 查询调用者在班级中的成员记录，仅 admin 放行；存储故障回 500
            match get_member(&req, auth.user.id, &class_id).await {
                Ok(Some(member)) if member.role.is_admin() => {
                    tracing::debug!("Class admin {} granted for {}", member.user_id, class_id);
                    req.extensions_mut().insert(member);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Ok(_) => Ok(req.into_response(
                    create_error_response(
                        StatusCode::FORBIDDEN,
                        "no admin permission for this class",
                    )
                    .map_into_right_body(),
                )),
                Err(e) => {
                    tracing::error!("Error checking membership for {}: {}", class_id, e);
                    Ok(req.into_response(
                        actix_web::HttpResponse::InternalServerError()
                            .finish()
                            .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

// 辅助函数：从请求中提取成员记录
impl RequireClassAdmin {
    /// 从请求扩展中提取调用者的班级成员记录
    /// 此函数应该在应用了 RequireClassAdmin 中间件的路由处理程序中使用
    pub fn extract_member(req: &actix_web::HttpRequest) -> Option<ClassMember> {
        req.extensions().get::<ClassMember>().cloned()
    }
}

async fn get_member(
    req: &ServiceRequest,
    user_id: i64,
    class_id: &str,
) -> crate::errors::Result<Option<ClassMember>> {
    let storage = req
        .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
        .expect("Storage not found in app data")
        .get_ref()
        .clone();

    storage.get_member(user_id, class_id).await
}
