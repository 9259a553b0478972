/*!
 * 班级成员身份门禁中间件
 *
 * 此中间件必须在 Validate 中间件之后使用：读取 `classid` 请求头并查询调用者
 * 的成员记录，按构造方式要求"必须是成员"或"必须不是成员"。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * // 班级信息页：仅成员可见
 * .route("/info", web::get().to(view_class).wrap(ClassStatus::require_member()))
 * // 邀请信息页：成员没有必要再看
 * .route("/invite/info", web::get().to(inspect_invite).wrap(ClassStatus::require_non_member()))
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

#[derive(Clone, Copy, PartialEq)]
enum Requirement {
    Member,
    NonMember,
}

#[derive(Clone)]
pub struct ClassStatus {
    requirement: Requirement,
}

impl ClassStatus {
    /// 要求调用者已是班级成员，成员记录会写入请求扩展
    pub fn require_member() -> Self {
        Self {
            requirement: Requirement::Member,
        }
    }

    /// 要求调用者不是班级成员
    pub fn require_non_member() -> Self {
        Self {
            requirement: Requirement::NonMember,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ClassStatus
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ClassStatusMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ClassStatusMiddleware {
            service: Rc::new(service),
            requirement: self.requirement,
        }))
    }
}

pub struct ClassStatusMiddleware<S> {
    service: Rc<S>,
    requirement: Requirement,
}

impl<S, B> Service<ServiceRequest> for ClassStatusMiddleware<S>
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
        let requirement = self.requirement;

        Box::pin(async move {
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

            let class_id = match super::extract_class_id(req.request()) {
                Some(cid) => cid,
                None => {
                    return Ok(req.into_response(
                        create_error_response(
                            StatusCode::BAD_REQUEST,
                            "missing field(s) [classid]",
                        )
                        .map_into_right_body(),
                    ));
                }
            };

            // 存储故障不能当成"不是成员"，否则 NonMember 门会放行真实成员
            let member = match get_member(&req, auth.user.id, &class_id).await {
                Ok(member) => member,
                Err(e) => {
                    tracing::error!("Error checking membership for {}: {}", class_id, e);
                    return Ok(req.into_response(
                        actix_web::HttpResponse::InternalServerError()
                            .finish()
                            .map_into_right_body(),
                    ));
                }
            };

            match (requirement, member) {
                (Requirement::Member, Some(member)) => {
                    req.extensions_mut().insert(member);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                (Requirement::Member, None) => Ok(req.into_response(
                    create_error_response(
                        StatusCode::FORBIDDEN,
                        "user is not part of the class",
                    )
                    .map_into_right_body(),
                )),
                (Requirement::NonMember, None) => {
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                (Requirement::NonMember, Some(_)) => Ok(req.into_response(
                    create_error_response(
                        StatusCode::CONFLICT,
                        "user is already part of the class",
                    )
                    .map_into_right_body(),
                )),
            }
        })
    }
}

// 辅助函数：从请求中提取成员记录
impl ClassStatus {
    /// 从请求扩展中提取调用者的班级成员记录
    /// 此函数应该在应用了 ClassStatus::require_member 的路由处理程序中使用
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ObjectCache, moka::MokaCacheWrapper};
    use crate::errors::{ClassHubError, Result};
    use crate::middlewares::Validate;
    use crate::models::{
        classes::entities::{Class, ClassDetail, RequiredField},
        invites::entities::{Invite, InviteType},
        members::entities::{ClassRole, StudentField},
        users::entities::{User, UserStatus},
    };
    use crate::utils::jwt::JwtUtils;
    use actix_web::{App, HttpResponse, test, web};
    use async_trait::async_trait;

    // 用户查询正常、成员查询故障的存储桩
    struct BrokenMembershipStorage;

    #[async_trait]
    impl Storage for BrokenMembershipStorage {
        async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
            Ok(Some(User {
                id,
                username: "stu".to_string(),
                display_name: None,
                status: UserStatus::Active,
                created_at: chrono::Utc::now(),
            }))
        }

        async fn get_member(&self, _user_id: i64, _class_id: &str) -> Result<Option<ClassMember>> {
            Err(ClassHubError::database_operation("成员查询失败"))
        }

        async fn create_class(
            &self,
            _creator: &User,
            _name: &str,
            _description: Option<String>,
            _fields: Vec<RequiredField>,
        ) -> Result<ClassDetail> {
            unimplemented!()
        }

        async fn get_class_by_id(&self, _class_id: &str) -> Result<Option<Class>> {
            unimplemented!()
        }

        async fn get_class_detail(&self, _class_id: &str) -> Result<Option<ClassDetail>> {
            unimplemented!()
        }

        async fn insert_class_info(
            &self,
            _class_id: &str,
            _name: &str,
            _value: &str,
        ) -> Result<bool> {
            unimplemented!()
        }

        async fn update_class_info(
            &self,
            _class_id: &str,
            _name: &str,
            _value: &str,
        ) -> Result<bool> {
            unimplemented!()
        }

        async fn delete_class_info(&self, _class_id: &str, _name: &str) -> Result<bool> {
            unimplemented!()
        }

        async fn create_invite(
            &self,
            _class_id: &str,
            _invite_type: InviteType,
            _expires_at: chrono::DateTime<chrono::Utc>,
        ) -> Result<Invite> {
            unimplemented!()
        }

        async fn get_invite(&self, _class_id: &str, _invite_id: &str) -> Result<Option<Invite>> {
            unimplemented!()
        }

        async fn class_has_invites(&self, _class_id: &str) -> Result<bool> {
            unimplemented!()
        }

        async fn delete_expired_invites(&self, _class_id: &str) -> Result<u64> {
            unimplemented!()
        }

        async fn join_class(
            &self,
            _user: &User,
            _class_id: &str,
            _role: ClassRole,
            _headline: Option<String>,
            _information: Vec<StudentField>,
        ) -> Result<Option<ClassMember>> {
            unimplemented!()
        }

        async fn remove_member(&self, _member: &ClassMember) -> Result<Vec<String>> {
            unimplemented!()
        }
    }

    // 存储故障时非成员门必须回 500，而不是当作"不是成员"放行
    #[actix_web::test]
    async fn test_storage_failure_on_non_member_gate_is_internal_error() {
        let storage: Arc<dyn Storage> = Arc::new(BrokenMembershipStorage);
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::new());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage))
                .app_data(web::Data::new(cache))
                .service(
                    web::scope("/classroom").wrap(Validate).service(
                        web::resource("/invite/info")
                            .route(web::get().to(|| async { HttpResponse::Ok().finish() }))
                            .wrap(ClassStatus::require_non_member()),
                    ),
                ),
        )
        .await;

        let token = JwtUtils::generate_access_token(7).unwrap();
        let req = test::TestRequest::get()
            .uri("/classroom/invite/info")
            .insert_header(("id", "7"))
            .insert_header(("accesstoken", token))
            .insert_header(("classid", "c1"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
