use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::classes::requests::{CreateClassRequest, InfoDeleteRequest, InfoWriteRequest};
use crate::models::invites::requests::InviteInfoRequest;
use crate::models::members::requests::{JoinClassRequest, KickMemberRequest};
use crate::services::{ClassService, InviteService, MemberService};

// 懒加载的全局服务实例
static CLASS_SERVICE: Lazy<ClassService> = Lazy::new(ClassService::new_lazy);
static INVITE_SERVICE: Lazy<InviteService> = Lazy::new(InviteService::new_lazy);
static MEMBER_SERVICE: Lazy<MemberService> = Lazy::new(MemberService::new_lazy);

// HTTP处理程序
pub async fn create_class(
    req: HttpRequest,
    class_data: web::Json<CreateClassRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE
        .create_class(&req, class_data.into_inner())
        .await
}

pub async fn issue_invite(req: HttpRequest) -> ActixResult<HttpResponse> {
    INVITE_SERVICE.issue_invite(&req).await
}

pub async fn inspect_invite(
    req: HttpRequest,
    info_data: web::Json<InviteInfoRequest>,
) -> ActixResult<HttpResponse> {
    INVITE_SERVICE
        .inspect_invite(&req, info_data.into_inner())
        .await
}

pub async fn join_class(
    req: HttpRequest,
    join_data: web::Json<JoinClassRequest>,
) -> ActixResult<HttpResponse> {
    MEMBER_SERVICE.join_class(&req, join_data.into_inner()).await
}

pub async fn view_class(req: HttpRequest) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.view_class(&req).await
}

pub async fn add_info(
    req: HttpRequest,
    info_data: web::Json<InfoWriteRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.add_info(&req, info_data.into_inner()).await
}

pub async fn update_info(
    req: HttpRequest,
    info_data: web::Json<InfoWriteRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.update_info(&req, info_data.into_inner()).await
}

pub async fn delete_info(
    req: HttpRequest,
    info_data: web::Json<InfoDeleteRequest>,
) -> ActixResult<HttpResponse> {
    CLASS_SERVICE.delete_info(&req, info_data.into_inner()).await
}

pub async fn kick_member(
    req: HttpRequest,
    kick_data: web::Json<KickMemberRequest>,
) -> ActixResult<HttpResponse> {
    MEMBER_SERVICE.kick_member(&req, kick_data.into_inner()).await
}

// 配置路由
pub fn configure_classroom_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/classroom")
            .wrap(middlewares::Validate)
            .service(web::resource("/create").route(web::post().to(create_class)))
            .service(
                web::resource("/invite")
                    .route(
                        web::get()
                            .to(issue_invite)
                            // 仅管理员签发邀请
                            .wrap(middlewares::RequireClassAdmin::new()),
                    )
                    // 接受邀请：成员身份在工作流门禁内检查，保持门禁顺序
                    .route(web::post().to(join_class)),
            )
            .service(
                web::resource("/invite/info").route(
                    web::get()
                        .to(inspect_invite)
                        // 已是成员的用户不需要再看邀请信息
                        .wrap(middlewares::ClassStatus::require_non_member()),
                ),
            )
            .service(
                web::resource("/info")
                    .route(
                        web::get()
                            .to(view_class)
                            // 班级信息页仅成员可见
                            .wrap(middlewares::ClassStatus::require_member()),
                    )
                    .route(
                        web::post()
                            .to(add_info)
                            .wrap(middlewares::RequireClassAdmin::new()),
                    )
                    .route(
                        web::patch()
                            .to(update_info)
                            .wrap(middlewares::RequireClassAdmin::new()),
                    )
                    .route(
                        web::delete()
                            .to(delete_info)
                            .wrap(middlewares::RequireClassAdmin::new()),
                    ),
            )
            .service(
                web::resource("/kick").route(
                    web::delete().to(kick_member).wrap(
                        middlewares::RequireClassAdmin::new()
                            // 踢人接口对缺失 classid 有专门文案
                            .missing_classid_message("missing fields either [classid,memberid]"),
                    ),
                ),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ObjectCache, moka::MokaCacheWrapper};
    use crate::entity::prelude::UserActiveModel;
    use crate::storage::{Storage, sea_orm_storage::SeaOrmStorage};
    use crate::utils::jwt::JwtUtils;
    use actix_web::{App, http::StatusCode, test};
    use sea_orm::{ActiveModelTrait, Set};
    use std::sync::Arc;

    // 管理员把 memberid 指向自己时，整条链路（认证 + 管理员门禁 + 踢人服务）回 403
    #[actix_web::test]
    async fn test_kick_self_is_forbidden() {
        let raw = SeaOrmStorage::new_in_memory().await.unwrap();
        let admin = UserActiveModel {
            username: Set("admin".to_string()),
            display_name: Set(None),
            status: Set("active".to_string()),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
        .insert(&raw.db)
        .await
        .unwrap()
        .into_user();
        let detail = raw
            .create_class_impl(&admin, "math", None, vec![])
            .await
            .unwrap();

        let storage: Arc<dyn Storage> = Arc::new(raw);
        let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::new());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(storage))
                .app_data(web::Data::new(cache))
                .configure(configure_classroom_routes),
        )
        .await;

        let token = JwtUtils::generate_access_token(admin.id).unwrap();
        let req = test::TestRequest::delete()
            .uri("/classroom/kick")
            .insert_header(("id", admin.id.to_string()))
            .insert_header(("accesstoken", token))
            .insert_header(("classid", detail.id.clone()))
            .set_json(serde_json::json!({ "memberid": admin.id }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let body = test::read_body(resp).await;
        assert_eq!(body.as_ref(), b"\"can not kick oneself\"");
    }
}
