use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::InviteService;
use crate::{
    config::AppConfig,
    middlewares::{RequireClassAdmin, Validate},
    models::invites::{entities::InviteType, responses::InviteCreatedResponse},
    utils::validate::parse_expire_days,
};

const TYPE_HEADER: &str = "type";
const EXPIRE_HEADER: &str = "expi";

pub async fn issue_invite(
    service: &InviteService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let auth = match Validate::extract_auth(request) {
        Some(auth) => auth,
        None => {
            return Ok(HttpResponse::Unauthorized().json("Unauthorized: missing user claims"));
        }
    };
    // 管理员成员记录由 RequireClassAdmin 写入
    let member = match RequireClassAdmin::extract_member(request) {
        Some(member) => member,
        None => {
            return Ok(HttpResponse::Forbidden().json("no admin permission for this class"));
        }
    };

    // type 缺省或不可解析时按学生邀请处理
    let invite_type = request
        .headers()
        .get(TYPE_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.parse::<InviteType>().ok())
        .unwrap_or(InviteType::Student);

    let config = AppConfig::get();
    let expire_days = parse_expire_days(
        request
            .headers()
            .get(EXPIRE_HEADER)
            .and_then(|h| h.to_str().ok()),
        config.classroom.invite_default_days,
    );
    let expires_at = chrono::Utc::now() + chrono::Duration::days(expire_days);

    let storage = service.get_storage(request);
    match storage
        .create_invite(&member.class_id, invite_type, expires_at)
        .await
    {
        Ok(invite) => Ok(HttpResponse::Ok().json(InviteCreatedResponse {
            invite_type: invite.invite_type,
            class_id: invite.class_id,
            inviteid: invite.id,
            expires_at: invite.expires_at,
            accesstoken: auth.access_token,
        })),
        Err(e) => {
            error!("Error creating invite for {}: {}", member.class_id, e);
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}
