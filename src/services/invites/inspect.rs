use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{debug, error, warn};

use super::InviteService;
use crate::{
    middlewares::{Validate, extract_class_id},
    models::invites::{requests::InviteInfoRequest, responses::InviteInfoResponse},
};

pub async fn inspect_invite(
    service: &InviteService,
    request: &HttpRequest,
    info_data: InviteInfoRequest,
) -> ActixResult<HttpResponse> {
    let auth = match Validate::extract_auth(request) {
        Some(auth) => auth,
        None => {
            return Ok(HttpResponse::Unauthorized().json("Unauthorized: missing user claims"));
        }
    };
    // classid 的存在已由 ClassStatus 中间件保证
    let class_id = match extract_class_id(request) {
        Some(cid) => cid,
        None => {
            return Ok(HttpResponse::BadRequest().json("missing field(s) [classid]"));
        }
    };

    let invite_id = match info_data.inviteid.as_deref().filter(|s| !s.is_empty()) {
        Some(id) => id,
        None => {
            return Ok(HttpResponse::BadRequest().json("missing field(s) [inviteid]"));
        }
    };

    let storage = service.get_storage(request);
    let invite = match storage.get_invite(&class_id, invite_id).await {
        Ok(Some(invite)) => invite,
        Ok(None) => {
            // 区分"班级从未签发邀请"与"令牌不存在"
            return match storage.class_has_invites(&class_id).await {
                Ok(false) => Ok(HttpResponse::NotFound().json("invite not found")),
                Ok(true) => Ok(HttpResponse::NotFound().json("invalid invite id")),
                Err(e) => {
                    error!("Error checking invites for {}: {}", class_id, e);
                    Ok(HttpResponse::InternalServerError().finish())
                }
            };
        }
        Err(e) => {
            error!("Error loading invite {}: {}", invite_id, e);
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };

    if invite.is_expired(chrono::Utc::now()) {
        // 惰性清理：顺手删掉该班级所有已过期的令牌
        match storage.delete_expired_invites(&class_id).await {
            Ok(pruned) => debug!("Pruned {} expired invites for {}", pruned, class_id),
            Err(e) => warn!("Failed to prune expired invites for {}: {}", class_id, e),
        }
        return Ok(HttpResponse::NotFound().json("invite expired"));
    }

    let detail = match storage.get_class_detail(&class_id).await {
        Ok(Some(detail)) => detail,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json("class not found"));
        }
        Err(e) => {
            error!("Error loading class {}: {}", class_id, e);
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };

    // 非成员视角：受限投影，不暴露学生名单
    Ok(HttpResponse::Ok().json(InviteInfoResponse {
        class: detail.into_preview(),
        invite: invite.id,
        accesstoken: auth.access_token,
    }))
}
