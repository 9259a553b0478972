//! 踢出成员工作流
//!
//! 数据库内的删除（成员、学生信息、提交记录）在存储层单事务完成；
//! 提交文件的磁盘清理在事务外尽力而为，失败只记日志，不影响结果。

use std::path::Path;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{error, warn};

use super::MemberService;
use crate::{
    config::AppConfig,
    middlewares::{RequireClassAdmin, Validate},
    models::{classes::responses::ClassResponse, members::requests::KickMemberRequest},
};

pub async fn kick_member(
    service: &MemberService,
    request: &HttpRequest,
    kick_data: KickMemberRequest,
) -> ActixResult<HttpResponse> {
    let auth = match Validate::extract_auth(request) {
        Some(auth) => auth,
        None => {
            return Ok(HttpResponse::Unauthorized().json("Unauthorized: missing user claims"));
        }
    };
    let admin = match RequireClassAdmin::extract_member(request) {
        Some(member) => member,
        None => {
            return Ok(HttpResponse::Forbidden().json("no admin permission for this class"));
        }
    };

    let member_id = match kick_data.memberid {
        Some(id) => id,
        None => {
            return Ok(
                HttpResponse::BadRequest().json("missing fields either [classid,memberid]")
            );
        }
    };

    if member_id == auth.user.id {
        return Ok(HttpResponse::Forbidden().json("can not kick oneself"));
    }

    let storage = service.get_storage(request);
    let target = match storage.get_member(member_id, &admin.class_id).await {
        Ok(Some(member)) => member,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json("user not found"));
        }
        Err(e) => {
            error!("Error loading member {}: {}", member_id, e);
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };

    let file_paths = match storage.remove_member(&target).await {
        Ok(paths) => paths,
        Err(e) => {
            error!(
                "Error removing member {} from {}: {}",
                member_id, admin.class_id, e
            );
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };

    unlink_submission_files(&file_paths).await;

    match storage.get_class_detail(&admin.class_id).await {
        Ok(Some(class)) => Ok(HttpResponse::Ok().json(ClassResponse {
            class,
            accesstoken: auth.access_token,
        })),
        Ok(None) => Ok(HttpResponse::NotFound().json("class not found")),
        Err(e) => {
            error!("Error reloading class {}: {}", admin.class_id, e);
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

// 尽力而为的文件清理，失败不致命
async fn unlink_submission_files(paths: &[String]) {
    let base = AppConfig::get().files.dir.clone();
    for path in paths {
        let full_path = Path::new(&base).join(path);
        if let Err(e) = tokio::fs::remove_file(&full_path).await {
            warn!("Failed to unlink submission file {:?}: {}", full_path, e);
        }
    }
}
