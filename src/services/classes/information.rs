//! 班级信息键值维护（仅管理员）
//!
//! add / update / delete 三个操作共享同一套流程：校验请求体、确认班级存在、
//! 执行写入、回传刷新后的班级投影。键冲突与键缺失都按 409 返回。

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use std::sync::Arc;

use super::ClassService;
use crate::{
    middlewares::{RequireClassAdmin, Validate},
    models::classes::{
        requests::{InfoDeleteRequest, InfoWriteRequest},
        responses::ClassResponse,
    },
    storage::Storage,
    utils::validate::validate_field_name,
};

pub async fn add_info(
    service: &ClassService,
    request: &HttpRequest,
    info_data: InfoWriteRequest,
) -> ActixResult<HttpResponse> {
    let (auth, class_id) = match extract_context(request) {
        Ok(ctx) => ctx,
        Err(response) => return Ok(response),
    };

    let (name, value) = match info_data.require_both() {
        Some(pair) => pair,
        None => {
            return Ok(HttpResponse::BadRequest().json("missing field(s) [fieldname,fieldvalue]"));
        }
    };
    if let Err(msg) = validate_field_name(name) {
        return Ok(HttpResponse::BadRequest().json(msg));
    }

    let storage = service.get_storage(request);
    if let Err(response) = ensure_class_exists(&storage, &class_id).await {
        return Ok(response);
    }

    match storage.insert_class_info(&class_id, name, value).await {
        Ok(true) => class_response(service, request, &class_id, auth.access_token).await,
        Ok(false) => Ok(HttpResponse::Conflict().json(format!("{name} already present"))),
        Err(e) => {
            error!("Error adding class info for {}: {}", class_id, e);
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

pub async fn update_info(
    service: &ClassService,
    request: &HttpRequest,
    info_data: InfoWriteRequest,
) -> ActixResult<HttpResponse> {
    let (auth, class_id) = match extract_context(request) {
        Ok(ctx) => ctx,
        Err(response) => return Ok(response),
    };

    let (name, value) = match info_data.require_both() {
        Some(pair) => pair,
        None => {
            return Ok(HttpResponse::BadRequest().json("missing field(s) [fieldname,fieldvalue]"));
        }
    };

    let storage = service.get_storage(request);
    if let Err(response) = ensure_class_exists(&storage, &class_id).await {
        return Ok(response);
    }

    match storage.update_class_info(&class_id, name, value).await {
        Ok(true) => class_response(service, request, &class_id, auth.access_token).await,
        Ok(false) => Ok(HttpResponse::Conflict().json(format!("{name} not found"))),
        Err(e) => {
            error!("Error updating class info for {}: {}", class_id, e);
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

pub async fn delete_info(
    service: &ClassService,
    request: &HttpRequest,
    info_data: InfoDeleteRequest,
) -> ActixResult<HttpResponse> {
    let (auth, class_id) = match extract_context(request) {
        Ok(ctx) => ctx,
        Err(response) => return Ok(response),
    };

    let name = match info_data.fieldname.as_deref().filter(|s| !s.is_empty()) {
        Some(name) => name,
        None => {
            return Ok(HttpResponse::BadRequest().json("missing field(s) [fieldname]"));
        }
    };

    let storage = service.get_storage(request);
    if let Err(response) = ensure_class_exists(&storage, &class_id).await {
        return Ok(response);
    }

    match storage.delete_class_info(&class_id, name).await {
        Ok(true) => class_response(service, request, &class_id, auth.access_token).await,
        Ok(false) => Ok(HttpResponse::Conflict().json(format!("{name} not found"))),
        Err(e) => {
            error!("Error deleting class info for {}: {}", class_id, e);
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

// 辅助函数：写入前确认班级仍然存在（成员记录与班级之间有删除竞争窗口）
async fn ensure_class_exists(
    storage: &Arc<dyn Storage>,
    class_id: &str,
) -> Result<(), HttpResponse> {
    match storage.get_class_by_id(class_id).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(HttpResponse::BadRequest().json("class not found")),
        Err(e) => {
            error!("Error loading class {}: {}", class_id, e);
            Err(HttpResponse::InternalServerError().finish())
        }
    }
}

// 辅助函数：提取认证上下文和管理员成员记录携带的班级ID
fn extract_context(
    request: &HttpRequest,
) -> Result<(crate::middlewares::AuthContext, String), HttpResponse> {
    let auth = Validate::extract_auth(request)
        .ok_or_else(|| HttpResponse::Unauthorized().json("Unauthorized: missing user claims"))?;
    let member = RequireClassAdmin::extract_member(request)
        .ok_or_else(|| HttpResponse::Forbidden().json("no admin permission for this class"))?;
    Ok((auth, member.class_id))
}

// 辅助函数：写入成功后的 {class, accesstoken} 响应
async fn class_response(
    service: &ClassService,
    request: &HttpRequest,
    class_id: &str,
    accesstoken: String,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    match storage.get_class_detail(class_id).await {
        Ok(Some(class)) => Ok(HttpResponse::Ok().json(ClassResponse { class, accesstoken })),
        Ok(None) => Ok(HttpResponse::BadRequest().json("class not found")),
        Err(e) => {
            error!("Error reloading class {}: {}", class_id, e);
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middlewares::AuthContext;
    use crate::models::members::entities::{ClassMember, ClassRole};
    use crate::models::users::entities::{User, UserStatus};
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use actix_web::{HttpMessage, http::StatusCode, test, web};

    fn admin_auth() -> AuthContext {
        AuthContext {
            user: User {
                id: 1,
                username: "admin".to_string(),
                display_name: None,
                status: UserStatus::Active,
                created_at: chrono::Utc::now(),
            },
            access_token: "token".to_string(),
        }
    }

    fn admin_member(class_id: &str) -> ClassMember {
        ClassMember {
            id: 1,
            class_id: class_id.to_string(),
            user_id: 1,
            role: ClassRole::Admin,
            display_name: None,
            headline: None,
            joined_at: chrono::Utc::now(),
        }
    }

    async fn request_for_missing_class() -> HttpRequest {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::new_in_memory().await.unwrap());
        let req = test::TestRequest::default()
            .app_data(web::Data::new(storage))
            .to_http_request();
        req.extensions_mut().insert(admin_auth());
        req.extensions_mut().insert(admin_member("missing"));
        req
    }

    // 班级在成员记录校验后被删除时，写操作统一回 400 而不是键冲突 409
    #[actix_web::test]
    async fn test_update_info_on_missing_class_is_bad_request() {
        let req = request_for_missing_class().await;
        let service = ClassService::new_lazy();
        let resp = service
            .update_info(
                &req,
                InfoWriteRequest {
                    fieldname: Some("room".to_string()),
                    fieldvalue: Some("201".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_delete_info_on_missing_class_is_bad_request() {
        let req = request_for_missing_class().await;
        let service = ClassService::new_lazy();
        let resp = service
            .delete_info(
                &req,
                InfoDeleteRequest {
                    fieldname: Some("room".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
