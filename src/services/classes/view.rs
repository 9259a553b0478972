use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::ClassService;
use crate::{
    middlewares::{ClassStatus, Validate},
    models::classes::responses::ClassViewResponse,
};

// q 请求头存在时才回传轮换后的 accesstoken
const TOKEN_QUERY_HEADER: &str = "q";

pub async fn view_class(service: &ClassService, request: &HttpRequest) -> ActixResult<HttpResponse> {
    let auth = match Validate::extract_auth(request) {
        Some(auth) => auth,
        None => {
            return Ok(HttpResponse::Unauthorized().json("Unauthorized: missing user claims"));
        }
    };

    // 成员记录由 ClassStatus::require_member 写入
    let member = match ClassStatus::extract_member(request) {
        Some(member) => member,
        None => {
            return Ok(HttpResponse::Forbidden().json("user is not part of the class"));
        }
    };

    let storage = service.get_storage(request);
    let detail = match storage.get_class_detail(&member.class_id).await {
        Ok(Some(detail)) => detail,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json("class not found"));
        }
        Err(e) => {
            error!("Error loading class view for {}: {}", member.class_id, e);
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };

    let accesstoken = request
        .headers()
        .get(TOKEN_QUERY_HEADER)
        .map(|_| auth.access_token);

    Ok(HttpResponse::Ok().json(ClassViewResponse {
        view: detail,
        accesstoken,
    }))
}
