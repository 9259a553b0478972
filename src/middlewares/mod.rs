pub mod class_status;
pub mod require_class_admin;
pub mod validate;

pub use class_status::ClassStatus;
pub use require_class_admin::RequireClassAdmin;
pub use validate::{AuthContext, Validate};

use actix_web::{HttpResponse, http::StatusCode, http::header::CONTENT_TYPE};

pub(crate) const CLASS_ID_HEADER: &str = "classid";

// 辅助函数：创建错误响应（对外接口约定为纯 JSON 字符串，无包裹结构）
pub(crate) fn create_error_response(status: StatusCode, message: &str) -> HttpResponse {
    match status {
        StatusCode::NO_CONTENT => HttpResponse::build(status)
            .insert_header((CONTENT_TYPE, "text/plain; charset=utf-8"))
            .finish(),
        _ => HttpResponse::build(status).json(message),
    }
}

/// 从请求头提取 classid
pub fn extract_class_id(req: &actix_web::HttpRequest) -> Option<String> {
    req.headers()
        .get(CLASS_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}
