use actix_web::error::{InternalError, JsonPayloadError, QueryPayloadError};
use actix_web::{Error, HttpRequest, HttpResponse};
use tracing::debug;

// JSON 请求体解析错误处理器：返回纯字符串 400 响应
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> Error {
    debug!("JSON payload error on {}: {}", req.path(), err);
    let response = HttpResponse::BadRequest().json(format!("invalid request body: {err}"));
    InternalError::from_response(err, response).into()
}

// 查询参数解析错误处理器：返回纯字符串 400 响应
pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> Error {
    debug!("Query payload error on {}: {}", req.path(), err);
    let response = HttpResponse::BadRequest().json(format!("invalid query parameters: {err}"));
    InternalError::from_response(err, response).into()
}
