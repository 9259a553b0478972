use serde::Serialize;

use super::entities::ClassDetail;

// 携带刷新后 accesstoken 的班级响应
#[derive(Debug, Serialize)]
pub struct ClassResponse {
    pub class: ClassDetail,
    pub accesstoken: String,
}

// 班级视图响应（GET /info，q 缺省时不回传 accesstoken）
#[derive(Debug, Serialize)]
pub struct ClassViewResponse {
    #[serde(flatten)]
    pub view: ClassDetail,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accesstoken: Option<String>,
}
