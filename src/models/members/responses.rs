use serde::Serialize;

use super::entities::ClassRole;

// 加入班级成功响应
#[derive(Debug, Serialize)]
pub struct JoinClassResponse {
    pub classid: String,
    #[serde(rename = "type")]
    pub role: ClassRole,
    pub accesstoken: String,
}
