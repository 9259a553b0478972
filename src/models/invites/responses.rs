use serde::Serialize;

use crate::models::classes::entities::ClassPreview;

use super::entities::InviteType;

// 邀请签发成功响应
#[derive(Debug, Serialize)]
pub struct InviteCreatedResponse {
    #[serde(rename = "type")]
    pub invite_type: InviteType,
    #[serde(rename = "classId")]
    pub class_id: String,
    pub inviteid: String,
    #[serde(rename = "expireIn")]
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub accesstoken: String,
}

// 邀请信息响应（非成员视角的受限班级投影）
#[derive(Debug, Serialize)]
pub struct InviteInfoResponse {
    pub class: ClassPreview,
    pub invite: String,
    pub accesstoken: String,
}
