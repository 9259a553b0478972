use serde::Deserialize;

// 查看邀请信息请求（GET /invite/info 的请求体）
#[derive(Debug, Deserialize)]
pub struct InviteInfoRequest {
    pub inviteid: Option<String>,
}
