use serde::Deserialize;

// 接受邀请（加入班级）请求
//
// fields 为 (字段名, 值) 对的列表，与前端 Map 的序列化格式一致
#[derive(Debug, Deserialize)]
pub struct JoinClassRequest {
    pub inviteid: Option<String>,
    pub fields: Option<Vec<(String, String)>>,
}

// 踢出成员请求
#[derive(Debug, Deserialize)]
pub struct KickMemberRequest {
    pub memberid: Option<i64>,
}
