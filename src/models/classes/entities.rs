use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// 班级
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
    // 班级ID（不透明 UUID）
    pub id: String,
    // 班级名称
    pub name: String,
    // 班级描述
    pub description: Option<String>,
    // 成员总数（维护计数器，加入时原子校验上限）
    #[serde(rename = "totalMemberCount")]
    pub member_count: i64,
    // 创建时间
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    // 更新时间
    #[serde(rename = "updatedAt")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 必填字段模板项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredField {
    pub name: String,
    pub priority: i32,
}

// 班级完整投影：基础数据 + 字段模板 + 信息表 + 成员名单
#[derive(Debug, Clone, Serialize)]
pub struct ClassDetail {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "totalMemberCount")]
    pub member_count: i64,
    #[serde(rename = "requiredFields")]
    pub required_fields: Vec<RequiredField>,
    pub information: BTreeMap<String, String>,
    pub teachers: Vec<i64>,
    pub students: Vec<i64>,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl ClassDetail {
    /// 非成员可见的受限投影（邀请信息页）：隐藏学生名单
    pub fn into_preview(self) -> ClassPreview {
        ClassPreview {
            id: self.id,
            name: self.name,
            member_count: self.member_count,
            required_fields: self.required_fields,
            information: self.information,
            teachers: self.teachers,
        }
    }
}

// 受限投影：故意不暴露学生名单
#[derive(Debug, Clone, Serialize)]
pub struct ClassPreview {
    pub id: String,
    pub name: String,
    #[serde(rename = "totalMemberCount")]
    pub member_count: i64,
    #[serde(rename = "requiredFields")]
    pub required_fields: Vec<RequiredField>,
    pub information: BTreeMap<String, String>,
    pub teachers: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_hides_students() {
        let detail = ClassDetail {
            id: "c1".into(),
            name: "math".into(),
            description: None,
            member_count: 3,
            required_fields: vec![],
            information: BTreeMap::new(),
            teachers: vec![1],
            students: vec![2, 3],
            created_at: chrono::Utc::now(),
        };
        let json = serde_json::to_value(detail.into_preview()).unwrap();
        assert!(json.get("students").is_none());
        assert_eq!(json["teachers"], serde_json::json!([1]));
    }
}
