use serde::Deserialize;

// 创建班级请求
//
// fields 为 (字段名, 优先级) 对的列表，来源与前端的 Map 序列化格式保持一致
#[derive(Debug, Deserialize)]
pub struct CreateClassRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub fields: Option<Vec<(String, i32)>>,
}

// 班级信息写请求（add / update 共用）
#[derive(Debug, Deserialize)]
pub struct InfoWriteRequest {
    pub fieldname: Option<String>,
    pub fieldvalue: Option<String>,
}

impl InfoWriteRequest {
    /// 校验 add/update 所需字段，返回 (fieldname, fieldvalue)
    pub fn require_both(&self) -> Option<(&str, &str)> {
        match (self.fieldname.as_deref(), self.fieldvalue.as_deref()) {
            (Some(name), Some(value)) if !name.is_empty() && !value.is_empty() => {
                Some((name, value))
            }
            _ => None,
        }
    }
}

// 班级信息删除请求
#[derive(Debug, Deserialize)]
pub struct InfoDeleteRequest {
    pub fieldname: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_both() {
        let full = InfoWriteRequest {
            fieldname: Some("room".into()),
            fieldvalue: Some("201".into()),
        };
        assert_eq!(full.require_both(), Some(("room", "201")));

        let missing = InfoWriteRequest {
            fieldname: Some("room".into()),
            fieldvalue: None,
        };
        assert!(missing.require_both().is_none());

        let empty = InfoWriteRequest {
            fieldname: Some(String::new()),
            fieldvalue: Some("201".into()),
        };
        assert!(empty.require_both().is_none());
    }
}
