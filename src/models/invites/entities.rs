use serde::{Deserialize, Serialize};

use crate::models::members::entities::ClassRole;

// 邀请令牌类型（决定加入后的角色）
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum InviteType {
    Student,
    Teacher,
}

impl InviteType {
    /// 加入后获得的班级角色（邀请的教师不会获得管理权限）
    pub fn join_role(&self) -> ClassRole {
        match self {
            InviteType::Student => ClassRole::Student,
            InviteType::Teacher => ClassRole::Teacher,
        }
    }

    /// 教师邀请默认不在列表中展示
    pub fn default_show(&self) -> bool {
        !matches!(self, InviteType::Teacher)
    }
}

impl<'de> Deserialize<'de> for InviteType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "student" => Ok(InviteType::Student),
            "teacher" => Ok(InviteType::Teacher),
            _ => Err(serde::de::Error::custom(format!(
                "无效的邀请类型: '{s}'. 支持的类型: student, teacher"
            ))),
        }
    }
}

impl std::fmt::Display for InviteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InviteType::Student => write!(f, "student"),
            InviteType::Teacher => write!(f, "teacher"),
        }
    }
}

impl std::str::FromStr for InviteType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(InviteType::Student),
            "teacher" => Ok(InviteType::Teacher),
            _ => Err(format!("Invalid invite type: {s}")),
        }
    }
}

// 邀请令牌
#[derive(Debug, Clone, Serialize)]
pub struct Invite {
    pub id: String,
    pub class_id: String,
    #[serde(rename = "type")]
    pub invite_type: InviteType,
    pub show: bool,
    #[serde(rename = "expireIn")]
    pub expires_at: chrono::DateTime<chrono::Utc>,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Invite {
    /// 过期判定：`now > expires_at` 视为过期，等于时仍然有效
    pub fn is_expired(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        now > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_join_role_mapping() {
        assert_eq!(InviteType::Student.join_role(), ClassRole::Student);
        assert_eq!(InviteType::Teacher.join_role(), ClassRole::Teacher);
    }

    #[test]
    fn test_teacher_invites_hidden() {
        assert!(InviteType::Student.default_show());
        assert!(!InviteType::Teacher.default_show());
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let invite = Invite {
            id: "i1".into(),
            class_id: "c1".into(),
            invite_type: InviteType::Student,
            show: true,
            expires_at: now,
            created_at: now - Duration::days(1),
        };
        // 恰好到期的时间点仍然有效
        assert!(!invite.is_expired(now));
        assert!(invite.is_expired(now + Duration::seconds(1)));
        assert!(!invite.is_expired(now - Duration::seconds(1)));
    }
}
