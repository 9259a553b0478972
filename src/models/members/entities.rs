use serde::{Deserialize, Serialize};

// 班级内角色
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ClassRole {
    Student, // 学生
    Teacher, // 教师
    Admin,   // 管理员（创建者，拥有管理权限的教师）
}

impl ClassRole {
    pub const STUDENT: &'static str = "student";
    pub const TEACHER: &'static str = "teacher";
    pub const ADMIN: &'static str = "admin";

    /// 是否拥有管理权限
    pub fn is_admin(&self) -> bool {
        matches!(self, ClassRole::Admin)
    }

    /// 是否属于教师侧名单（含管理员）
    pub fn is_teacher_side(&self) -> bool {
        matches!(self, ClassRole::Teacher | ClassRole::Admin)
    }
}

impl<'de> Deserialize<'de> for ClassRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            ClassRole::STUDENT => Ok(ClassRole::Student),
            ClassRole::TEACHER => Ok(ClassRole::Teacher),
            ClassRole::ADMIN => Ok(ClassRole::Admin),
            _ => Err(serde::de::Error::custom(format!(
                "无效的班级角色: '{s}'. 支持的角色: student, teacher, admin"
            ))),
        }
    }
}

impl std::fmt::Display for ClassRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassRole::Student => write!(f, "{}", ClassRole::STUDENT),
            ClassRole::Teacher => write!(f, "{}", ClassRole::TEACHER),
            ClassRole::Admin => write!(f, "{}", ClassRole::ADMIN),
        }
    }
}

impl std::str::FromStr for ClassRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(ClassRole::Student),
            "teacher" => Ok(ClassRole::Teacher),
            "admin" => Ok(ClassRole::Admin),
            _ => Err(format!("Invalid class role: {s}")),
        }
    }
}

// 班级成员记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassMember {
    pub id: i64,
    pub class_id: String,
    pub user_id: i64,
    pub role: ClassRole,
    pub display_name: Option<String>,
    // 学生记录的头条字段：加入时优先级最高的必填字段名
    pub headline: Option<String>,
    pub joined_at: chrono::DateTime<chrono::Utc>,
}

// 学生信息条目（按班级必填字段模板填写）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentField {
    pub name: String,
    pub value: String,
    pub priority: i32,
    pub required: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("admin".parse::<ClassRole>(), Ok(ClassRole::Admin));
        assert_eq!("student".parse::<ClassRole>(), Ok(ClassRole::Student));
        assert!("principal".parse::<ClassRole>().is_err());
    }

    #[test]
    fn test_admin_is_teacher_side() {
        assert!(ClassRole::Admin.is_admin());
        assert!(ClassRole::Admin.is_teacher_side());
        assert!(ClassRole::Teacher.is_teacher_side());
        assert!(!ClassRole::Teacher.is_admin());
        assert!(!ClassRole::Student.is_teacher_side());
    }
}
