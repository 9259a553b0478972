use once_cell::sync::Lazy;
use regex::Regex;

static FIELD_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_\- ]+$").expect("Invalid field name regex"));

/// 校验班级信息/必填字段的键名
///
/// 规则：
/// - 长度 1 ~ 64
/// - 只能包含字母、数字、下划线、连字符和空格
pub fn validate_field_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() || name.len() > 64 {
        return Err("Field name length must be between 1 and 64 characters");
    }
    if !FIELD_NAME_RE.is_match(name) {
        return Err("Field name must contain only letters, numbers, underscores, hyphens or spaces");
    }
    Ok(())
}

/// 解析邀请有效期（天）请求头，缺省或非法时回退到默认值
///
/// 有效范围 1 ~ 365 天
pub fn parse_expire_days(raw: Option<&str>, default_days: i64) -> i64 {
    match raw.and_then(|s| s.trim().parse::<i64>().ok()) {
        Some(days) if (1..=365).contains(&days) => days,
        _ => default_days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_field_names() {
        assert!(validate_field_name("grade").is_ok());
        assert!(validate_field_name("phone_number").is_ok());
        assert!(validate_field_name("Student ID").is_ok());
    }

    #[test]
    fn test_invalid_field_names() {
        assert!(validate_field_name("").is_err());
        assert!(validate_field_name(&"x".repeat(65)).is_err());
        assert!(validate_field_name("grade;drop").is_err());
    }

    #[test]
    fn test_parse_expire_days() {
        assert_eq!(parse_expire_days(Some("7"), 30), 7);
        assert_eq!(parse_expire_days(Some(" 14 "), 30), 14);
        assert_eq!(parse_expire_days(Some("0"), 30), 30);
        assert_eq!(parse_expire_days(Some("9999"), 30), 30);
        assert_eq!(parse_expire_days(Some("abc"), 30), 30);
        assert_eq!(parse_expire_days(None, 30), 30);
    }
}
