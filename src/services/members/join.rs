//! 加入班级工作流
//!
//! 按固定顺序的快速失败门禁推进：inviteid 存在 → 邀请有效 → 未过期 →
//! 尚未加入 → 班级存在 → 人数未满（存储层条件自增兜底）。学生路径在
//! 构造任何记录之前先校验所有必填字段是否齐全。

use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{debug, error, warn};

use super::MemberService;
use crate::{
    middlewares::{Validate, extract_class_id},
    models::{
        classes::entities::RequiredField,
        invites::entities::InviteType,
        members::{
            entities::StudentField, requests::JoinClassRequest, responses::JoinClassResponse,
        },
    },
};

pub async fn join_class(
    service: &MemberService,
    request: &HttpRequest,
    join_data: JoinClassRequest,
) -> ActixResult<HttpResponse> {
    let auth = match Validate::extract_auth(request) {
        Some(auth) => auth,
        None => {
            return Ok(HttpResponse::Unauthorized().json("Unauthorized: missing user claims"));
        }
    };
    let class_id = match extract_class_id(request) {
        Some(cid) => cid,
        None => {
            return Ok(HttpResponse::BadRequest().json("missing field(s) [classid]"));
        }
    };

    // 门禁 1：inviteid 必须存在
    let invite_id = match join_data.inviteid.as_deref().filter(|s| !s.is_empty()) {
        Some(id) => id,
        None => {
            return Ok(HttpResponse::BadRequest().json("missing field(s) [inviteid]"));
        }
    };

    let storage = service.get_storage(request);

    // 门禁 2/3：令牌必须存在，区分"班级没有任何邀请"与"令牌ID无效"
    let invite = match storage.get_invite(&class_id, invite_id).await {
        Ok(Some(invite)) => invite,
        Ok(None) => {
            return match storage.class_has_invites(&class_id).await {
                Ok(false) => Ok(HttpResponse::NotFound().json("invite not found")),
                Ok(true) => Ok(HttpResponse::NotFound().json("invalid invite id")),
                Err(e) => {
                    error!("Error checking invites for {}: {}", class_id, e);
                    Ok(HttpResponse::InternalServerError().finish())
                }
            };
        }
        Err(e) => {
            error!("Error loading invite {}: {}", invite_id, e);
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };

    // 门禁 4：令牌未过期（顺带惰性清理过期令牌）
    if invite.is_expired(chrono::Utc::now()) {
        match storage.delete_expired_invites(&class_id).await {
            Ok(pruned) => debug!("Pruned {} expired invites for {}", pruned, class_id),
            Err(e) => warn!("Failed to prune expired invites for {}: {}", class_id, e),
        }
        return Ok(HttpResponse::NotFound().json("invite expired"));
    }

    // 门禁 5：调用者不能已经是成员
    match storage.get_member(auth.user.id, &class_id).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json("user is already part of the class"));
        }
        Ok(None) => {}
        Err(e) => {
            error!("Error checking membership for {}: {}", class_id, e);
            return Ok(HttpResponse::InternalServerError().finish());
        }
    }

    // 门禁 6：班级必须存在（学生路径还需要必填字段模板）
    let detail = match storage.get_class_detail(&class_id).await {
        Ok(Some(detail)) => detail,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json("class not found"));
        }
        Err(e) => {
            error!("Error loading class {}: {}", class_id, e);
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };

    // 学生路径：先校验所有必填字段，再构造任何记录
    let (headline, information) = if invite.invite_type == InviteType::Student {
        let supplied: HashMap<String, String> =
            join_data.fields.unwrap_or_default().into_iter().collect();
        let information = match collect_required_fields(&detail.required_fields, &supplied) {
            Ok(information) => information,
            Err(missing) => {
                return Ok(HttpResponse::BadRequest().json(format!("{missing} not found")));
            }
        };
        (headline_field(&detail.required_fields), information)
    } else {
        (None, Vec::new())
    };

    // 门禁 7：人数上限由存储层的条件自增保证，满员返回 None
    let role = invite.invite_type.join_role();
    match storage
        .join_class(&auth.user, &class_id, role, headline, information)
        .await
    {
        Ok(Some(member)) => Ok(HttpResponse::Ok().json(JoinClassResponse {
            classid: member.class_id,
            role: member.role,
            accesstoken: auth.access_token,
        })),
        Ok(None) => Ok(HttpResponse::Conflict().json("class is full")),
        Err(e) => {
            error!("Error joining class {}: {}", class_id, e);
            Ok(HttpResponse::InternalServerError().finish())
        }
    }
}

/// 按模板顺序收集学生信息；遇到第一个缺失字段即返回其名称
fn collect_required_fields(
    required: &[RequiredField],
    supplied: &HashMap<String, String>,
) -> Result<Vec<StudentField>, String> {
    let mut information = Vec::with_capacity(required.len());
    for field in required {
        match supplied.get(&field.name) {
            Some(value) => information.push(StudentField {
                name: field.name.clone(),
                value: value.clone(),
                priority: field.priority,
                required: true,
            }),
            None => return Err(field.name.clone()),
        }
    }
    Ok(information)
}

/// 头条字段：优先级数值最高的必填字段名，相同优先级时首次出现的获胜
fn headline_field(required: &[RequiredField]) -> Option<String> {
    let mut best: Option<&RequiredField> = None;
    for field in required {
        match best {
            Some(current) if field.priority > current.priority => best = Some(field),
            None => best = Some(field),
            _ => {}
        }
    }
    best.map(|f| f.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required(pairs: &[(&str, i32)]) -> Vec<RequiredField> {
        pairs
            .iter()
            .map(|(name, priority)| RequiredField {
                name: (*name).to_string(),
                priority: *priority,
            })
            .collect()
    }

    #[test]
    fn test_first_missing_field_short_circuits() {
        let template = required(&[("name", 1), ("phone", 2), ("grade", 3)]);
        let supplied: HashMap<String, String> =
            [("name".to_string(), "a".to_string())].into_iter().collect();
        assert_eq!(
            collect_required_fields(&template, &supplied),
            Err("phone".to_string())
        );
    }

    #[test]
    fn test_collects_one_entry_per_required_field() {
        let template = required(&[("name", 1), ("grade", 5)]);
        let supplied: HashMap<String, String> = [
            ("name".to_string(), "zhang".to_string()),
            ("grade".to_string(), "3".to_string()),
            ("extra".to_string(), "ignored".to_string()),
        ]
        .into_iter()
        .collect();

        let information = collect_required_fields(&template, &supplied).unwrap();
        assert_eq!(information.len(), 2);
        assert_eq!(information[0].name, "name");
        assert_eq!(information[1].value, "3");
        assert!(information.iter().all(|f| f.required));
    }

    #[test]
    fn test_headline_picks_highest_priority() {
        let template = required(&[("name", 1), ("grade", 5), ("phone", 3)]);
        assert_eq!(headline_field(&template), Some("grade".to_string()));
    }

    #[test]
    fn test_headline_tie_first_occurrence_wins() {
        let template = required(&[("name", 5), ("grade", 5)]);
        assert_eq!(headline_field(&template), Some("name".to_string()));
        assert_eq!(headline_field(&[]), None);
    }
}
