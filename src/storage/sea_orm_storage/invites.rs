//! 邀请令牌存储操作

use super::SeaOrmStorage;
use crate::entity::invites::{Column as InviteColumn, Entity as Invites};
use crate::entity::prelude::InviteActiveModel;
use crate::errors::{ClassHubError, Result};
use crate::models::invites::entities::{Invite, InviteType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, Set,
};

impl SeaOrmStorage {
    /// 签发邀请令牌
    pub async fn create_invite_impl(
        &self,
        class_id: &str,
        invite_type: InviteType,
        expires_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<Invite> {
        let invite = InviteActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            class_id: Set(class_id.to_string()),
            role: Set(invite_type.to_string()),
            show: Set(invite_type.default_show()),
            expires_at: Set(expires_at.timestamp()),
            created_at: Set(chrono::Utc::now().timestamp()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| ClassHubError::database_operation(format!("创建邀请失败: {e}")))?;

        Ok(invite.into_invite())
    }

    /// 查找邀请令牌（限定在指定班级内）
    pub async fn get_invite_impl(&self, class_id: &str, invite_id: &str) -> Result<Option<Invite>> {
        let result = Invites::find()
            .filter(
                Condition::all()
                    .add(InviteColumn::Id.eq(invite_id))
                    .add(InviteColumn::ClassId.eq(class_id)),
            )
            .one(&self.db)
            .await
            .map_err(|e| ClassHubError::database_operation(format!("查询邀请失败: {e}")))?;

        Ok(result.map(|m| m.into_invite()))
    }

    /// 班级是否签发过邀请
    pub async fn class_has_invites_impl(&self, class_id: &str) -> Result<bool> {
        let count = Invites::find()
            .filter(InviteColumn::ClassId.eq(class_id))
            .count(&self.db)
            .await
            .map_err(|e| ClassHubError::database_operation(format!("统计邀请失败: {e}")))?;

        Ok(count > 0)
    }

    /// 惰性清理：删除班级的所有过期邀请，返回清理数量
    pub async fn delete_expired_invites_impl(&self, class_id: &str) -> Result<u64> {
        let now = chrono::Utc::now().timestamp();
        let result = Invites::delete_many()
            .filter(
                Condition::all()
                    .add(InviteColumn::ClassId.eq(class_id))
                    .add(InviteColumn::ExpiresAt.lt(now)),
            )
            .exec(&self.db)
            .await
            .map_err(|e| ClassHubError::database_operation(format!("清理过期邀请失败: {e}")))?;

        Ok(result.rows_affected)
    }
}
