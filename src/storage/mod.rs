use std::sync::Arc;

use crate::models::{
    classes::entities::{Class, ClassDetail, RequiredField},
    invites::entities::{Invite, InviteType},
    members::entities::{ClassMember, ClassRole, StudentField},
    users::entities::User,
};

use crate::errors::Result;

pub mod sea_orm_storage;

#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;

    /// 班级管理方法
    // 创建班级：班级 + 必填字段模板 + 创建者的 admin 成员记录，单事务写入
    async fn create_class(
        &self,
        creator: &User,
        name: &str,
        description: Option<String>,
        fields: Vec<RequiredField>,
    ) -> Result<ClassDetail>;
    // 通过ID获取班级信息
    async fn get_class_by_id(&self, class_id: &str) -> Result<Option<Class>>;
    // 获取班级完整投影（字段模板 + 信息表 + 成员名单）
    async fn get_class_detail(&self, class_id: &str) -> Result<Option<ClassDetail>>;

    /// 班级信息键值方法
    // 新增信息项，键已存在时返回 false
    async fn insert_class_info(&self, class_id: &str, name: &str, value: &str) -> Result<bool>;
    // 更新信息项，键不存在时返回 false
    async fn update_class_info(&self, class_id: &str, name: &str, value: &str) -> Result<bool>;
    // 删除信息项，键不存在时返回 false
    async fn delete_class_info(&self, class_id: &str, name: &str) -> Result<bool>;

    /// 邀请管理方法
    // 签发邀请令牌
    async fn create_invite(
        &self,
        class_id: &str,
        invite_type: InviteType,
        expires_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<Invite>;
    // 查找邀请令牌
    async fn get_invite(&self, class_id: &str, invite_id: &str) -> Result<Option<Invite>>;
    // 班级是否签发过邀请
    async fn class_has_invites(&self, class_id: &str) -> Result<bool>;
    // 惰性清理：删除班级的所有过期邀请
    async fn delete_expired_invites(&self, class_id: &str) -> Result<u64>;

    /// 班级成员管理方法
    // 获取用户在班级中的成员记录
    async fn get_member(&self, user_id: i64, class_id: &str) -> Result<Option<ClassMember>>;
    // 加入班级：人数上限通过条件自增原子校验，满员时返回 None
    async fn join_class(
        &self,
        user: &User,
        class_id: &str,
        role: ClassRole,
        headline: Option<String>,
        information: Vec<StudentField>,
    ) -> Result<Option<ClassMember>>;
    // 移除成员：删除成员记录并级联删除其提交记录，返回待 unlink 的文件路径
    async fn remove_member(&self, member: &ClassMember) -> Result<Vec<String>>;
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
