//! 班级存储操作

use std::collections::BTreeMap;

use super::SeaOrmStorage;
use crate::entity::class_fields::{Column as ClassFieldColumn, Entity as ClassFields};
use crate::entity::class_info::{Column as ClassInfoColumn, Entity as ClassInfo};
use crate::entity::class_members::{Column as ClassMemberColumn, Entity as ClassMembers};
use crate::entity::classes::Entity as Classes;
use crate::entity::prelude::{
    ClassActiveModel, ClassFieldActiveModel, ClassInfoActiveModel, ClassMemberActiveModel,
};
use crate::errors::{ClassHubError, Result};
use crate::models::{
    classes::entities::{Class, ClassDetail, RequiredField},
    members::entities::ClassRole,
    users::entities::User,
};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建班级
    ///
    /// 班级记录、必填字段模板和创建者的 admin 成员记录在同一事务中写入，
    /// 任何一步失败整体回滚，三个表不会出现不一致。
    pub async fn create_class_impl(
        &self,
        creator: &User,
        name: &str,
        description: Option<String>,
        fields: Vec<RequiredField>,
    ) -> Result<ClassDetail> {
        let now = chrono::Utc::now().timestamp();
        let class_id = uuid::Uuid::new_v4().to_string();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ClassHubError::database_operation(format!("开启事务失败: {e}")))?;

        // 创建者即首位成员
        ClassActiveModel {
            id: Set(class_id.clone()),
            name: Set(name.to_string()),
            description: Set(description),
            member_count: Set(1),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| ClassHubError::database_operation(format!("创建班级失败: {e}")))?;

        for field in &fields {
            ClassFieldActiveModel {
                class_id: Set(class_id.clone()),
                name: Set(field.name.clone()),
                priority: Set(field.priority),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| {
                ClassHubError::database_operation(format!("创建班级必填字段失败: {e}"))
            })?;
        }

        ClassMemberActiveModel {
            class_id: Set(class_id.clone()),
            user_id: Set(creator.id),
            role: Set(ClassRole::Admin.to_string()),
            display_name: Set(Some(creator.member_display_name())),
            headline: Set(None),
            joined_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| ClassHubError::database_operation(format!("创建班级管理员失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| ClassHubError::database_operation(format!("提交事务失败: {e}")))?;

        self.get_class_detail_impl(&class_id).await?.ok_or_else(|| {
            ClassHubError::database_operation("班级创建后查询失败".to_string())
        })
    }

    /// 通过ID获取班级信息
    pub async fn get_class_by_id_impl(&self, class_id: &str) -> Result<Option<Class>> {
        let result = Classes::find_by_id(class_id)
            .one(&self.db)
            .await
            .map_err(|e| ClassHubError::database_operation(format!("查询班级失败: {e}")))?;

        Ok(result.map(|m| m.into_class()))
    }

    /// 获取班级完整投影（字段模板 + 信息表 + 成员名单）
    pub async fn get_class_detail_impl(&self, class_id: &str) -> Result<Option<ClassDetail>> {
        let Some(class) = Classes::find_by_id(class_id)
            .one(&self.db)
            .await
            .map_err(|e| ClassHubError::database_operation(format!("查询班级失败: {e}")))?
        else {
            return Ok(None);
        };

        let required_fields = ClassFields::find()
            .filter(ClassFieldColumn::ClassId.eq(class_id))
            .order_by_asc(ClassFieldColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| ClassHubError::database_operation(format!("查询必填字段失败: {e}")))?
            .into_iter()
            .map(|m| m.into_required_field())
            .collect();

        let information: BTreeMap<String, String> = ClassInfo::find()
            .filter(ClassInfoColumn::ClassId.eq(class_id))
            .all(&self.db)
            .await
            .map_err(|e| ClassHubError::database_operation(format!("查询班级信息失败: {e}")))?
            .into_iter()
            .map(|m| (m.name, m.value))
            .collect();

        let members = ClassMembers::find()
            .filter(ClassMemberColumn::ClassId.eq(class_id))
            .order_by_asc(ClassMemberColumn::JoinedAt)
            .all(&self.db)
            .await
            .map_err(|e| ClassHubError::database_operation(format!("查询班级成员失败: {e}")))?;

        let mut teachers = Vec::new();
        let mut students = Vec::new();
        for member in members {
            let role = member.role.parse::<ClassRole>().unwrap_or(ClassRole::Student);
            if role.is_teacher_side() {
                teachers.push(member.user_id);
            } else {
                students.push(member.user_id);
            }
        }

        let class = class.into_class();
        Ok(Some(ClassDetail {
            id: class.id,
            name: class.name,
            description: class.description,
            member_count: class.member_count,
            required_fields,
            information,
            teachers,
            students,
            created_at: class.created_at,
        }))
    }

    /// 新增信息项，键已存在时返回 false
    pub async fn insert_class_info_impl(
        &self,
        class_id: &str,
        name: &str,
        value: &str,
    ) -> Result<bool> {
        let existing = ClassInfo::find()
            .filter(
                Condition::all()
                    .add(ClassInfoColumn::ClassId.eq(class_id))
                    .add(ClassInfoColumn::Name.eq(name)),
            )
            .one(&self.db)
            .await
            .map_err(|e| ClassHubError::database_operation(format!("查询班级信息失败: {e}")))?;

        if existing.is_some() {
            return Ok(false);
        }

        ClassInfoActiveModel {
            class_id: Set(class_id.to_string()),
            name: Set(name.to_string()),
            value: Set(value.to_string()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| ClassHubError::database_operation(format!("新增班级信息失败: {e}")))?;

        Ok(true)
    }

    /// 更新信息项，键不存在时返回 false
    pub async fn update_class_info_impl(
        &self,
        class_id: &str,
        name: &str,
        value: &str,
    ) -> Result<bool> {
        let result = ClassInfo::update_many()
            .col_expr(ClassInfoColumn::Value, Expr::value(value))
            .filter(
                Condition::all()
                    .add(ClassInfoColumn::ClassId.eq(class_id))
                    .add(ClassInfoColumn::Name.eq(name)),
            )
            .exec(&self.db)
            .await
            .map_err(|e| ClassHubError::database_operation(format!("更新班级信息失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 删除信息项，键不存在时返回 false
    pub async fn delete_class_info_impl(&self, class_id: &str, name: &str) -> Result<bool> {
        let result = ClassInfo::delete_many()
            .filter(
                Condition::all()
                    .add(ClassInfoColumn::ClassId.eq(class_id))
                    .add(ClassInfoColumn::Name.eq(name)),
            )
            .exec(&self.db)
            .await
            .map_err(|e| ClassHubError::database_operation(format!("删除班级信息失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
