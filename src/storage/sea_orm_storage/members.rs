//! 班级成员存储操作

use super::SeaOrmStorage;
use crate::config::AppConfig;
use crate::entity::class_members::{Column as ClassMemberColumn, Entity as ClassMembers};
use crate::entity::classes::{Column as ClassColumn, Entity as Classes};
use crate::entity::prelude::{ClassMemberActiveModel, StudentFieldActiveModel};
use crate::entity::submission_files::{Column as SubmissionFileColumn, Entity as SubmissionFiles};
use crate::entity::submissions::{Column as SubmissionColumn, Entity as Submissions};
use crate::errors::{ClassHubError, Result};
use crate::models::{
    members::entities::{ClassMember, ClassRole, StudentField},
    users::entities::User,
};
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 获取用户在班级中的成员记录
    pub async fn get_member_impl(
        &self,
        user_id: i64,
        class_id: &str,
    ) -> Result<Option<ClassMember>> {
        let result = ClassMembers::find()
            .filter(
                Condition::all()
                    .add(ClassMemberColumn::UserId.eq(user_id))
                    .add(ClassMemberColumn::ClassId.eq(class_id)),
            )
            .one(&self.db)
            .await
            .map_err(|e| ClassHubError::database_operation(format!("查询班级成员失败: {e}")))?;

        Ok(result.map(|m| m.into_class_member()))
    }

    /// 加入班级
    ///
    /// 人数上限通过条件自增校验：UPDATE 只在 member_count 未达上限时命中，
    /// rows_affected 为 0 即满员，避免并发加入时超员。满员返回 Ok(None)。
    pub async fn join_class_impl(
        &self,
        user: &User,
        class_id: &str,
        role: ClassRole,
        headline: Option<String>,
        information: Vec<StudentField>,
    ) -> Result<Option<ClassMember>> {
        let config = AppConfig::get();
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ClassHubError::database_operation(format!("开启事务失败: {e}")))?;

        let updated = Classes::update_many()
            .col_expr(
                ClassColumn::MemberCount,
                Expr::col(ClassColumn::MemberCount).add(1),
            )
            .col_expr(ClassColumn::UpdatedAt, Expr::value(now))
            .filter(
                Condition::all()
                    .add(ClassColumn::Id.eq(class_id))
                    .add(ClassColumn::MemberCount.lt(config.classroom.max_members)),
            )
            .exec(&txn)
            .await
            .map_err(|e| ClassHubError::database_operation(format!("更新班级人数失败: {e}")))?;

        if updated.rows_affected == 0 {
            txn.rollback()
                .await
                .map_err(|e| ClassHubError::database_operation(format!("回滚事务失败: {e}")))?;
            return Ok(None);
        }

        let member = ClassMemberActiveModel {
            class_id: Set(class_id.to_string()),
            user_id: Set(user.id),
            role: Set(role.to_string()),
            display_name: Set(Some(user.member_display_name())),
            headline: Set(headline),
            joined_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| ClassHubError::database_operation(format!("创建成员记录失败: {e}")))?;

        for field in &information {
            StudentFieldActiveModel {
                member_id: Set(member.id),
                name: Set(field.name.clone()),
                value: Set(field.value.clone()),
                priority: Set(field.priority),
                required: Set(field.required),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| ClassHubError::database_operation(format!("写入学生信息失败: {e}")))?;
        }

        txn.commit()
            .await
            .map_err(|e| ClassHubError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(Some(member.into_class_member()))
    }

    /// 移除成员
    ///
    /// 成员记录、学生信息、提交记录在同一事务内删除（学生信息和提交文件行
    /// 依赖外键级联），提交文件的磁盘路径收集后返回给调用方执行 unlink。
    pub async fn remove_member_impl(&self, member: &ClassMember) -> Result<Vec<String>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| ClassHubError::database_operation(format!("开启事务失败: {e}")))?;

        let mut file_paths = Vec::new();

        if member.role == ClassRole::Student {
            let submissions = Submissions::find()
                .filter(
                    Condition::all()
                        .add(SubmissionColumn::ClassId.eq(member.class_id.as_str()))
                        .add(SubmissionColumn::StudentId.eq(member.user_id)),
                )
                .all(&txn)
                .await
                .map_err(|e| {
                    ClassHubError::database_operation(format!("查询提交记录失败: {e}"))
                })?;

            let submission_ids: Vec<i64> = submissions.iter().map(|s| s.id).collect();
            if !submission_ids.is_empty() {
                // 先收集路径再删除，行没了路径也就找不回来了
                file_paths = SubmissionFiles::find()
                    .filter(SubmissionFileColumn::SubmissionId.is_in(submission_ids.clone()))
                    .all(&txn)
                    .await
                    .map_err(|e| {
                        ClassHubError::database_operation(format!("查询提交文件失败: {e}"))
                    })?
                    .into_iter()
                    .map(|f| f.path)
                    .collect();

                Submissions::delete_many()
                    .filter(SubmissionColumn::Id.is_in(submission_ids))
                    .exec(&txn)
                    .await
                    .map_err(|e| {
                        ClassHubError::database_operation(format!("删除提交记录失败: {e}"))
                    })?;
            }
        }

        ClassMembers::delete_by_id(member.id)
            .exec(&txn)
            .await
            .map_err(|e| ClassHubError::database_operation(format!("删除成员记录失败: {e}")))?;

        Classes::update_many()
            .col_expr(
                ClassColumn::MemberCount,
                Expr::col(ClassColumn::MemberCount).sub(1),
            )
            .col_expr(
                ClassColumn::UpdatedAt,
                Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(ClassColumn::Id.eq(member.class_id.as_str()))
            .exec(&txn)
            .await
            .map_err(|e| ClassHubError::database_operation(format!("更新班级人数失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| ClassHubError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(file_paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::prelude::{
        AssignmentActiveModel, StudentFields, SubmissionActiveModel, SubmissionFileActiveModel,
        UserActiveModel,
    };
    use crate::models::users::entities::User;

    async fn storage() -> SeaOrmStorage {
        SeaOrmStorage::new_in_memory().await.unwrap()
    }

    async fn seed_user(storage: &SeaOrmStorage, username: &str) -> User {
        UserActiveModel {
            username: Set(username.to_string()),
            display_name: Set(None),
            status: Set("active".to_string()),
            created_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        }
        .insert(&storage.db)
        .await
        .unwrap()
        .into_user()
    }

    async fn set_member_count(storage: &SeaOrmStorage, class_id: &str, count: i64) {
        Classes::update_many()
            .col_expr(ClassColumn::MemberCount, Expr::value(count))
            .filter(ClassColumn::Id.eq(class_id))
            .exec(&storage.db)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_join_increments_member_count() {
        let storage = storage().await;
        let admin = seed_user(&storage, "admin").await;
        let detail = storage
            .create_class_impl(&admin, "math", None, vec![])
            .await
            .unwrap();

        let student = seed_user(&storage, "stu").await;
        let member = storage
            .join_class_impl(&student, &detail.id, ClassRole::Student, None, vec![])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(member.role, ClassRole::Student);
        assert_eq!(member.user_id, student.id);

        let class = storage
            .get_class_by_id_impl(&detail.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(class.member_count, 2);
    }

    #[tokio::test]
    async fn test_join_rejected_when_class_full() {
        let storage = storage().await;
        let admin = seed_user(&storage, "admin").await;
        let detail = storage
            .create_class_impl(&admin, "math", None, vec![])
            .await
            .unwrap();
        let max = AppConfig::get().classroom.max_members;

        // 上限边界：差一个名额时还能进
        set_member_count(&storage, &detail.id, max - 1).await;
        let last_seat = seed_user(&storage, "last").await;
        assert!(
            storage
                .join_class_impl(&last_seat, &detail.id, ClassRole::Student, None, vec![])
                .await
                .unwrap()
                .is_some()
        );

        // 满员后条件自增不命中，加入被拒且计数不越界
        let late = seed_user(&storage, "late").await;
        assert!(
            storage
                .join_class_impl(&late, &detail.id, ClassRole::Student, None, vec![])
                .await
                .unwrap()
                .is_none()
        );
        let class = storage
            .get_class_by_id_impl(&detail.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(class.member_count, max);
        assert!(
            storage
                .get_member_impl(late.id, &detail.id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_duplicate_join_hits_unique_index() {
        let storage = storage().await;
        let admin = seed_user(&storage, "admin").await;
        let detail = storage
            .create_class_impl(&admin, "math", None, vec![])
            .await
            .unwrap();

        let student = seed_user(&storage, "stu").await;
        storage
            .join_class_impl(&student, &detail.id, ClassRole::Student, None, vec![])
            .await
            .unwrap()
            .unwrap();

        // (class_id, user_id) 唯一索引拦下重复加入，事务回滚后计数不变
        assert!(
            storage
                .join_class_impl(&student, &detail.id, ClassRole::Student, None, vec![])
                .await
                .is_err()
        );
        let class = storage
            .get_class_by_id_impl(&detail.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(class.member_count, 2);
    }

    #[tokio::test]
    async fn test_remove_student_cascades_submissions() {
        let storage = storage().await;
        let admin = seed_user(&storage, "admin").await;
        let detail = storage
            .create_class_impl(&admin, "math", None, vec![])
            .await
            .unwrap();
        let student = seed_user(&storage, "stu").await;
        storage
            .join_class_impl(
                &student,
                &detail.id,
                ClassRole::Student,
                Some("studentid".to_string()),
                vec![StudentField {
                    name: "studentid".to_string(),
                    value: "2025001".to_string(),
                    priority: 1,
                    required: true,
                }],
            )
            .await
            .unwrap()
            .unwrap();

        let now = chrono::Utc::now().timestamp();
        let assignment = AssignmentActiveModel {
            class_id: Set(detail.id.clone()),
            title: Set("hw1".to_string()),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&storage.db)
        .await
        .unwrap();
        let submission = SubmissionActiveModel {
            assignment_id: Set(assignment.id),
            class_id: Set(detail.id.clone()),
            student_id: Set(student.id),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&storage.db)
        .await
        .unwrap();
        SubmissionFileActiveModel {
            submission_id: Set(submission.id),
            file_name: Set("report.pdf".to_string()),
            path: Set("c1/report.pdf".to_string()),
            ..Default::default()
        }
        .insert(&storage.db)
        .await
        .unwrap();

        let member = storage
            .get_member_impl(student.id, &detail.id)
            .await
            .unwrap()
            .unwrap();
        let paths = storage.remove_member_impl(&member).await.unwrap();
        assert_eq!(paths, vec!["c1/report.pdf".to_string()]);

        // 成员、学生信息、提交与文件行全部随事务消失，计数回落
        assert!(
            storage
                .get_member_impl(student.id, &detail.id)
                .await
                .unwrap()
                .is_none()
        );
        assert!(Submissions::find().all(&storage.db).await.unwrap().is_empty());
        assert!(
            SubmissionFiles::find()
                .all(&storage.db)
                .await
                .unwrap()
                .is_empty()
        );
        assert!(
            StudentFields::find()
                .all(&storage.db)
                .await
                .unwrap()
                .is_empty()
        );
        let class = storage
            .get_class_by_id_impl(&detail.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(class.member_count, 1);
    }

    #[tokio::test]
    async fn test_remove_student_without_submissions() {
        let storage = storage().await;
        let admin = seed_user(&storage, "admin").await;
        let detail = storage
            .create_class_impl(&admin, "math", None, vec![])
            .await
            .unwrap();
        let student = seed_user(&storage, "stu").await;
        storage
            .join_class_impl(&student, &detail.id, ClassRole::Student, None, vec![])
            .await
            .unwrap()
            .unwrap();

        let member = storage
            .get_member_impl(student.id, &detail.id)
            .await
            .unwrap()
            .unwrap();
        let paths = storage.remove_member_impl(&member).await.unwrap();
        assert!(paths.is_empty());

        let class = storage
            .get_class_by_id_impl(&detail.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(class.member_count, 1);
    }
}
