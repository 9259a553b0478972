//! 学生信息实体（加入班级时按必填字段模板提交）

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "student_fields")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub member_id: i64,
    pub name: String,
    pub value: String,
    pub priority: i32,
    pub required: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::class_members::Entity",
        from = "Column::MemberId",
        to = "super::class_members::Column::Id"
    )]
    Member,
}

impl Related<super::class_members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_student_field(self) -> crate::models::members::entities::StudentField {
        crate::models::members::entities::StudentField {
            name: self.name,
            value: self.value,
            priority: self.priority,
            required: self.required,
        }
    }
}
