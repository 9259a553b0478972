//! 班级必填字段实体（学生加入时必须提交的字段模板）

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "class_fields")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub class_id: String,
    pub name: String,
    pub priority: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::classes::Entity",
        from = "Column::ClassId",
        to = "super::classes::Column::Id"
    )]
    Class,
}

impl Related<super::classes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Class.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_required_field(self) -> crate::models::classes::entities::RequiredField {
        crate::models::classes::entities::RequiredField {
            name: self.name,
            priority: self.priority,
        }
    }
}
