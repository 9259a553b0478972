//! 预导入模块，方便使用

pub use super::assignments::{
    ActiveModel as AssignmentActiveModel, Entity as Assignments, Model as AssignmentModel,
};
pub use super::class_fields::{
    ActiveModel as ClassFieldActiveModel, Entity as ClassFields, Model as ClassFieldModel,
};
pub use super::class_info::{
    ActiveModel as ClassInfoActiveModel, Entity as ClassInfo, Model as ClassInfoModel,
};
pub use super::class_members::{
    ActiveModel as ClassMemberActiveModel, Entity as ClassMembers, Model as ClassMemberModel,
};
pub use super::classes::{ActiveModel as ClassActiveModel, Entity as Classes, Model as ClassModel};
pub use super::invites::{ActiveModel as InviteActiveModel, Entity as Invites, Model as InviteModel};
pub use super::student_fields::{
    ActiveModel as StudentFieldActiveModel, Entity as StudentFields, Model as StudentFieldModel,
};
pub use super::submission_files::{
    ActiveModel as SubmissionFileActiveModel, Entity as SubmissionFiles,
    Model as SubmissionFileModel,
};
pub use super::submissions::{
    ActiveModel as SubmissionActiveModel, Entity as Submissions, Model as SubmissionModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
