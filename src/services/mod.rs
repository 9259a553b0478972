pub mod classes;
pub mod invites;
pub mod members;

pub use classes::ClassService;
pub use invites::InviteService;
pub use members::MemberService;
