pub mod classes;
pub mod invites;
pub mod members;
pub mod users;
