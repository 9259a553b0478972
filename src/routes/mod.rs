pub mod classroom;

pub use classroom::configure_classroom_routes;
