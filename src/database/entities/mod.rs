pub mod divisions;
pub mod goals;
pub mod reports;
pub mod task_reports;
pub mod tasks;
pub mod users;

pub use tasks::TaskStatus;
pub use users::UserRole;
