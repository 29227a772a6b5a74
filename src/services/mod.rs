pub mod division_service;
pub mod goal_service;
pub mod report_service;
pub mod task_import;
pub mod task_report_service;
pub mod task_service;
pub mod user_service;

pub use division_service::*;
pub use goal_service::*;
pub use report_service::*;
pub use task_import::{ImportResult, TaskImportService, TaskImporter};
pub use task_report_service::*;
pub use task_service::*;
pub use user_service::*;
