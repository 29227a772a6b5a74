use crate::database::entities::TaskStatus;

/// Maps free status text from the sheet onto a task status.
///
/// Matching is trimmed and case-insensitive over the canonical names and
/// their Russian labels. Blank or unknown text means NOT_STARTED.
pub fn resolve_status(text: Option<&str>) -> TaskStatus {
    let normalized = match text {
        Some(text) => text.trim().to_uppercase(),
        None => return TaskStatus::NotStarted,
    };

    match normalized.as_str() {
        "NOT_STARTED" | "НЕ НАЧАТА" => TaskStatus::NotStarted,
        "IN_PROGRESS" | "В РАБОТЕ" => TaskStatus::InProgress,
        "COMPLETED" | "ЗАВЕРШЕНА" => TaskStatus::Completed,
        "ON_HOLD" | "ПРИОСТАНОВЛЕНА" => TaskStatus::OnHold,
        "CANCELLED" | "ОТМЕНЕНА" => TaskStatus::Cancelled,
        _ => TaskStatus::NotStarted,
    }
}
