//! Notification drafts for common StaffHub events.
//!
//! Producers (attendance, tasks, announcements) call these so titles, kinds
//! and payload keys stay consistent across the application.

use chrono::{DateTime, Utc};

use staffhub_core::types::UserId;

use crate::message::builder::NotificationBuilder;
use crate::message::types::{NotificationDraft, NotificationKind, Severity};

/// Formats notification drafts for common events.
pub struct NotificationFormatter;

impl NotificationFormatter {
    /// An employee checked in. A positive `late_minutes` raises the severity
    /// to warning.
    pub fn attendance_check_in(
        employee_id: UserId,
        employee_name: &str,
        at: DateTime<Utc>,
        late_minutes: i64,
    ) -> NotificationDraft {
        let (body, severity) = if late_minutes > 0 {
            (
                format!(
                    "{employee_name} checked in at {} ({late_minutes} min late)",
                    at.format("%H:%M")
                ),
                Severity::Warning,
            )
        } else {
            (
                format!("{employee_name} checked in at {}", at.format("%H:%M")),
                Severity::Info,
            )
        };

        NotificationBuilder::new("Check-in", body)
            .kind(NotificationKind::AttendanceUpdate)
            .severity(severity)
            .data("employeeId", employee_id)
            .data("checkIn", at)
            .data("lateMinutes", late_minutes.max(0))
            .build()
    }

    /// An employee checked out after `worked_minutes`, of which
    /// `overtime_minutes` count as overtime.
    pub fn attendance_check_out(
        employee_id: UserId,
        employee_name: &str,
        at: DateTime<Utc>,
        worked_minutes: i64,
        overtime_minutes: i64,
    ) -> NotificationDraft {
        let mut body = format!(
            "{employee_name} checked out at {} after {}h{:02}m",
            at.format("%H:%M"),
            worked_minutes / 60,
            worked_minutes % 60
        );
        if overtime_minutes > 0 {
            body.push_str(&format!(" ({overtime_minutes} min overtime)"));
        }

        NotificationBuilder::new("Check-out", body)
            .kind(NotificationKind::AttendanceUpdate)
            .severity(Severity::Success)
            .data("employeeId", employee_id)
            .data("checkOut", at)
            .data("workedMinutes", worked_minutes)
            .data("overtimeMinutes", overtime_minutes.max(0))
            .build()
    }

    /// A task was assigned to `assignee`.
    pub fn task_assigned(
        assignee: UserId,
        task_id: &str,
        task_title: &str,
        assigned_by: &str,
    ) -> NotificationDraft {
        NotificationBuilder::new(
            "New task assigned",
            format!("{assigned_by} assigned you '{task_title}'"),
        )
        .kind(NotificationKind::TaskUpdate)
        .target(assignee)
        .data("taskId", task_id)
        .data("assignedBy", assigned_by)
        .build()
    }

    /// A task moved to a new status.
    pub fn task_status_changed(
        task_id: &str,
        task_title: &str,
        status: &str,
        changed_by: &str,
    ) -> NotificationDraft {
        let severity = match status.to_ascii_lowercase().as_str() {
            "done" | "completed" => Severity::Success,
            "blocked" | "overdue" => Severity::Warning,
            "cancelled" => Severity::Error,
            _ => Severity::Info,
        };

        NotificationBuilder::new(
            "Task updated",
            format!("{changed_by} moved '{task_title}' to {status}"),
        )
        .kind(NotificationKind::TaskUpdate)
        .severity(severity)
        .data("taskId", task_id)
        .data("status", status)
        .build()
    }

    /// A general announcement.
    pub fn announcement(title: &str, body: &str, severity: Severity) -> NotificationDraft {
        NotificationBuilder::new(title, body)
            .kind(NotificationKind::Notification)
            .severity(severity)
            .build()
    }
}
