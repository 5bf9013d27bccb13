//! Plain-text rendering of store state.

use shared::{domain::Reminder, protocol::HealthResponse};

const HEADERS: [&str; 3] = ["User ID", "Text", "Scheduled Time"];

pub fn render_created(reminder: &Reminder) -> String {
    format!(
        "Scheduled successfully\n  User ID:        {}\n  Text:           {}\n  Scheduled Time: {}",
        reminder.user_id, reminder.original_text, reminder.scheduled_time
    )
}

/// Table of the first `limit` reminders (all when `None`).
pub fn render_table(reminders: &[Reminder], limit: Option<usize>) -> String {
    let shown = &reminders[..limit.unwrap_or(reminders.len()).min(reminders.len())];
    let rows: Vec<[String; 3]> = shown
        .iter()
        .map(|r| {
            [
                r.user_id.to_string(),
                r.original_text.clone(),
                r.scheduled_time.clone(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|header| header.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = vec![format_row(&HEADERS.map(str::to_string), &widths)];
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    lines.extend(rows.iter().map(|row| format_row(row, &widths)));
    if shown.len() < reminders.len() {
        lines.push(format!("({} of {} shown)", shown.len(), reminders.len()));
    }
    lines.join("\n")
}

fn format_row(cells: &[String; 3], widths: &[usize; 3]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

pub fn render_health(health: &HealthResponse) -> String {
    match &health.message {
        Some(message) => format!("Backend status: {} ({message})", health.status),
        None => format!("Backend status: {}", health.status),
    }
}

#[cfg(test)]
mod tests {
    use shared::domain::UserId;

    use super::*;

    fn reminder(user_id: i64, text: &str, time: &str) -> Reminder {
        Reminder {
            user_id: UserId(user_id),
            original_text: text.into(),
            scheduled_time: time.into(),
        }
    }

    #[test]
    fn created_reminder_shows_all_three_fields() {
        let rendered = render_created(&reminder(
            1,
            "remind me to call mom tomorrow at 10am",
            "2024-01-02T10:00:00",
        ));
        assert!(rendered.contains("User ID:        1"));
        assert!(rendered.contains("Text:           remind me to call mom tomorrow at 10am"));
        assert!(rendered.contains("Scheduled Time: 2024-01-02T10:00:00"));
    }

    #[test]
    fn table_aligns_columns() {
        let table = render_table(&[reminder(1, "call mom", "t1"), reminder(22, "x", "t2")], None);
        assert_eq!(
            table,
            "User ID | Text     | Scheduled Time\n\
             --------+----------+---------------\n\
             1       | call mom | t1\n\
             22      | x        | t2"
        );
    }

    #[test]
    fn table_respects_limit() {
        let reminders: Vec<_> = (1..=7).map(|i| reminder(i, "r", "t")).collect();
        let table = render_table(&reminders, Some(5));
        assert_eq!(table.lines().count(), 2 + 5 + 1);
        assert!(table.ends_with("(5 of 7 shown)"));
    }

    #[test]
    fn health_includes_message_when_present() {
        let health = HealthResponse {
            status: "ok".into(),
            message: Some("working fine".into()),
        };
        assert_eq!(render_health(&health), "Backend status: ok (working fine)");
    }
}
