//! Console rendering of history and status lines.

use crate::model::ChatMessage;
use chrono::Local;
use colored::{Color, Colorize};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Marker colour for `author`: the session's own identity and `system` are reserved.
pub fn author_color(author: &str, identity: &str) -> Color {
    if author.eq_ignore_ascii_case(identity) {
        Color::Green
    } else if author.eq_ignore_ascii_case("system") {
        Color::Red
    } else {
        Color::Yellow
    }
}

/// One history line without colour, e.g. ` (2024-05-01 09:30) Alexey> hi`.
pub fn format_message(message: &ChatMessage) -> String {
    format!(
        " ({}) {}> {}",
        message
            .created_at
            .with_timezone(&Local)
            .format(TIMESTAMP_FORMAT),
        message.author,
        message.text
    )
}

pub fn render_message(message: &ChatMessage, identity: &str) -> String {
    format_message(message)
        .color(author_color(&message.author, identity))
        .to_string()
}

pub fn history_header(channel: &str) -> String {
    format!("====== History for '{}' ======", channel)
        .green()
        .to_string()
}

pub fn history_footer() -> String {
    "============".green().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn reserved_authors_get_their_own_colour() {
        assert_eq!(author_color("Alexey", "Alexey"), Color::Green);
        assert_eq!(author_color("alexey", "Alexey"), Color::Green);
        assert_eq!(author_color("SYSTEM", "Alexey"), Color::Red);
        assert_eq!(author_color("Boris", "Alexey"), Color::Yellow);
        assert_eq!(author_color("Alexey", "Boris"), Color::Yellow);
    }

    #[test]
    fn message_line_shows_time_author_and_text() {
        let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let message = ChatMessage {
            author: "Alexey".into(),
            text: "hi".into(),
            created_at,
        };
        let expected_time = created_at.with_timezone(&Local).format(TIMESTAMP_FORMAT);

        assert_eq!(
            format_message(&message),
            format!(" ({}) Alexey> hi", expected_time)
        );
    }
}
