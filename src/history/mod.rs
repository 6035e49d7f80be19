use crate::models::chat::{ Message, Role };

/// The last `window` messages of `history`.
pub fn recent_history(history: &[Message], window: usize) -> &[Message] {
    let start = history.len().saturating_sub(window);
    &history[start..]
}

pub fn format_history_for_prompt(history: &[Message]) -> String {
    history
        .iter()
        .map(|msg| {
            let role_display = match msg.role {
                Role::User => "Student",
                Role::Assistant => "Instructor",
            };
            format!("{}: {}", role_display, msg.text)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
