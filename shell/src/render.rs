use todo_core::{Notification, TodoView};

const BAR_WIDTH: usize = 20;

/// Draw the whole list view as plain text.
pub fn render(view: &TodoView) -> String {
    let mut out = format!("Todo App\n{}\n\n", view.summary());

    if view.is_loading {
        out.push_str("  Loading...\n");
    } else if view.items.is_empty() {
        out.push_str("  No todos yet. Add one above!\n");
    }
    for (index, item) in view.items.iter().enumerate() {
        let mark = if item.completed { 'x' } else { ' ' };
        out.push_str(&format!("  {:>2}. [{mark}] {}\n", index + 1, item.title));
    }

    if let Some(percent) = view.progress_percent {
        let filled = usize::from(percent) * BAR_WIDTH / 100;
        out.push_str(&format!(
            "\nProgress [{}{}] {percent}%\n",
            "#".repeat(filled),
            "-".repeat(BAR_WIDTH - filled)
        ));
    }
    if !view.pending_title.is_empty() {
        out.push_str(&format!("Draft: {}\n", view.pending_title));
    }
    out
}

pub fn render_notification(note: &Notification) -> String {
    format!("[{}] {}", note.level, note.message)
}
