//! One interactive session: routes intents to the synchronization component
//! and produces the text to show after each one.

use todo_core::{ItemStore, NotificationLog, TodoSync, TracingNotifier};
use tracing::debug;

use crate::intent::{self, Intent, HELP};
use crate::render::{render, render_notification};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Notifications are queued for the next screen and also written to the log.
pub type ShellNotifier = (NotificationLog, TracingNotifier);

pub struct Session<S> {
    sync: TodoSync<S, ShellNotifier>,
}

impl<S: ItemStore> Session<S> {
    pub fn new(sync: TodoSync<S, ShellNotifier>) -> Self {
        Self { sync }
    }

    /// Load the collection once and draw the first screen.
    pub async fn start(&self) -> String {
        self.sync.initialize().await;
        self.screen()
    }

    pub async fn handle_line(&self, line: &str) -> (Flow, String) {
        let intent = match intent::parse(line) {
            Ok(intent) => intent,
            Err(e) => return (Flow::Continue, format!("{e}\n")),
        };
        debug!(?intent, "handling intent");

        match intent {
            Intent::Submit(text) => {
                self.sync.set_pending_title(text);
                self.sync.submit().await;
            }
            Intent::Toggle(position) => match self.item_at(position) {
                Some(item) => self.sync.toggle_item(&item).await,
                None => return (Flow::Continue, format!("No item #{position}\n")),
            },
            Intent::Delete(position) => match self.item_at(position) {
                Some(item) => self.sync.delete_item(item.id).await,
                None => return (Flow::Continue, format!("No item #{position}\n")),
            },
            Intent::Refresh => self.sync.refresh().await,
            Intent::Help => return (Flow::Continue, format!("{HELP}\n")),
            Intent::Quit => return (Flow::Quit, String::new()),
        }
        (Flow::Continue, self.screen())
    }

    pub fn sync(&self) -> &TodoSync<S, ShellNotifier> {
        &self.sync
    }

    fn item_at(&self, position: usize) -> Option<todo_core::Item> {
        self.sync.items().get(position.checked_sub(1)?).cloned()
    }

    /// Pending notifications followed by the current view.
    fn screen(&self) -> String {
        let mut out = String::new();
        for note in self.sync.notifier().0.drain() {
            out.push_str(&render_notification(&note));
            out.push('\n');
        }
        out.push_str(&render(&self.sync.view()));
        out
    }
}
