//! User-facing notices from the command handlers.

use std::cell::RefCell;
use yansi::Paint;

/// Fire-and-forget user notices.
pub trait Notifier {
    fn notify(&self, message: &str);
}

/// Prints notices to stdout.
pub struct ConsoleNotifier {
    use_color: bool,
}

impl ConsoleNotifier {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var("NO_COLOR").is_err())
    }

    fn render(&self, message: &str) -> String {
        if self.use_color {
            Paint::rgb(message, 148, 226, 213).to_string()
        } else {
            message.to_string()
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        println!("{}", self.render(message));
    }
}

/// Keeps every notice in memory.
#[derive(Default)]
pub struct MemoryNotifier {
    messages: RefCell<Vec<String>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.messages.borrow().last().cloned()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}
