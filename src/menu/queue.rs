//! The navigation queue of pending input lines

use std::collections::VecDeque;

/// Pending input lines, consumed one per engine step.
///
/// Shared by every menu on the stack; it survives entering and leaving
/// submenus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandQueue {
    lines: VecDeque<String>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `lines` at the front, keeping their order
    pub fn push_front_all<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        for line in lines.into_iter().rev() {
            self.lines.push_front(line);
        }
        debug!("Queue: {:?}", self.lines);
    }

    pub fn push_front(&mut self, line: impl Into<String>) {
        self.lines.push_front(line.into());
        debug!("Queue: {:?}", self.lines);
    }

    /// Append `lines` at the back
    pub fn extend<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
        debug!("Queue: {:?}", self.lines);
    }

    pub fn pop_front(&mut self) -> Option<String> {
        let line = self.lines.pop_front();
        if line.is_some() {
            debug!("Queue: {:?}", self.lines);
        }
        line
    }

    pub fn front(&self) -> Option<&str> {
        self.lines.front().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Remove and return everything still queued
    pub fn drain(&mut self) -> Vec<String> {
        self.lines.drain(..).collect()
    }
}
