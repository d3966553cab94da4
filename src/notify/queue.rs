//! Toast display queue state machine.
//!
//! One message is on screen at a time. A message is shown for a fixed
//! duration (or until closed by hand), then hidden for a grace period so
//! the exit transition can play, then the next queued message is promoted.
//! The queue never drops, merges or reorders messages.
//!
//! The machine does no timing itself. Transitions that need a timer return
//! a [`Timer`]; the driver sleeps and feeds the matching `*_elapsed` call
//! back with the timer's sequence number. A timer for a message that is no
//! longer current is ignored.

use std::collections::VecDeque;
use std::time::Duration;

use crate::config::NotificationConfig;

use super::Toast;

/// A toast together with its position in the display order
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub seq: u64,
    pub toast: Toast,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum QueueState {
    #[default]
    Idle,
    Showing(Notification),
    Closing(Notification),
}

/// Timer the driver must arm after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    Display { seq: u64, after: Duration },
    Grace { seq: u64, after: Duration },
}

impl Timer {
    pub fn after(&self) -> Duration {
        match self {
            Timer::Display { after, .. } | Timer::Grace { after, .. } => *after,
        }
    }
}

#[derive(Debug)]
pub struct NotificationQueue {
    state: QueueState,
    backlog: VecDeque<Toast>,
    next_seq: u64,
    display: Duration,
    grace: Duration,
}

impl NotificationQueue {
    pub fn new(config: NotificationConfig) -> Self {
        Self {
            state: QueueState::Idle,
            backlog: VecDeque::new(),
            next_seq: 0,
            display: config.display(),
            grace: config.grace(),
        }
    }

    pub fn state(&self) -> &QueueState {
        &self.state
    }

    /// The message currently on screen or on its way out
    pub fn current(&self) -> Option<&Notification> {
        match &self.state {
            QueueState::Idle => None,
            QueueState::Showing(n) | QueueState::Closing(n) => Some(n),
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.state, QueueState::Showing(_))
    }

    /// Messages waiting behind the current one
    pub fn pending(&self) -> usize {
        self.backlog.len()
    }

    /// Queue a message; shows it immediately if nothing is on screen
    pub fn enqueue(&mut self, toast: Toast) -> Option<Timer> {
        self.backlog.push_back(toast);
        match self.state {
            QueueState::Idle => self.promote(),
            QueueState::Showing(_) | QueueState::Closing(_) => None,
        }
    }

    /// Manual close: skips the display timeout but keeps the grace delay
    pub fn dismiss(&mut self) -> Option<Timer> {
        self.begin_closing()
    }

    /// The display timer for `seq` fired
    pub fn display_elapsed(&mut self, seq: u64) -> Option<Timer> {
        if !matches!(&self.state, QueueState::Showing(n) if n.seq == seq) {
            return None;
        }
        self.begin_closing()
    }

    /// The grace timer for `seq` fired
    pub fn grace_elapsed(&mut self, seq: u64) -> Option<Timer> {
        if !matches!(&self.state, QueueState::Closing(n) if n.seq == seq) {
            return None;
        }
        self.state = QueueState::Idle;
        self.promote()
    }

    fn begin_closing(&mut self) -> Option<Timer> {
        match std::mem::take(&mut self.state) {
            QueueState::Showing(notification) => {
                let seq = notification.seq;
                self.state = QueueState::Closing(notification);
                Some(Timer::Grace {
                    seq,
                    after: self.grace,
                })
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    fn promote(&mut self) -> Option<Timer> {
        let toast = self.backlog.pop_front()?;
        let seq = self.next_seq;
        self.next_seq += 1;
        self.state = QueueState::Showing(Notification { seq, toast });
        Some(Timer::Display {
            seq,
            after: self.display,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue() -> NotificationQueue {
        NotificationQueue::new(NotificationConfig {
            display_ms: 1000,
            grace_ms: 200,
        })
    }

    fn current_message(queue: &NotificationQueue) -> Option<&str> {
        queue.current().map(|n| n.toast.message.as_str())
    }

    #[test]
    fn test_first_message_shows_immediately() {
        let mut queue = queue();
        let timer = queue.enqueue(Toast::error("A"));
        assert_eq!(
            timer,
            Some(Timer::Display {
                seq: 0,
                after: Duration::from_millis(1000)
            })
        );
        assert_eq!(current_message(&queue), Some("A"));
        assert!(queue.is_visible());
    }

    #[test]
    fn test_second_message_waits_for_timeout_and_grace() {
        let mut queue = queue();
        queue.enqueue(Toast::error("A"));
        assert_eq!(queue.enqueue(Toast::error("B")), None);
        assert_eq!(current_message(&queue), Some("A"));
        assert_eq!(queue.pending(), 1);

        let grace = queue.display_elapsed(0);
        assert_eq!(
            grace,
            Some(Timer::Grace {
                seq: 0,
                after: Duration::from_millis(200)
            })
        );
        // Hidden but still current until the grace delay ends
        assert!(!queue.is_visible());
        assert_eq!(current_message(&queue), Some("A"));

        let display = queue.grace_elapsed(0);
        assert!(matches!(display, Some(Timer::Display { seq: 1, .. })));
        assert_eq!(current_message(&queue), Some("B"));
        assert!(queue.is_visible());
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_manual_close_still_waits_for_grace() {
        let mut queue = queue();
        queue.enqueue(Toast::info("A"));
        queue.enqueue(Toast::info("B"));

        let timer = queue.dismiss();
        assert!(matches!(timer, Some(Timer::Grace { seq: 0, .. })));
        assert!(matches!(queue.state(), QueueState::Closing(_)));
        assert_eq!(current_message(&queue), Some("A"));

        // The original display timer firing late is ignored
        assert_eq!(queue.display_elapsed(0), None);
        assert!(matches!(queue.state(), QueueState::Closing(_)));

        queue.grace_elapsed(0);
        assert_eq!(current_message(&queue), Some("B"));
    }

    #[test]
    fn test_stale_timers_are_ignored() {
        let mut queue = queue();
        queue.enqueue(Toast::info("A"));
        queue.display_elapsed(0);
        queue.grace_elapsed(0);
        assert_eq!(queue.state(), &QueueState::Idle);

        queue.enqueue(Toast::info("B"));
        assert_eq!(queue.display_elapsed(0), None);
        assert_eq!(queue.grace_elapsed(0), None);
        assert_eq!(current_message(&queue), Some("B"));
        assert!(queue.is_visible());
    }

    #[test]
    fn test_duplicates_are_kept_in_order() {
        let mut queue = queue();
        for message in ["X", "X", "Y"] {
            queue.enqueue(Toast::error(message));
        }

        let mut shown = Vec::new();
        while let Some(notification) = queue.current().cloned() {
            shown.push(notification.toast.message.clone());
            queue.display_elapsed(notification.seq);
            queue.grace_elapsed(notification.seq);
        }
        assert_eq!(shown, vec!["X", "X", "Y"]);
        assert_eq!(queue.state(), &QueueState::Idle);
    }

    #[test]
    fn test_dismiss_when_idle_or_closing_does_nothing() {
        let mut queue = queue();
        assert_eq!(queue.dismiss(), None);
        queue.enqueue(Toast::info("A"));
        queue.dismiss();
        assert_eq!(queue.dismiss(), None);
    }
}
