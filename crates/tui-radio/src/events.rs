//! Event channel — title events flowing from the output reader to the UI.
//!
//! An unbounded FIFO: pushing never blocks the reader task, and the UI drains
//! whatever is queued once per tick without waiting for more.

use tokio::sync::mpsc::{self, error::TryRecvError};

/// Producer half handed to an output reader task. Cheap to clone.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<String>,
}

impl EventSender {
    /// Queue a title. Returns `false` if the channel is gone.
    pub fn push(&self, title: String) -> bool {
        self.tx.send(title).is_ok()
    }
}

/// Consumer half, owned by the application loop.
#[derive(Debug)]
pub struct EventChannel {
    tx: mpsc::UnboundedSender<String>,
    rx: mpsc::UnboundedReceiver<String>,
}

impl EventChannel {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    pub fn sender(&self) -> EventSender {
        EventSender {
            tx: self.tx.clone(),
        }
    }

    /// Take every queued event in arrival order, leaving the queue empty.
    /// Returns immediately, possibly with nothing.
    pub fn drain_available(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(title) => out.push(title),
                // The channel holds its own sender, so it never disconnects.
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        out
    }

    /// Discard everything queued. Returns how many events were dropped.
    pub fn clear(&mut self) -> usize {
        self.drain_available().len()
    }
}

impl Default for EventChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_returns_fifo_order_and_empties() {
        let mut ch = EventChannel::new();
        let tx = ch.sender();
        assert!(tx.push("a".into()));
        assert!(tx.push("b".into()));
        assert!(tx.push("c".into()));
        assert_eq!(ch.drain_available(), vec!["a", "b", "c"]);
        assert!(ch.drain_available().is_empty());
    }

    #[test]
    fn drain_on_empty_does_not_block() {
        let mut ch = EventChannel::new();
        assert!(ch.drain_available().is_empty());
    }

    #[test]
    fn clear_discards_pending_events() {
        let mut ch = EventChannel::new();
        let tx = ch.sender();
        tx.push("stale 1".into());
        tx.push("stale 2".into());
        assert_eq!(ch.clear(), 2);
        tx.push("fresh".into());
        assert_eq!(ch.drain_available(), vec!["fresh"]);
    }

    #[test]
    fn push_after_channel_dropped_reports_failure() {
        let ch = EventChannel::new();
        let tx = ch.sender();
        drop(ch);
        assert!(!tx.push("orphan".into()));
    }

    #[test]
    fn concurrent_producers_are_all_delivered() {
        let mut ch = EventChannel::new();
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let tx = ch.sender();
                std::thread::spawn(move || {
                    for i in 0..100 {
                        tx.push(format!("{t}-{i}"));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let got = ch.drain_available();
        assert_eq!(got.len(), 400);
        // Per-producer order is preserved.
        for t in 0..4 {
            let prefix = format!("{t}-");
            let seq: Vec<usize> = got
                .iter()
                .filter_map(|s| s.strip_prefix(&prefix))
                .map(|n| n.parse().unwrap())
                .collect();
            assert_eq!(seq, (0..100).collect::<Vec<_>>());
        }
    }
}
