use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

/// Emitted after the value under `key` was replaced or removed.
///
/// Carries no payload beyond the key; subscribers re-read the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyChanged {
    pub key: String,
}

/// Process-scoped publish/subscribe registry keyed by storage key.
#[derive(Debug, Default)]
pub struct ChangeNotifier {
    subscribers: Mutex<Vec<(String, Sender<KeyChanged>)>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber for `key`.
    pub fn subscribe(&self, key: &str) -> Receiver<KeyChanged> {
        let (tx, rx) = mpsc::channel();
        match self.subscribers.lock() {
            Ok(mut subs) => subs.push((key.to_string(), tx)),
            Err(poisoned) => poisoned.into_inner().push((key.to_string(), tx)),
        }
        rx
    }

    /// Deliver one event to every live subscriber of `key`.
    ///
    /// Best effort: subscribers whose receiver was dropped are pruned.
    pub fn notify(&self, key: &str) {
        let mut subs = match self.subscribers.lock() {
            Ok(subs) => subs,
            Err(poisoned) => poisoned.into_inner(),
        };
        subs.retain(|(sub_key, tx)| {
            if sub_key != key {
                return true;
            }
            tx.send(KeyChanged {
                key: key.to_string(),
            })
            .is_ok()
        });
        tracing::trace!(key, subscribers = subs.len(), "change broadcast");
    }

    /// Number of registered subscribers (live or not yet pruned).
    pub fn subscriber_count(&self) -> usize {
        match self.subscribers.lock() {
            Ok(subs) => subs.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_reaches_only_matching_key() {
        let notifier = ChangeNotifier::new();
        let profiles = notifier.subscribe("profiles");
        let other = notifier.subscribe("other");

        notifier.notify("profiles");

        assert_eq!(
            profiles.try_recv().unwrap(),
            KeyChanged {
                key: "profiles".into()
            }
        );
        assert!(other.try_recv().is_err());
    }

    #[test]
    fn dropped_receivers_are_pruned() {
        let notifier = ChangeNotifier::new();
        let kept = notifier.subscribe("k");
        drop(notifier.subscribe("k"));
        assert_eq!(notifier.subscriber_count(), 2);

        notifier.notify("k");
        assert_eq!(notifier.subscriber_count(), 1);
        assert!(kept.try_recv().is_ok());
    }
}
