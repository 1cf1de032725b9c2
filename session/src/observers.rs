//! Synchronous tension observer registry.

use std::{collections::BTreeMap, fmt};

/// Notification delivered to tension observers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TensionSignal {
    /// Tension changed to the carried value.
    Changed(f32),
    /// Tension reached the event threshold outside its cooldown.
    ThresholdReached(f32),
}

/// Handle returned by [`TensionObservers::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl ObserverId {
    /// Numeric value of the handle.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

type Callback = Box<dyn FnMut(TensionSignal)>;

/// Observers notified in subscription order.
#[derive(Default)]
pub struct TensionObservers {
    next_id: u64,
    callbacks: BTreeMap<ObserverId, Callback>,
}

impl TensionObservers {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` and returns the handle that removes it again.
    pub fn subscribe(&mut self, callback: impl FnMut(TensionSignal) + 'static) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let _ = self.callbacks.insert(id, Box::new(callback));
        id
    }

    /// Removes the observer; `false` when the handle was unknown.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.callbacks.remove(&id).is_some()
    }

    /// Delivers `signal` to every observer.
    pub fn notify(&mut self, signal: TensionSignal) {
        for callback in self.callbacks.values_mut() {
            callback(signal);
        }
    }

    /// Number of registered observers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Reports whether nobody is listening.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl fmt::Debug for TensionObservers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TensionObservers")
            .field("observers", &self.callbacks.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    #[test]
    fn unsubscribed_observers_stop_receiving() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut observers = TensionObservers::new();

        let first = {
            let seen = Rc::clone(&seen);
            observers.subscribe(move |signal| seen.borrow_mut().push((1, signal)))
        };
        let _second = {
            let seen = Rc::clone(&seen);
            observers.subscribe(move |signal| seen.borrow_mut().push((2, signal)))
        };

        observers.notify(TensionSignal::Changed(4.0));
        assert!(observers.unsubscribe(first));
        assert!(!observers.unsubscribe(first));
        observers.notify(TensionSignal::ThresholdReached(80.0));

        assert_eq!(
            *seen.borrow(),
            vec![
                (1, TensionSignal::Changed(4.0)),
                (2, TensionSignal::Changed(4.0)),
                (2, TensionSignal::ThresholdReached(80.0)),
            ]
        );
        assert_eq!(observers.len(), 1);
    }
}
