//! Change notification for views that present gradebook data.
//!
//! Observers receive no payload. After being told something changed they
//! re-query the course or registry accessors. Notification is synchronous and
//! happens in registration order before the mutating call returns.

use std::fmt;
use std::rc::Rc;

/// Something that wants to hear about mutations.
pub trait Observer {
    fn update(&self);
}

impl<F: Fn()> Observer for F {
    fn update(&self) {
        self()
    }
}

/// Token returned by [`ObserverList::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverHandle(u64);

/// Registered observers of one subject, kept in registration order.
#[derive(Default)]
pub struct ObserverList {
    entries: Vec<(ObserverHandle, Rc<dyn Observer>)>,
    next_id: u64,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer. Registering the same `Rc` twice returns the
    /// existing handle instead of adding a second entry.
    pub fn subscribe(&mut self, observer: Rc<dyn Observer>) -> ObserverHandle {
        if let Some((handle, _)) = self
            .entries
            .iter()
            .find(|(_, existing)| Rc::ptr_eq(existing, &observer))
        {
            return *handle;
        }
        let handle = ObserverHandle(self.next_id);
        self.next_id += 1;
        self.entries.push((handle, observer));
        handle
    }

    /// Remove an observer. Returns `false` if the handle was not registered.
    pub fn unsubscribe(&mut self, handle: ObserverHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(h, _)| *h != handle);
        self.entries.len() != before
    }

    pub fn notify(&self) {
        for (_, observer) in &self.entries {
            observer.update();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverList")
            .field("observers", &self.entries.len())
            .finish()
    }
}
