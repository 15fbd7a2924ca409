//! Typed listener lists with ordered, synchronous delivery
//!
//! A model owns one `Publisher` per event type. Listeners receive the
//! emitting model by shared reference, so they can read it but can't mutate
//! it while the notification is being delivered.

/// Handle returned by [`Publisher::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<S, E> = Box<dyn FnMut(&S, &E)>;

pub struct Publisher<S: ?Sized, E> {
    listeners: Vec<(ListenerId, Listener<S, E>)>,
    next_id: u64,
}

impl<S: ?Sized, E> Publisher<S, E> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Register a listener; listeners are called in subscription order
    pub fn subscribe(&mut self, listener: impl FnMut(&S, &E) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver `event` to every listener, in order
    pub fn notify(&mut self, source: &S, event: &E) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(source, event);
        }
    }
}

impl<S: ?Sized, E> Default for Publisher<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ?Sized, E> std::fmt::Debug for Publisher<S, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
