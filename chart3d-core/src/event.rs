/// Synchronous change notification between chart components
///
/// Each subject (axis, dataset, renderer, plot) owns a [`Subject`]. Listeners
/// are plain closures keyed by a [`ListenerId`]. Notification runs on a
/// snapshot of the registry, most recently registered listener first, so a
/// handler may subscribe or unsubscribe while it runs.
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Identity of a plot, used as the owner of the subjects it listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlotId(u64);

impl PlotId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Which part of the plot a change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSource {
    Axis,
    Dataset,
    Renderer,
    Plot,
}

/// A change notification. `requires_world_update` is false for purely
/// cosmetic changes that only need a repaint of the existing scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub source: ChangeSource,
    pub requires_world_update: bool,
}

impl ChangeEvent {
    pub fn new(source: ChangeSource, requires_world_update: bool) -> Self {
        Self {
            source,
            requires_world_update,
        }
    }
}

type Callback<E> = Rc<dyn Fn(&E)>;

#[derive(Debug, Clone, Copy)]
struct Attachment {
    owner: PlotId,
    listener: ListenerId,
}

/// Listener registry plus the single-owner slot of a subject.
pub struct Subject<E> {
    listeners: RefCell<Vec<(ListenerId, Callback<E>)>>,
    next_id: Cell<u64>,
    owner: Cell<Option<Attachment>>,
}

impl<E> Subject<E> {
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
            owner: Cell::new(None),
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&E) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn notify(&self, event: &E) {
        let snapshot: Vec<Callback<E>> = self
            .listeners
            .borrow()
            .iter()
            .rev()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        for callback in snapshot {
            callback(event);
        }
    }

    pub fn owner(&self) -> Option<PlotId> {
        self.owner.get().map(|a| a.owner)
    }

    /// Registers `listener` as the owning plot's listener. A previous owner's
    /// listener is removed first.
    pub fn attach_owner(&self, owner: PlotId, listener: impl Fn(&E) + 'static) -> ListenerId {
        if let Some(previous) = self.owner.take() {
            if previous.owner != owner {
                log::debug!(
                    target: "chart3d",
                    "transferring ownership from {:?} to {:?}",
                    previous.owner,
                    owner
                );
            }
            self.unsubscribe(previous.listener);
        }
        let id = self.subscribe(listener);
        self.owner.set(Some(Attachment { owner, listener: id }));
        id
    }

    /// Removes the owner's listener if `owner` still holds the slot.
    pub fn detach_owner(&self, owner: PlotId) -> bool {
        match self.owner.get() {
            Some(current) if current.owner == owner => {
                self.owner.set(None);
                self.unsubscribe(current.listener)
            }
            _ => false,
        }
    }
}

impl<E> Default for Subject<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Subject<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject")
            .field("listeners", &self.listener_count())
            .field("owner", &self.owner())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_most_recent_first() {
        let subject: Subject<u32> = Subject::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in 0..3 {
            let order = Rc::clone(&order);
            subject.subscribe(move |_| order.borrow_mut().push(tag));
        }
        subject.notify(&7);
        assert_eq!(*order.borrow(), vec![2, 1, 0]);
    }

    #[test]
    fn test_unsubscribe() {
        let subject: Subject<()> = Subject::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let id = subject.subscribe(move |_| counter.set(counter.get() + 1));
        subject.notify(&());
        assert!(subject.unsubscribe(id));
        assert!(!subject.unsubscribe(id));
        subject.notify(&());
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_listener_may_unsubscribe_during_notify() {
        let subject: Rc<Subject<()>> = Rc::new(Subject::new());
        let slot: Rc<Cell<Option<ListenerId>>> = Rc::new(Cell::new(None));
        let inner = Rc::clone(&subject);
        let own = Rc::clone(&slot);
        let id = subject.subscribe(move |_| {
            if let Some(id) = own.get() {
                inner.unsubscribe(id);
            }
        });
        slot.set(Some(id));
        subject.notify(&());
        assert_eq!(subject.listener_count(), 0);
    }

    #[test]
    fn test_attach_owner_replaces_previous_owner() {
        let subject: Subject<()> = Subject::new();
        let first = PlotId::next();
        let second = PlotId::next();
        let hits = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&hits);
        subject.attach_owner(first, move |_| log.borrow_mut().push("first"));
        let log = Rc::clone(&hits);
        subject.attach_owner(second, move |_| log.borrow_mut().push("second"));

        assert_eq!(subject.owner(), Some(second));
        assert_eq!(subject.listener_count(), 1);
        subject.notify(&());
        assert_eq!(*hits.borrow(), vec!["second"]);

        assert!(!subject.detach_owner(first));
        assert!(subject.detach_owner(second));
        assert_eq!(subject.owner(), None);
        assert_eq!(subject.listener_count(), 0);
    }
}
