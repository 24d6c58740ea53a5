//! Concurrent linked list with blocking cursors.
//!
//! The pool store: a doubly-linked list of shared elements supporting append
//! at tail, in-place removal, and head-forward traversal. Readers positioned
//! at the tail can block for the next element ([`Element::next_wait`]) and
//! readers of an empty list can block for the first ([`CList::front_wait`]),
//! so broadcast fan-out never polls.
//!
//! Removal keeps the removed element's forward link, so a sweep that removes
//! the element it stands on continues via [`Element::next`]. The back-link is
//! severed separately with [`Element::detach_prev`]; a reader parked on a
//! removed tail element wakes, observes the removed marker, and terminates
//! its walk instead of resuming on a stale chain.

use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

/// A node of the list. Elements are shared with readers via `Arc`; the value
/// is immutable after insertion.
pub struct Element<T> {
    value: T,
    links: Mutex<Links<T>>,
    changed: Condvar,
}

struct Links<T> {
    next: Option<Arc<Element<T>>>,
    prev: Option<Weak<Element<T>>>,
    removed: bool,
}

impl<T> Element<T> {
    fn new(value: T, prev: Option<Weak<Element<T>>>) -> Arc<Self> {
        Arc::new(Self {
            value,
            links: Mutex::new(Links {
                next: None,
                prev,
                removed: false,
            }),
            changed: Condvar::new(),
        })
    }

    /// The value stored in this element.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// The successor, if any. Valid to call on a removed element: the forward
    /// link survives removal so in-flight walks continue.
    pub fn next(&self) -> Option<Arc<Element<T>>> {
        self.links.lock().next.clone()
    }

    /// Block until this element has a successor, returning it.
    ///
    /// Returns `None` once this element has been removed and no successor
    /// exists; the walk is over and the reader should re-enter through
    /// [`CList::front_wait`].
    pub fn next_wait(&self) -> Option<Arc<Element<T>>> {
        let mut links = self.links.lock();
        loop {
            if let Some(next) = links.next.clone() {
                return Some(next);
            }
            if links.removed {
                return None;
            }
            self.changed.wait(&mut links);
        }
    }

    /// Whether this element has been removed from the list.
    pub fn removed(&self) -> bool {
        self.links.lock().removed
    }

    /// Sever the back-link of a removed element so readers holding it cannot
    /// resume a backward walk on the stale chain.
    pub fn detach_prev(&self) {
        self.links.lock().prev = None;
    }
}

struct ListEnds<T> {
    head: Option<Arc<Element<T>>>,
    tail: Option<Arc<Element<T>>>,
}

/// The concurrent list. All link mutation happens under the list lock;
/// traversal and length reads take no list-wide lock.
pub struct CList<T> {
    ends: Mutex<ListEnds<T>>,
    not_empty: Condvar,
    len: AtomicUsize,
}

impl<T> CList<T> {
    pub fn new() -> Self {
        Self {
            ends: Mutex::new(ListEnds {
                head: None,
                tail: None,
            }),
            not_empty: Condvar::new(),
            len: AtomicUsize::new(0),
        }
    }

    /// Number of elements, lock-free.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The head element, if any.
    pub fn front(&self) -> Option<Arc<Element<T>>> {
        self.ends.lock().head.clone()
    }

    /// Block until the list is non-empty, returning the head element.
    pub fn front_wait(&self) -> Arc<Element<T>> {
        let mut ends = self.ends.lock();
        loop {
            if let Some(head) = ends.head.clone() {
                return head;
            }
            self.not_empty.wait(&mut ends);
        }
    }

    /// Append a value at the tail, waking readers blocked on the old tail or
    /// on an empty list.
    pub fn push_back(&self, value: T) -> Arc<Element<T>> {
        let mut ends = self.ends.lock();
        let elem = match ends.tail.take() {
            Some(tail) => {
                let elem = Element::new(value, Some(Arc::downgrade(&tail)));
                tail.links.lock().next = Some(elem.clone());
                tail.changed.notify_all();
                ends.tail = Some(elem.clone());
                elem
            }
            None => {
                let elem = Element::new(value, None);
                ends.head = Some(elem.clone());
                ends.tail = Some(elem.clone());
                self.not_empty.notify_all();
                elem
            }
        };
        self.len.fetch_add(1, Ordering::AcqRel);
        elem
    }

    /// Unlink an element in place. Idempotent: removing an already-removed
    /// element is a no-op and returns false.
    ///
    /// The element keeps its forward link so a walk standing on it continues;
    /// readers blocked in [`Element::next_wait`] on it are woken.
    pub fn remove(&self, elem: &Arc<Element<T>>) -> bool {
        let mut ends = self.ends.lock();

        let (prev, next) = {
            let mut links = elem.links.lock();
            if links.removed {
                return false;
            }
            links.removed = true;
            (
                links.prev.as_ref().and_then(Weak::upgrade),
                links.next.clone(),
            )
        };

        match &prev {
            Some(prev) => prev.links.lock().next = next.clone(),
            None => ends.head = next.clone(),
        }
        match &next {
            Some(next) => next.links.lock().prev = prev.as_ref().map(Arc::downgrade),
            None => ends.tail = prev,
        }

        self.len.fetch_sub(1, Ordering::AcqRel);
        elem.changed.notify_all();
        true
    }
}

impl<T> Default for CList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for CList<T> {
    fn drop(&mut self) {
        // Sever forward links iteratively; dropping a long Arc chain
        // recursively would overflow the stack.
        let mut ends = self.ends.lock();
        let mut cursor = ends.head.take();
        ends.tail = None;
        drop(ends);
        while let Some(elem) = cursor {
            cursor = elem.links.lock().next.take();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    fn collect(list: &CList<u32>) -> Vec<u32> {
        let mut out = Vec::new();
        let mut cursor = list.front();
        while let Some(elem) = cursor {
            out.push(*elem.value());
            cursor = elem.next();
        }
        out
    }

    #[test]
    fn test_push_back_and_traverse() {
        let list = CList::new();
        assert!(list.is_empty());

        list.push_back(1);
        list.push_back(2);
        list.push_back(3);

        assert_eq!(list.len(), 3);
        assert_eq!(collect(&list), vec![1, 2, 3]);
    }

    #[test]
    fn test_remove_middle_keeps_forward_link() {
        let list = CList::new();
        list.push_back(1);
        let middle = list.push_back(2);
        list.push_back(3);

        assert!(list.remove(&middle));
        assert!(middle.removed());
        assert_eq!(list.len(), 2);
        assert_eq!(collect(&list), vec![1, 3]);

        // A walk standing on the removed element still reaches its successor.
        let next = middle.next().expect("forward link survives removal");
        assert_eq!(*next.value(), 3);
    }

    #[test]
    fn test_remove_head_and_tail() {
        let list = CList::new();
        let head = list.push_back(1);
        list.push_back(2);
        let tail = list.push_back(3);

        assert!(list.remove(&head));
        assert_eq!(collect(&list), vec![2, 3]);

        assert!(list.remove(&tail));
        assert_eq!(collect(&list), vec![2]);

        // New appends land after the surviving element.
        list.push_back(4);
        assert_eq!(collect(&list), vec![2, 4]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let list = CList::new();
        let elem = list.push_back(1);

        assert!(list.remove(&elem));
        assert!(!list.remove(&elem));
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn test_front_wait_wakes_on_push() {
        let list = Arc::new(CList::new());
        let (tx, rx) = mpsc::channel();

        let reader = {
            let list = Arc::clone(&list);
            thread::spawn(move || {
                let head = list.front_wait();
                tx.send(*head.value()).unwrap();
            })
        };

        thread::sleep(Duration::from_millis(20));
        list.push_back(7u32);

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 7);
        reader.join().unwrap();
    }

    #[test]
    fn test_next_wait_wakes_on_push() {
        let list = Arc::new(CList::new());
        let first = list.push_back(1u32);
        let (tx, rx) = mpsc::channel();

        let reader = thread::spawn(move || {
            let next = first.next_wait().expect("successor appended");
            tx.send(*next.value()).unwrap();
        });

        thread::sleep(Duration::from_millis(20));
        list.push_back(2u32);

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 2);
        reader.join().unwrap();
    }

    #[test]
    fn test_next_wait_terminates_on_removal() {
        let list = Arc::new(CList::new());
        let tail = list.push_back(1u32);
        let (tx, rx) = mpsc::channel();

        let reader = {
            let tail = Arc::clone(&tail);
            thread::spawn(move || {
                tx.send(tail.next_wait().is_none()).unwrap();
            })
        };

        thread::sleep(Duration::from_millis(20));
        list.remove(&tail);
        tail.detach_prev();

        assert!(rx.recv_timeout(Duration::from_secs(5)).unwrap());
        reader.join().unwrap();
    }

    #[test]
    fn test_concurrent_push_preserves_len() {
        let list = Arc::new(CList::new());
        let mut handles = Vec::new();
        for t in 0..4u32 {
            let list = Arc::clone(&list);
            handles.push(thread::spawn(move || {
                for i in 0..100u32 {
                    list.push_back(t * 100 + i);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(list.len(), 400);
        assert_eq!(collect(&list).len(), 400);
    }

    #[test]
    fn test_drop_long_chain() {
        let list = CList::new();
        for i in 0..100_000u32 {
            list.push_back(i);
        }
        drop(list);
    }
}
