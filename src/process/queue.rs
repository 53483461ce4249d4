/*!
 * Ready Queue
 * FIFO admission queue shared by process creation and worker cores
 */

use crossbeam_queue::SegQueue;

/// Lock-free FIFO of process names
///
/// Every enqueued name is handed to exactly one `dequeue` caller, in
/// arrival order. Dequeue never blocks; idle cores poll.
#[derive(Debug, Default)]
pub struct ReadyQueue {
    names: SegQueue<String>,
}

impl ReadyQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a name to the tail
    #[inline]
    pub fn enqueue(&self, name: String) {
        self.names.push(name);
    }

    /// Take the head, or `None` when empty
    #[inline]
    pub fn dequeue(&self) -> Option<String> {
        self.names.pop()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
