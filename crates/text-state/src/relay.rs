/// A committed buffer change, as seen from outside the synchronous
/// observer fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationEvent {
    InsertedBefore { offset: usize, length: usize },
    DeletedAt { offset: usize, length: usize },
    StyleChanged { start: usize, end: usize },
}

/// Bridges the buffer's observer fan-out onto a channel, for consumers
/// that live outside the editing call stack (a render loop, a script
/// host's event queue). Events arrive in mutation order; a dropped
/// receiver just means nobody is listening any more, so sends after
/// that are quietly discarded.
#[derive(Debug)]
pub struct MutationRelay {
    sender: crossbeam_channel::Sender<MutationEvent>,
}

impl MutationRelay {
    #[must_use]
    pub fn new(sender: crossbeam_channel::Sender<MutationEvent>) -> Self {
        Self { sender }
    }

    /// A relay and the receiver draining it.
    #[must_use]
    pub fn channel() -> (Self, crossbeam_channel::Receiver<MutationEvent>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (Self { sender }, receiver)
    }
}

impl text_core::observer::BufferMutationObserver for MutationRelay {
    fn did_insert_before(&mut self, offset: usize, length: usize) {
        let _ = self
            .sender
            .send(MutationEvent::InsertedBefore { offset, length });
    }

    fn did_delete_at(&mut self, offset: usize, length: usize) {
        let _ = self.sender.send(MutationEvent::DeletedAt { offset, length });
    }

    fn did_change_style(&mut self, start: usize, end: usize) {
        let _ = self.sender.send(MutationEvent::StyleChanged { start, end });
    }
}
