use tokio_util::sync::CancellationToken;

/// Handle for one issued request. Only the ticket held by its slot may
/// write results back.
#[derive(Clone, Debug)]
pub struct RequestTicket {
    generation: u64,
    token: CancellationToken,
}

impl RequestTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    #[cfg(test)]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// At most one live request per slot; a new request cancels the old one.
#[derive(Debug, Default)]
pub struct RequestSlot {
    generation: u64,
    active: Option<RequestTicket>,
}

impl RequestSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels whatever is pending, then installs and returns a new ticket.
    pub fn begin(&mut self) -> RequestTicket {
        self.cancel();
        self.generation += 1;
        let ticket = RequestTicket {
            generation: self.generation,
            token: CancellationToken::new(),
        };
        self.active = Some(ticket.clone());
        ticket
    }

    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.generation == ticket.generation)
    }

    /// Releases the slot if `ticket` still owns it. A `false` return means
    /// the settlement is stale and must be dropped.
    pub fn settle(&mut self, ticket: &RequestTicket) -> bool {
        if self.is_current(ticket) {
            self.active = None;
            true
        } else {
            false
        }
    }

    pub fn cancel(&mut self) {
        if let Some(previous) = self.active.take() {
            previous.token.cancel();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.active.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_cancels_previous_ticket() {
        let mut slot = RequestSlot::new();
        let first = slot.begin();
        let second = slot.begin();

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(!slot.is_current(&first));
        assert!(slot.is_current(&second));
        assert!(second.generation() > first.generation());
    }

    #[test]
    fn stale_ticket_cannot_settle() {
        let mut slot = RequestSlot::new();
        let first = slot.begin();
        let second = slot.begin();

        assert!(!slot.settle(&first));
        assert!(slot.is_pending());
        assert!(slot.settle(&second));
        assert!(!slot.is_pending());
        assert!(!slot.settle(&second));
    }

    #[test]
    fn cancel_releases_the_slot() {
        let mut slot = RequestSlot::new();
        let ticket = slot.begin();
        slot.cancel();

        assert!(ticket.is_cancelled());
        assert!(!slot.settle(&ticket));
    }
}
