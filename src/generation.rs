/// Monotonic counter used to drop responses that arrive after the request
/// they answer has been superseded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Generation(u64);

/// Taken when a request is dispatched; checked when it completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl Generation {
    /// Invalidates every outstanding ticket and returns a fresh one.
    pub fn advance(&mut self) -> Ticket {
        self.0 = self.0.wrapping_add(1);
        Ticket(self.0)
    }

    /// Ticket for a request that should only be invalidated by a later
    /// `advance` or `invalidate`, not start a new round itself.
    pub fn current(&self) -> Ticket {
        Ticket(self.0)
    }

    /// Invalidates outstanding tickets without starting a new request.
    pub fn invalidate(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.0 == ticket.0
    }
}
