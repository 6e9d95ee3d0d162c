//! Per-field request sequencing.
//!
//! Every remote lookup the wizard performs is tagged with a ticket drawn
//! from the sequence of the field it populates. Only the response carrying
//! the most recently issued ticket may be committed; anything older is
//! stale and gets dropped, whatever order the responses arrive in.

/// Identifies one issued request within its sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Monotonic issue counter for one dependent field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSequence {
    issued: u64,
    settled: u64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the next ticket. Any ticket issued before it is now stale.
    pub fn issue(&mut self) -> RequestTicket {
        self.issued += 1;
        RequestTicket(self.issued)
    }

    /// Whether `ticket` is still the latest one issued.
    pub fn is_current(
        &self,
        ticket: RequestTicket,
    ) -> bool {
        ticket.0 == self.issued
    }

    /// Marks the request behind `ticket` as answered.
    ///
    /// Returns `false` for a stale ticket, in which case the caller must
    /// discard the response.
    pub fn settle(
        &mut self,
        ticket: RequestTicket,
    ) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.settled = ticket.0;
        true
    }

    /// A request has been issued and its answer not yet committed.
    pub fn is_pending(&self) -> bool {
        self.settled < self.issued
    }

    /// Makes every outstanding ticket stale without issuing a new request.
    pub fn invalidate(&mut self) {
        self.issued += 1;
        self.settled = self.issued;
    }
}

/// Outcome of committing a response into wizard state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// The response was current and its data is now in state.
    Applied,
    /// A newer request superseded this one; state is untouched.
    Stale,
    /// The request failed; the error now sits in its step's error slot.
    Failed,
}

impl Commit {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}
