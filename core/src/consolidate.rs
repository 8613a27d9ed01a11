//! Reduce the four lifecycles to one error and one loading flag.
//!
//! Only the highest-priority failure is reported: fetch, then create, then
//! update, then remove. Once it is retried and clears, the next one shows.

use crate::lifecycle::{Operation, Status};

/// Status of every tracked operation at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statuses {
    pub fetch: Status,
    pub create: Status,
    pub update: Status,
    pub remove: Status,
}

impl Statuses {
    fn in_priority_order(&self) -> [(Operation, Status); 4] {
        [
            (Operation::Fetch, self.fetch),
            (Operation::Create, self.create),
            (Operation::Update, self.update),
            (Operation::Remove, self.remove),
        ]
    }

    /// True while any operation has a call in flight.
    pub fn loading(&self) -> bool {
        self.in_priority_order().iter().any(|(_, status)| status.pending)
    }

    /// The failed operation to surface, if any.
    pub fn consolidate(&self) -> Option<Operation> {
        self.in_priority_order()
            .into_iter()
            .find(|(_, status)| status.failed)
            .map(|(operation, _)| operation)
    }
}
