//! # courtside-queue
//!
//! Lock-free bounded queue for the Courtside job runner.
//!
//! Every enqueue claims a unique, strictly increasing ticket that doubles as
//! the slot index. Consumers scan slots from index 0 and atomically swap each
//! slot with the empty marker, so a payload is observed by exactly one caller
//! and older tickets are always handed out before newer ones.
#![warn(missing_docs)]

pub mod stats;
pub mod ticket;

pub use stats::{AtomicQueueStats, QueueStats};
pub use ticket::{QueueFullError, TicketQueue};
