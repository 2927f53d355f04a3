//! Progressive reveal of fetched items.
//!
//! A renderer shows `revealed` items of a longer list. The count starts at
//! an initial batch and grows by a fixed step on a fixed cadence until the
//! whole list is exposed.
//!
//! Any change of the list's total restarts the reveal from the initial
//! batch, including growth when another page arrives and shrinkage when the
//! cart takes an item. The grid briefly collapses to the initial batch
//! after each change.

mod scheduler;
mod window;

pub use scheduler::RevealScheduler;
pub use window::{RevealConfig, RevealWindow};
