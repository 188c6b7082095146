//! Spending-control rules: fragment types, the per-specialist mappers, and
//! the priority merge that produces the final payload.

mod assembler;
mod categories;
pub mod mapping;
mod prefs;
mod types;

pub use assembler::assemble;
pub use prefs::UserPrefs;
pub use types::*;
