//! Persistence seam for session records.
//!
//! - `Repository` - the operations the capture session needs from a store
//! - `MemoryRepository` - in-process store with JSON snapshot load/save

mod memory;
mod repository;

pub use memory::MemoryRepository;
pub use repository::Repository;
