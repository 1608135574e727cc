pub mod memory;
pub mod queries;
pub mod repository;
pub mod rest;
pub mod store;
pub mod workflow;

pub use memory::MemoryStore;
pub use rest::RestStore;
pub use store::{Embed, Join, Order, Row, SelectQuery, TableStore};
pub use workflow::{save_complete_assessment, CompletedIntake, SaveStep};
