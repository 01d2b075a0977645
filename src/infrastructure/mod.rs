pub mod class_repository;
pub mod client_state;
pub mod scenario_catalog;
pub mod session;

pub use class_repository::{ClassRepository, InMemoryClassRepository};
pub use client_state::{ClientStateStore, JsonFileClientState, MemoryClientState};
pub use scenario_catalog::{InMemoryScenarioCatalog, ScenarioCatalog};
pub use session::SessionContext;
