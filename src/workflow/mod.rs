pub mod authoring;
pub mod curriculum;
pub mod password_gate;

pub use authoring::ClassAuthoring;
pub use curriculum::{CurriculumModel, ItemDisplay};
pub use password_gate::{GateState, PasswordGate};
