pub mod access_resolver;
pub mod class_status;
pub mod completion;
pub mod duration;

pub use access_resolver::{resolve, Capabilities};
pub use class_status::{ClassStatus, ParticipationTracker};
pub use completion::{best_scores, evaluate, evaluate_results, CompletionReport};
