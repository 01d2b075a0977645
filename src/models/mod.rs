pub mod access;
pub mod class_record;
pub mod curriculum_item;
pub mod loaders;
pub mod participant_result;
pub mod requirement;
pub mod scenario;

pub use access::{AccessContext, LicenseTier, Role};
pub use class_record::{ClassId, ClassPatch, ClassRecord, ClassVisibility, ParticipationPeriod};
pub use curriculum_item::{
    Author, AuthorType, CurriculumItem, ItemId, ItemKey, ItemKind, Payload, Platform, ScenarioRef,
    VideoLecture,
};
pub use loaders::{load_all_class_files, load_class_file, load_scenario_catalog, ClassFile};
pub use participant_result::ParticipantResult;
pub use requirement::CompletionRequirement;
pub use scenario::ScenarioMetadata;
