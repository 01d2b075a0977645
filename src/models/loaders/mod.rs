pub mod toml_loader;

pub use toml_loader::{load_all_class_files, load_class_file, load_scenario_catalog, ClassFile};
