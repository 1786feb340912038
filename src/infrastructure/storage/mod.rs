pub mod atomic_file;
pub mod preference_store;

pub use preference_store::PreferenceStore;
