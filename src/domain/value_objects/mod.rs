pub mod data_source;
pub mod load_strategy;

pub use data_source::DataSource;
pub use load_strategy::LoadStrategy;
