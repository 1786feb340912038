pub mod entities;
pub mod value_objects;

pub use entities::{BackgroundUpdate, CacheStatus, City, Event, LoadResult, Sport};
pub use value_objects::{DataSource, LoadStrategy};
