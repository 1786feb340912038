pub mod http_event_source;
pub mod wire;

pub use http_event_source::HttpEventSource;
pub use wire::{EventDto, WIRE_DATE_FORMAT};
