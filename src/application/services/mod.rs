pub mod event_load_service;

pub use event_load_service::EventLoadService;
