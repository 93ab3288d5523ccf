pub mod hub_event;

pub use hub_event::{ClientEvent, ServerEvent};
