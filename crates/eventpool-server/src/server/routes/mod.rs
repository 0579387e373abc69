pub mod default;
pub mod events;
