pub mod message_service;
pub mod presence_service;
pub mod relay_service;
pub mod room_service;
pub mod sweeper;
