pub mod message;
pub mod room;
pub mod session;

pub use message::{Message, MessageKind};
pub use room::{Room, RoomKind, RoomSnapshot};
pub use session::{CursorState, Presence, Session, UserSummary};
