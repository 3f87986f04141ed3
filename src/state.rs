use crate::websocket::CollabHub;

#[derive(Clone)]
pub struct AppState {
    pub hub: CollabHub,
}
