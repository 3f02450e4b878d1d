use crate::atlas::Atlas;

pub struct AppState {
    pub atlas: Atlas,
}
