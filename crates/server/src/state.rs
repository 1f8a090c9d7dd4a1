use chrono::{Local, NaiveDateTime};
use sea_orm::DatabaseConnection;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
}

impl AppState {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Wall-clock time used for change-request timestamps
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
