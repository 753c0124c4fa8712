//! SQLite persistence for the login record and notification channels.

mod channel_repository;
mod login_repository;
mod manager;

pub use channel_repository::SqliteChannelRepository;
pub use login_repository::SqliteLoginRepository;
pub use manager::DbManager;
