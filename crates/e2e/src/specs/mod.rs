pub mod auth;
pub mod availability;
pub mod health;
pub mod schedules;
pub mod stores;
