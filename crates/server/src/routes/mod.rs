pub mod auth;
pub mod availability;
pub mod health;
pub mod members;
pub mod schedules;
pub mod shifts;
pub mod stores;
