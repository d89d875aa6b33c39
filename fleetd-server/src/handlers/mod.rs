pub mod fleets;
pub mod gateway;
pub mod health;
pub mod tasks;
