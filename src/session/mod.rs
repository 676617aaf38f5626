pub mod manager;
pub mod profile;
pub mod result;
pub mod state;
