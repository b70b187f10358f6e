pub mod memo;
pub mod services;
