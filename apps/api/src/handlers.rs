pub mod billing;
pub mod forms;
pub mod health;
pub mod public;
pub mod submissions;
pub mod usage;
