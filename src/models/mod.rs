pub mod app_state;
pub mod certification;
pub mod details;
pub mod diploma;
pub mod experience;
pub mod project;
pub mod public;
pub mod user;
