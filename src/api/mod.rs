pub mod auth;
pub mod avatar;
pub mod certifications;
pub mod details;
pub mod diplomas;
pub mod experience;
pub mod extract;
pub mod projects;
pub mod public;
pub mod upload;
