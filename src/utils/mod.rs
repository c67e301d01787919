pub mod email;
pub mod extract;
pub mod jwt;
pub mod media;
pub mod password;
pub mod validation;
