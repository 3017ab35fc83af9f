//! Value Object Module

pub mod account_role;
pub mod display_name;
pub mod email;
pub mod password;
pub mod session_marker;
