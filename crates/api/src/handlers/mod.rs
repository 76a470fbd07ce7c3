pub mod auth;
pub mod execute;
pub mod queries;
pub mod widgets;
