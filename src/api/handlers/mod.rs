pub mod incidents;
pub mod teams;
