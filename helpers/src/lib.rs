pub mod general;
pub mod ids;
