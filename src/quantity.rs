#[macro_use]
mod macros;

pub mod emission;
pub mod percent;
