pub mod bisection;
pub mod rotation;
