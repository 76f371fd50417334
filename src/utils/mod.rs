pub mod ray;

pub use ray::{Hit, Ray};
