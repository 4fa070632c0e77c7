pub mod lenient;
pub mod math;
pub mod time;
