mod apportion;
mod info;
mod tabulate;

pub use apportion::apportion;
pub use info::info;
pub use tabulate::{tabulate, TabulateOverrides};
