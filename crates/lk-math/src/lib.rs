//! lawkit math utilities.

pub mod math;

pub use math::stable::*;
pub use math::gamma::*;
pub use math::normal::*;
pub use math::goodness::*;
pub use math::poisson::*;
pub use math::descriptive;
pub use math::regression;
pub use math::shapiro;
