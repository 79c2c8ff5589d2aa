//! Core math modules.

pub mod stable;
pub mod gamma;
pub mod normal;
pub mod goodness;
pub mod poisson;
pub mod descriptive;
pub mod regression;
pub mod shapiro;
