//! Missing-value imputation.

mod simple;

pub use simple::{FittedSimpleImputer, SimpleImputer, SimpleImputerParams};
