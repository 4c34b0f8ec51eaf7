//! Core math modules.

pub mod binomial;
pub mod stable;
pub mod tables;
pub mod test_type;
