#[cfg(test)]
pub mod pages_tests;
#[cfg(test)]
pub mod utils;
