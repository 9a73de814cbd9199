//! Cross-crate scenarios: real pools and filters driven by the worker pool
//! against scripted probers and sinks.

#[cfg(test)]
mod enumeration;
#[cfg(test)]
mod scenarios;
#[cfg(test)]
mod utils;
