//! Foundation utilities shared by the bootstrap layers

pub mod logging;
