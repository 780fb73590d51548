//! Background loops for continuous processing.

pub mod enforcement_loop;
