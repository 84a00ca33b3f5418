#![no_std]

pub mod math;
pub mod time;
pub mod ttl;
