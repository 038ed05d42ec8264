#![deny(unreachable_pub)]

mod builder;
pub mod cluster;
pub mod dto;
pub mod env;
pub mod error;
pub mod kubevirt;
pub mod metrics;
mod names;
pub mod service;
