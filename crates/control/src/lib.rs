//! Mixture control for the lambda loop
//!
//! This crate provides:
//! - A PI controller with anti-windup on the integral accumulator
//! - The fuel injector actuator that saturates the controller's command

pub mod actuator;
pub mod pi;

pub use actuator::*;
pub use pi::*;
