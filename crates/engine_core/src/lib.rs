//! Core engine types and utilities for Lightballs.
//!
//! This crate provides the foundational types used across all engine systems:
//! - Plane math for reflections and projected shadows
//! - Frame timing

pub mod math;
pub mod time;

pub use math::*;
pub use time::*;

// Re-export commonly used types
pub use glam::{Mat4, Vec2, Vec3, Vec4};
