//! peaksight_core - Pure no_std horizon-labelling logic for peaksight
//!
//! This crate contains platform-agnostic algorithms and types that can be
//! tested on host without any feature flags or async dependencies.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives allowed
//! - **Pure no_std**: No std library dependencies
//! - **Trait abstractions**: Platform services (text measurement) injected via traits
//!
//! # Modules
//!
//! - [`orientation`]: Circular smoothing filter and gravity/magnetic orientation fusion
//! - [`calibration`]: Two-tap field-of-view calibration and compass bias trim
//! - [`layout`]: Horizon visibility, label stacking, and draw-primitive generation
//! - [`geo`]: Angle wrapping and feature geodesy (bearing, distance, visual elevation)

#![no_std]

pub mod calibration;
pub mod geo;
pub mod layout;
pub mod orientation;
