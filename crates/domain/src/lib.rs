//! # lifxctl-domain
//!
//! Pure domain model for the lifxctl LIFX bulb controller.
//!
//! ## Responsibilities
//! - Foundational types: network addresses, error conventions
//! - Define **Device records** (a named bulb with its MAC identity and last known IP)
//! - Define **Colors** (HSBK values as commanded to and reported by bulbs)
//! - Define **Commands** (`on`, `off`, `setBrightness`, `setColor`, `status`)
//!   and validate their parameters at parse time
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;

pub mod address;
pub mod color;
pub mod command;
pub mod device;
