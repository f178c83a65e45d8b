//! detour-planner
//!
//! Routes between two points around reported road blockages, using a
//! routing provider's native avoidance-area parameter.

pub mod traits;
pub mod error;
pub mod blockage;
pub mod store;
pub mod avoidance;
pub mod request;
pub mod here;
pub mod planner;
pub mod polyline;
pub mod handler;
pub mod config;
