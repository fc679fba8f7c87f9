//! Layout calculation for destination pages
//!
//! This module handles the geometric side of page composition:
//! - Canvas orientation per source kind
//! - Content box inside margins and below the header band
//! - Aspect-preserving fit and centering
//! - Header label position

mod placement;
mod types;

pub use placement::*;
pub use types::*;
