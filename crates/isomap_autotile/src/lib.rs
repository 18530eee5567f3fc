//! Auto-LAT terrain transitions
//!
//! LAT ("lighter ambient transitions") tiles smooth the border between a
//! ground type and its surroundings. Each ground pairs a plain tile set with
//! a 16-tile transition set; the transition used for a cell depends on which
//! of its four diamond neighbors are the same ground.
//!
//! # Example
//!
//! ```rust,ignore
//! use isomap_autotile::{AutoLatGround, AutoLatResolver};
//!
//! let resolver = AutoLatResolver::new(vec![AutoLatGround::new("Rough", 1, 2)]);
//! let changes = resolver.apply_auto_lat(&mut grid, &theater, region);
//! ```

mod ground;
pub mod pattern;
mod resolver;

pub use ground::{ground_for_tile_set, AutoLatGround};
pub use pattern::LatPattern;
pub use resolver::{AutoLatResolver, AutoLatResult, LatChange};
