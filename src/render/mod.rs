//! Edit-driven rendering.
//!
//! - [`RenderScheduler`]: rate-limits renders during bursts of edits
//! - [`ViewSynchronizer`]: tracks the active view and writes renders into it

mod scheduler;
mod view;

pub use scheduler::{DEFAULT_COOLDOWN, RenderScheduler, SchedulerState};
pub use view::{PaneContent, ViewId, ViewPane, ViewSynchronizer};
