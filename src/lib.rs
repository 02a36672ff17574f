//! Inline "see more" text truncation controller.
//!
//! Invariant: truncation offsets reach display state only on the owner's
//! thread — measurement workers enqueue tagged events and
//! [`SeeMore::flush_measure_events`] publishes them, discarding results a
//! newer request has superseded.
//!
//! # Public API Overview
//! - Configure and drive a controller via [`SeeMore`] and [`SeeMoreOptions`].
//! - Supply the measurement backend through [`TextMeasurer`] (or use the
//!   fixed-pitch [`MonospaceMeasurer`]).
//! - Render from the computed [`DisplayPlan`].
//! - Forward layout and gesture notifications; observe collapse toggles
//!   through the expanded-press callback and measurement failures through
//!   the error callback.

pub mod cache;
pub mod display;
pub mod measure;
pub mod monospace;
pub mod options;
pub mod resolver;
pub mod see_more;
pub mod state;

/// Width-keyed memoization of measurement results.
pub use crate::cache::TruncationCache;
/// Display planning types.
pub use crate::display::{DisplayPlan, LinkPlan, ELLIPSIS};
/// Measurement backend contract.
pub use crate::measure::{MeasureError, MeasureId, MeasureRequest, TextMeasurer};
/// Built-in fixed-pitch measurement backend.
pub use crate::monospace::MonospaceMeasurer;
/// Configuration and validation.
pub use crate::options::{
    OptionsError, SeeMoreOptions, TextStyle, DEFAULT_LINK_COLOR, DEFAULT_LINK_PRESSED_COLOR,
    DEFAULT_SEE_LESS_LABEL, DEFAULT_SEE_MORE_LABEL,
};
/// Resolution orchestration types.
pub use crate::resolver::{
    MeasureEvent, MeasureOutcome, RenderRequester, Resolution, TruncationResolver,
};
/// The controller facade.
pub use crate::see_more::SeeMore;
/// Interaction and display state.
pub use crate::state::{DisplayMode, LinkState, ReleaseOutcome, SeeMoreState};
