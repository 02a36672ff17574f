//! Controller facade.

use std::sync::Arc;

use tracing::debug;

use crate::display::{self, DisplayPlan, ELLIPSIS};
use crate::measure::{MeasureError, MeasureRequest, TextMeasurer};
use crate::options::{OptionsError, SeeMoreOptions};
use crate::resolver::{MeasureOutcome, RenderRequester, Resolution, TruncationResolver};
use crate::state::{DisplayMode, ReleaseOutcome, SeeMoreState};

/// Inline "see more" truncation controller.
///
/// Owns the interaction state machine and the asynchronous truncation
/// resolver. The host forwards layout and gesture notifications, calls
/// [`SeeMore::flush_measure_events`] when woken, and renders the returned
/// [`DisplayPlan`].
pub struct SeeMore {
    options: SeeMoreOptions,
    state: SeeMoreState,
    resolver: TruncationResolver,
    text_chars: usize,
    on_expanded_press: Option<Box<dyn FnMut()>>,
    on_measure_error: Option<Box<dyn FnMut(MeasureError)>>,
}

impl SeeMore {
    /// Builds a controller after validating `options`.
    ///
    /// `render_requester` is invoked (possibly from a measurement worker
    /// thread) when queued results await a flush.
    pub fn new(
        options: SeeMoreOptions,
        measurer: Arc<dyn TextMeasurer>,
        render_requester: Option<RenderRequester>,
    ) -> Result<Self, OptionsError> {
        options.validate()?;
        let text_chars = options.text.chars().count();
        Ok(Self {
            options,
            state: SeeMoreState::new(),
            resolver: TruncationResolver::new(measurer, render_requester),
            text_chars,
            on_expanded_press: None,
            on_measure_error: None,
        })
    }

    /// Notification fired once per toggle-to-collapse initiated while the
    /// display was expanded.
    pub fn set_on_expanded_press(&mut self, handler: Option<Box<dyn FnMut()>>) {
        self.on_expanded_press = handler;
    }

    /// The host's asynchronous-failure channel for measurement errors.
    pub fn set_on_measure_error(&mut self, handler: Option<Box<dyn FnMut(MeasureError)>>) {
        self.on_measure_error = handler;
    }

    pub fn options(&self) -> &SeeMoreOptions {
        &self.options
    }

    pub fn is_expanded(&self) -> bool {
        self.state.display() == DisplayMode::Expanded
    }

    /// Published truncation offset; `None` until the first successful
    /// measurement.
    pub fn truncation_offset(&self) -> Option<usize> {
        self.state.offset()
    }

    /// Cached offset for `width`, without issuing a measurement.
    pub fn cached_offset(&self, width: usize) -> Option<usize> {
        self.resolver.cached(width)
    }

    /// Width of the most recent measurement still in flight.
    pub fn awaiting_measurement(&self) -> Option<usize> {
        self.resolver.awaiting_width()
    }

    /// Layout-change notification from the host.
    ///
    /// Re-measures only while collapsed: the expanded view shows the full
    /// text regardless of offset, so width changes cost nothing there. The
    /// offset stays layout-dependent, never expansion-dependent; collapsing
    /// back reuses whatever the current width resolved to.
    pub fn on_layout(&mut self, width: usize) {
        if width == 0 || self.state.display() == DisplayMode::Expanded {
            return;
        }

        match self.resolver.resolve(self.measure_request(width)) {
            Ok(Resolution::Cached(offset)) => self.publish_offset(offset),
            Ok(Resolution::Pending(_)) => {}
            Err(error) => self.report_measure_error(error),
        }
    }

    /// Touch-start on the affordance. Ignored while no touch target exists.
    pub fn on_touch_start(&mut self) {
        if !self.has_touch_target() {
            return;
        }
        self.state.on_press_start();
    }

    /// The gesture was claimed by another recognizer; the press is abandoned
    /// without a display change.
    pub fn on_touch_terminated(&mut self) {
        self.state.on_press_terminated();
    }

    /// Touch-release completing a press: toggles the display and fires the
    /// expanded-press notification when the display was expanded at release
    /// time.
    pub fn on_touch_released(&mut self) {
        match self.state.on_press_released() {
            ReleaseOutcome::Collapsed => {
                if let Some(handler) = self.on_expanded_press.as_mut() {
                    handler();
                }
            }
            ReleaseOutcome::Expanded | ReleaseOutcome::NotPressed => {}
        }
    }

    /// Applies queued measurement results on the owner's thread; returns how
    /// many outcomes were applied.
    pub fn flush_measure_events(&mut self) -> usize {
        let outcomes = self.resolver.drain();
        let applied = outcomes.len();
        for outcome in outcomes {
            match outcome {
                MeasureOutcome::Offset { offset, .. } => self.publish_offset(offset),
                MeasureOutcome::Error(error) => self.report_measure_error(error),
            }
        }
        applied
    }

    /// Computes what the host should render right now.
    pub fn display_plan(&self) -> DisplayPlan {
        display::plan(&self.options, &self.state)
    }

    fn has_touch_target(&self) -> bool {
        self.display_plan().link.is_some()
    }

    fn publish_offset(&mut self, offset: usize) {
        self.state.publish_offset(offset.min(self.text_chars));
    }

    fn report_measure_error(&mut self, error: MeasureError) {
        debug!(%error, "measurement error forwarded to host");
        if let Some(handler) = self.on_measure_error.as_mut() {
            handler(error);
        }
    }

    fn measure_request(&self, width: usize) -> MeasureRequest {
        MeasureRequest {
            text: self.options.text.clone(),
            line_limit: self.options.line_limit,
            style: self.options.style.clone(),
            width,
            link_text: format!("{ELLIPSIS} {}", self.options.see_more_label),
        }
    }
}
