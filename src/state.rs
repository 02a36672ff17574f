//! Interaction state machine and published display state.

/// Whether the affordance is currently held down. Transient; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Idle,
    Pressed,
}

/// Whether the full text or the truncated slice is shown.
///
/// Starts collapsed; flips only on a completed press-release cycle and
/// persists across re-layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Collapsed,
    Expanded,
}

/// Result of a release delivered to [`SeeMoreState::on_press_released`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum ReleaseOutcome {
    /// Collapsed → Expanded.
    Expanded,
    /// Expanded → Collapsed. The owner's expanded-press notification is due.
    Collapsed,
    /// Release without a tracked press; display untouched.
    NotPressed,
}

/// Mutable controller state: press tracking, display mode, and the published
/// truncation offset.
///
/// An explicit value with handler methods, so transitions are testable
/// without a host or a long-lived gesture closure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeeMoreState {
    link: LinkState,
    display: DisplayMode,
    offset: Option<usize>,
}

impl Default for SeeMoreState {
    fn default() -> Self {
        Self::new()
    }
}

impl SeeMoreState {
    pub fn new() -> Self {
        Self {
            link: LinkState::Idle,
            display: DisplayMode::Collapsed,
            offset: None,
        }
    }

    pub fn link(&self) -> LinkState {
        self.link
    }

    pub fn display(&self) -> DisplayMode {
        self.display
    }

    /// Published truncation offset; `None` until the first successful
    /// measurement.
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    pub fn publish_offset(&mut self, offset: usize) {
        self.offset = Some(offset);
    }

    pub fn on_press_start(&mut self) {
        self.link = LinkState::Pressed;
    }

    /// The gesture was claimed by another recognizer; the press is abandoned
    /// without touching the display.
    pub fn on_press_terminated(&mut self) {
        self.link = LinkState::Idle;
    }

    /// Completes a press: returns to idle and flips the display mode.
    pub fn on_press_released(&mut self) -> ReleaseOutcome {
        if self.link != LinkState::Pressed {
            return ReleaseOutcome::NotPressed;
        }

        self.link = LinkState::Idle;
        match self.display {
            DisplayMode::Collapsed => {
                self.display = DisplayMode::Expanded;
                ReleaseOutcome::Expanded
            }
            DisplayMode::Expanded => {
                self.display = DisplayMode::Collapsed;
                ReleaseOutcome::Collapsed
            }
        }
    }
}
