//! Display-plan computation.

use crate::options::SeeMoreOptions;
use crate::state::{DisplayMode, LinkState, SeeMoreState};

/// Marker rendered between the truncated slice and the collapsed label.
pub const ELLIPSIS: &str = "…";

/// What the host should render for the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayPlan {
    /// Text to show: the full text, or the truncated slice when collapsed.
    pub body: String,
    /// Line cap to apply; `None` renders uncapped.
    pub line_limit: Option<usize>,
    /// Affordance to render after the body; `None` suppresses the label and
    /// its touch target entirely.
    pub link: Option<LinkPlan>,
}

/// The affordance portion of a [`DisplayPlan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPlan {
    /// Whether [`ELLIPSIS`] precedes the label (collapsed display only).
    pub ellipsis: bool,
    /// Label text including its leading space: `" see more"` / `" see less"`.
    pub label: String,
    /// Color for the current press state.
    pub color: String,
}

/// Decides the rendered content for the current state.
///
/// Truncability is recomputed from the published offset on every call, never
/// cached: the affordance exists exactly while `offset < text` length. With
/// no offset published yet the full text renders uncapped; slicing on an
/// unresolved value is never an option.
pub fn plan(options: &SeeMoreOptions, state: &SeeMoreState) -> DisplayPlan {
    let text = options.text.as_str();
    let Some(offset) = state.offset() else {
        return DisplayPlan {
            body: text.to_string(),
            line_limit: None,
            link: None,
        };
    };

    let total_chars = text.chars().count();
    let truncable = offset < total_chars;

    let link = if truncable {
        let label = match state.display() {
            DisplayMode::Collapsed => &options.see_more_label,
            DisplayMode::Expanded => &options.see_less_label,
        };
        let color = match state.link() {
            LinkState::Idle => options.link_color.clone(),
            LinkState::Pressed => options.link_pressed_color.clone(),
        };
        Some(LinkPlan {
            ellipsis: state.display() == DisplayMode::Collapsed,
            label: format!(" {label}"),
            color,
        })
    } else {
        None
    };

    match state.display() {
        DisplayMode::Expanded => DisplayPlan {
            body: text.to_string(),
            line_limit: None,
            link,
        },
        DisplayMode::Collapsed => {
            let body = if truncable {
                char_prefix(text, offset).to_string()
            } else {
                text.to_string()
            };
            DisplayPlan {
                body,
                line_limit: Some(options.line_limit),
                link,
            }
        }
    }
}

fn char_prefix(text: &str, chars: usize) -> &str {
    match text.char_indices().nth(chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
