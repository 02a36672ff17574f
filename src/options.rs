//! Controller configuration.

use std::fmt;

/// Collapsed-state affordance label.
pub const DEFAULT_SEE_MORE_LABEL: &str = "see more";
/// Expanded-state affordance label.
pub const DEFAULT_SEE_LESS_LABEL: &str = "see less";
/// Affordance color while idle.
pub const DEFAULT_LINK_COLOR: &str = "#2E75F0";
/// Affordance color while held down.
pub const DEFAULT_LINK_PRESSED_COLOR: &str = "#163772";

/// Font attributes forwarded verbatim to the measurement backend.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_size: f32,
    pub font_family: Option<String>,
    pub font_weight: String,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            font_family: None,
            font_weight: "300".to_string(),
        }
    }
}

/// Configuration for one [`SeeMore`](crate::SeeMore) instance.
///
/// The text, line limit and style are fixed for the lifetime of the
/// controller; a host that swaps them rebuilds the controller (and with it
/// the width cache the old tuple produced).
#[derive(Debug, Clone, PartialEq)]
pub struct SeeMoreOptions {
    pub text: String,
    pub line_limit: usize,
    pub see_more_label: String,
    pub see_less_label: String,
    pub link_color: String,
    pub link_pressed_color: String,
    pub style: TextStyle,
}

impl SeeMoreOptions {
    pub fn new(text: impl Into<String>, line_limit: usize) -> Self {
        Self {
            text: text.into(),
            line_limit,
            see_more_label: DEFAULT_SEE_MORE_LABEL.to_string(),
            see_less_label: DEFAULT_SEE_LESS_LABEL.to_string(),
            link_color: DEFAULT_LINK_COLOR.to_string(),
            link_pressed_color: DEFAULT_LINK_PRESSED_COLOR.to_string(),
            style: TextStyle::default(),
        }
    }

    /// Checks the caller contract; violations are construction failures, not
    /// runtime conditions.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.text.is_empty() {
            return Err(OptionsError::EmptyText);
        }
        if self.line_limit == 0 {
            return Err(OptionsError::ZeroLineLimit);
        }
        validate_hex_color(&self.link_color)?;
        validate_hex_color(&self.link_pressed_color)?;
        Ok(())
    }
}

fn validate_hex_color(value: &str) -> Result<(), OptionsError> {
    let digits = match value.strip_prefix('#') {
        Some(digits) => digits,
        None => return Err(OptionsError::InvalidColor(value.to_string())),
    };

    if !matches!(digits.len(), 3 | 6) || !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(OptionsError::InvalidColor(value.to_string()));
    }

    Ok(())
}

/// Rejected configuration, reported at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    EmptyText,
    ZeroLineLimit,
    InvalidColor(String),
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyText => write!(f, "text is required and must be non-empty"),
            Self::ZeroLineLimit => write!(f, "line limit must be a positive integer"),
            Self::InvalidColor(value) => {
                write!(f, "link color must be a #RGB or #RRGGBB string, got {value:?}")
            }
        }
    }
}

impl std::error::Error for OptionsError {}

#[cfg(test)]
mod tests {
    use super::{OptionsError, SeeMoreOptions};

    #[test]
    fn defaults_match_the_documented_configuration() {
        let options = SeeMoreOptions::new("hello", 2);
        assert_eq!(options.see_more_label, "see more");
        assert_eq!(options.see_less_label, "see less");
        assert_eq!(options.link_color, "#2E75F0");
        assert_eq!(options.link_pressed_color, "#163772");
        assert_eq!(options.style.font_size, 14.0);
        assert_eq!(options.style.font_weight, "300");
        assert!(options.style.font_family.is_none());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn empty_text_is_rejected() {
        let options = SeeMoreOptions::new("", 2);
        assert_eq!(options.validate(), Err(OptionsError::EmptyText));
    }

    #[test]
    fn zero_line_limit_is_rejected() {
        let options = SeeMoreOptions::new("hello", 0);
        assert_eq!(options.validate(), Err(OptionsError::ZeroLineLimit));
    }

    #[test]
    fn malformed_colors_are_rejected() {
        for bad in ["2E75F0", "#12", "#12345", "#GGGGGG", ""] {
            let mut options = SeeMoreOptions::new("hello", 2);
            options.link_color = bad.to_string();
            assert_eq!(
                options.validate(),
                Err(OptionsError::InvalidColor(bad.to_string())),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn short_and_long_hex_colors_are_accepted() {
        for good in ["#fff", "#2E75F0", "#163772"] {
            let mut options = SeeMoreOptions::new("hello", 2);
            options.link_pressed_color = good.to_string();
            assert!(options.validate().is_ok(), "expected {good:?} to validate");
        }
    }
}
