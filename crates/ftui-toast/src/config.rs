#![forbid(unsafe_code)]

//! Configuration for a toaster: registry retention plus the display defaults
//! the rendering layer applies to toasts that do not override them.
//!
//! The registry itself only reads [`ToasterConfig::history_limit`]; every
//! other field is carried for the renderer, which looks values up through
//! the `*_for` helpers so per-toast overrides always win.

use std::time::Duration;

use crate::toast::{Position, Toast};

/// Color scheme requested from the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Theme {
    #[default]
    Light,
    Dark,
    System,
}

/// Text direction for the toast stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TextDirection {
    Ltr,
    Rtl,
    #[default]
    Auto,
}

/// Edge a toast may be swiped towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SwipeDirection {
    Top,
    Right,
    Bottom,
    Left,
}

/// Distance of the stack from the viewport edges, in renderer units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Offset {
    pub top: Option<f32>,
    pub right: Option<f32>,
    pub bottom: Option<f32>,
    pub left: Option<f32>,
}

impl Offset {
    /// Same distance on all four edges.
    #[must_use]
    pub fn uniform(value: f32) -> Self {
        Self {
            top: Some(value),
            right: Some(value),
            bottom: Some(value),
            left: Some(value),
        }
    }
}

/// Configuration for a toaster.
///
/// With the `serde` feature, missing fields take their default values, so a
/// host can forward a partial config.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ToasterConfig {
    /// Maximum number of records kept in the registry (`None` = unlimited).
    ///
    /// When exceeded, the oldest dismissed records are evicted. Active
    /// records are never evicted, so the limit can be overshot while every
    /// record is still on screen.
    pub history_limit: Option<usize>,
    pub position: Position,
    pub theme: Theme,
    /// Auto-close delay for toasts without their own duration.
    pub duration: Duration,
    /// Gap between stacked toasts.
    pub gap: u16,
    /// How many toasts are drawn before the stack collapses.
    pub visible_toasts: usize,
    pub close_button: bool,
    pub rich_colors: bool,
    pub expand: bool,
    pub offset: Option<Offset>,
    pub mobile_offset: Option<Offset>,
    pub dir: TextDirection,
    /// Key combination that focuses the stack.
    pub hotkey: Vec<String>,
    pub container_aria_label: String,
    /// Empty means "derive from position".
    pub swipe_directions: Vec<SwipeDirection>,
}

impl Default for ToasterConfig {
    fn default() -> Self {
        Self {
            history_limit: None,
            position: Position::BottomRight,
            theme: Theme::Light,
            duration: Duration::from_millis(4000),
            gap: 8,
            visible_toasts: 3,
            close_button: false,
            rich_colors: false,
            expand: false,
            offset: None,
            mobile_offset: None,
            dir: TextDirection::Auto,
            hotkey: vec!["altKey".to_owned(), "KeyT".to_owned()],
            container_aria_label: "Notifications".to_owned(),
            swipe_directions: Vec::new(),
        }
    }
}

impl ToasterConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the number of retained records.
    #[must_use]
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    #[must_use]
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    #[must_use]
    pub fn gap(mut self, gap: u16) -> Self {
        self.gap = gap;
        self
    }

    #[must_use]
    pub fn visible_toasts(mut self, count: usize) -> Self {
        self.visible_toasts = count;
        self
    }

    #[must_use]
    pub fn close_button(mut self, enabled: bool) -> Self {
        self.close_button = enabled;
        self
    }

    #[must_use]
    pub fn rich_colors(mut self, enabled: bool) -> Self {
        self.rich_colors = enabled;
        self
    }

    #[must_use]
    pub fn expand(mut self, enabled: bool) -> Self {
        self.expand = enabled;
        self
    }

    #[must_use]
    pub fn offset(mut self, offset: Offset) -> Self {
        self.offset = Some(offset);
        self
    }

    #[must_use]
    pub fn mobile_offset(mut self, offset: Offset) -> Self {
        self.mobile_offset = Some(offset);
        self
    }

    #[must_use]
    pub fn dir(mut self, dir: TextDirection) -> Self {
        self.dir = dir;
        self
    }

    #[must_use]
    pub fn hotkey<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hotkey = keys.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn container_aria_label(mut self, label: impl Into<String>) -> Self {
        self.container_aria_label = label.into();
        self
    }

    #[must_use]
    pub fn swipe_directions(mut self, directions: impl IntoIterator<Item = SwipeDirection>) -> Self {
        self.swipe_directions = directions.into_iter().collect();
        self
    }

    // ========================================================================
    // Per-toast resolution
    // ========================================================================

    /// Auto-close delay for `toast`.
    #[must_use]
    pub fn duration_for(&self, toast: &Toast) -> Duration {
        toast.duration.unwrap_or(self.duration)
    }

    /// Whether `toast` shows a close button.
    #[must_use]
    pub fn close_button_for(&self, toast: &Toast) -> bool {
        toast.close_button.unwrap_or(self.close_button)
    }

    /// Whether `toast` uses rich colors.
    #[must_use]
    pub fn rich_colors_for(&self, toast: &Toast) -> bool {
        toast.rich_colors.unwrap_or(self.rich_colors)
    }

    /// Stack `toast` belongs to.
    #[must_use]
    pub fn position_for(&self, toast: &Toast) -> Position {
        toast.position.unwrap_or(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ToastId;
    use crate::toast::{ToastOptions, ToastPatch};

    #[test]
    fn defaults() {
        let config = ToasterConfig::default();
        assert_eq!(config.history_limit, None);
        assert_eq!(config.position, Position::BottomRight);
        assert_eq!(config.theme, Theme::Light);
        assert_eq!(config.duration, Duration::from_millis(4000));
        assert_eq!(config.gap, 8);
        assert_eq!(config.visible_toasts, 3);
        assert!(!config.close_button);
        assert!(!config.rich_colors);
        assert!(!config.expand);
        assert_eq!(config.hotkey, ["altKey", "KeyT"]);
        assert_eq!(config.container_aria_label, "Notifications");
    }

    #[test]
    fn builder_sets_fields() {
        let config = ToasterConfig::new()
            .history_limit(50)
            .position(Position::TopCenter)
            .theme(Theme::Dark)
            .visible_toasts(5)
            .offset(Offset::uniform(16.0))
            .swipe_directions([SwipeDirection::Left, SwipeDirection::Right]);
        assert_eq!(config.history_limit, Some(50));
        assert_eq!(config.position, Position::TopCenter);
        assert_eq!(config.theme, Theme::Dark);
        assert_eq!(config.visible_toasts, 5);
        assert_eq!(config.offset.and_then(|o| o.left), Some(16.0));
        assert_eq!(config.swipe_directions.len(), 2);
    }

    #[test]
    fn per_toast_overrides_win() {
        let config = ToasterConfig::new().close_button(true);
        let plain = ToastPatch::new().message("a").into_toast(ToastId::Num(1));
        let custom = ToastPatch::from(
            ToastOptions::new()
                .duration(Duration::from_secs(1))
                .close_button(false)
                .position(Position::TopLeft),
        )
        .into_toast(ToastId::Num(2));

        assert_eq!(config.duration_for(&plain), Duration::from_millis(4000));
        assert_eq!(config.duration_for(&custom), Duration::from_secs(1));
        assert!(config.close_button_for(&plain));
        assert!(!config.close_button_for(&custom));
        assert_eq!(config.position_for(&plain), Position::BottomRight);
        assert_eq!(config.position_for(&custom), Position::TopLeft);
        assert!(!config.rich_colors_for(&plain));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_config_deserializes_over_defaults() {
        let config: ToasterConfig = serde_json::from_value(serde_json::json!({
            "history_limit": 5,
            "theme": "dark",
            "dir": "rtl",
            "swipe_directions": ["left", "bottom"],
            "offset": { "top": 4.0 },
        }))
        .expect("valid config");

        assert_eq!(config.history_limit, Some(5));
        assert_eq!(config.theme, Theme::Dark);
        assert_eq!(config.dir, TextDirection::Rtl);
        assert_eq!(
            config.swipe_directions,
            [SwipeDirection::Left, SwipeDirection::Bottom]
        );
        assert_eq!(config.offset.and_then(|o| o.top), Some(4.0));
        assert_eq!(config.offset.and_then(|o| o.left), None);
        assert_eq!(config.visible_toasts, 3);
        assert_eq!(config.duration, Duration::from_millis(4000));

        let back = serde_json::to_value(&config).expect("serializable");
        assert_eq!(back["dir"], "rtl");
    }
}
