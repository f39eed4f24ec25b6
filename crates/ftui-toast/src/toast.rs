#![forbid(unsafe_code)]

//! Toast records, the option bundles callers pass in, and the merge between
//! them.
//!
//! # Design
//!
//! A [`Toast`] is the record the registry stores and publishes. Callers never
//! build one directly; they hand the registry a [`ToastPatch`] (a message, an
//! optional type, and a [`ToastOptions`] bundle) and the registry either
//! turns it into a fresh record or merges it over the existing one.
//!
//! # Merge precedence
//!
//! | Field                         | Patch `None`      | Patch `Some(v)` |
//! |-------------------------------|-------------------|-----------------|
//! | `title` (from `message`)      | cleared           | `v`             |
//! | `id`                          | kept              | kept            |
//! | `style`, `class_names`, `extra` | kept            | merged by key   |
//! | every other optional field    | kept              | `v`             |
//!
//! The title is the only field a patch clears by omission: re-sending a toast
//! without a message deliberately blanks it.
//!
//! Subscribers receive [`ToastEvent`]s, which are either a full record or a
//! [`ToastToDismiss`] sentinel.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::id::ToastId;

/// Visual/semantic category of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ToastType {
    #[default]
    Normal,
    Action,
    Success,
    Info,
    Warning,
    Error,
    Loading,
    Default,
}

impl ToastType {
    /// All types, in declaration order.
    pub const ALL: [ToastType; 8] = [
        Self::Normal,
        Self::Action,
        Self::Success,
        Self::Info,
        Self::Warning,
        Self::Error,
        Self::Loading,
        Self::Default,
    ];

    /// Lowercase name, as renderers use it for class and icon lookup.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Action => "action",
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Loading => "loading",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for ToastType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the renderer anchors its toast stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Position {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
    TopCenter,
    BottomCenter,
}

/// Opaque renderable content owned by the rendering layer.
///
/// The registry never looks inside; equality is pointer identity.
#[derive(Clone)]
pub struct RenderNode(Rc<dyn Any>);

impl RenderNode {
    /// Wrap a renderer-specific value.
    pub fn new<T: Any>(value: T) -> Self {
        Self(Rc::new(value))
    }

    /// Borrow the wrapped value if it has type `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl PartialEq for RenderNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for RenderNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RenderNode").finish_non_exhaustive()
    }
}

/// Message content: text, a render node, or a function producing either.
#[derive(Clone)]
pub enum Content {
    Text(String),
    Node(RenderNode),
    /// Evaluated by the renderer each time it draws.
    Lazy(Rc<dyn Fn() -> Content>),
}

impl Content {
    /// Content computed on demand.
    pub fn lazy(f: impl Fn() -> Content + 'static) -> Self {
        Self::Lazy(Rc::new(f))
    }

    /// Evaluate lazy content until a text or node remains.
    #[must_use]
    pub fn resolve(&self) -> Content {
        let mut current = self.clone();
        while let Self::Lazy(f) = current {
            current = f();
        }
        current
    }

    /// The text, if this is plain text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for Content {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Node(a), Self::Node(b)) => a == b,
            (Self::Lazy(a), Self::Lazy(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Self::Node(n) => fmt::Debug::fmt(n, f),
            Self::Lazy(_) => f.debug_tuple("Lazy").finish_non_exhaustive(),
        }
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<RenderNode> for Content {
    fn from(node: RenderNode) -> Self {
        Self::Node(node)
    }
}

/// Callback invoked with a toast (dismiss / auto-close hooks).
#[derive(Clone)]
pub struct ToastCallback(Rc<dyn Fn(&Toast)>);

impl ToastCallback {
    pub fn new(f: impl Fn(&Toast) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, toast: &Toast) {
        (self.0)(toast);
    }
}

impl PartialEq for ToastCallback {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ToastCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToastCallback").finish_non_exhaustive()
    }
}

/// Action/cancel button attached to a toast.
#[derive(Clone)]
pub struct Action {
    pub label: Content,
    on_click: Rc<dyn Fn()>,
    pub button_style: Map<String, Value>,
}

impl Action {
    pub fn new(label: impl Into<Content>, on_click: impl Fn() + 'static) -> Self {
        Self {
            label: label.into(),
            on_click: Rc::new(on_click),
            button_style: Map::new(),
        }
    }

    /// Add one style property for the button.
    #[must_use]
    pub fn button_style(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.button_style.insert(key.into(), value.into());
        self
    }

    /// Run the click handler.
    pub fn click(&self) {
        (self.on_click)();
    }
}

impl PartialEq for Action {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
            && Rc::ptr_eq(&self.on_click, &other.on_click)
            && self.button_style == other.button_style
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("label", &self.label)
            .field("button_style", &self.button_style)
            .finish_non_exhaustive()
    }
}

/// A toast as stored by the registry and handed to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: ToastId,
    pub title: Option<Content>,
    pub kind: ToastType,
    pub description: Option<Content>,
    pub icon: Option<Content>,
    /// Custom content produced by `custom`; replaces the default body.
    pub jsx: Option<RenderNode>,
    pub action: Option<Action>,
    pub cancel: Option<Action>,
    pub duration: Option<Duration>,
    pub dismissible: bool,
    pub close_button: Option<bool>,
    pub rich_colors: Option<bool>,
    pub invert: Option<bool>,
    pub unstyled: Option<bool>,
    pub class_name: Option<String>,
    pub description_class_name: Option<String>,
    pub class_names: BTreeMap<String, String>,
    pub style: Map<String, Value>,
    pub position: Option<Position>,
    pub toaster_id: Option<String>,
    pub test_id: Option<String>,
    pub close_button_aria_label: Option<String>,
    pub on_dismiss: Option<ToastCallback>,
    pub on_auto_close: Option<ToastCallback>,
    /// Presentational fields the registry passes through untouched.
    pub extra: Map<String, Value>,
}

impl Toast {
    /// Blank record: normal type, dismissible, everything else unset.
    #[must_use]
    pub fn new(id: impl Into<ToastId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            kind: ToastType::Normal,
            description: None,
            icon: None,
            jsx: None,
            action: None,
            cancel: None,
            duration: None,
            dismissible: true,
            close_button: None,
            rich_colors: None,
            invert: None,
            unstyled: None,
            class_name: None,
            description_class_name: None,
            class_names: BTreeMap::new(),
            style: Map::new(),
            position: None,
            toaster_id: None,
            test_id: None,
            close_button_aria_label: None,
            on_dismiss: None,
            on_auto_close: None,
            extra: Map::new(),
        }
    }

    /// Title text, if the title is plain text.
    #[must_use]
    pub fn title_text(&self) -> Option<&str> {
        self.title.as_ref().and_then(Content::as_text)
    }

    /// Description text, if the description is plain text.
    #[must_use]
    pub fn description_text(&self) -> Option<&str> {
        self.description.as_ref().and_then(Content::as_text)
    }
}

/// Sentinel published instead of a [`Toast`] to signal removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastToDismiss {
    pub id: ToastId,
}

/// What subscribers receive.
#[derive(Debug, Clone, PartialEq)]
pub enum ToastEvent {
    /// A new or updated record.
    Show(Toast),
    /// The toast with this id should leave the screen.
    Dismiss(ToastToDismiss),
}

impl ToastEvent {
    #[must_use]
    pub fn id(&self) -> &ToastId {
        match self {
            Self::Show(toast) => &toast.id,
            Self::Dismiss(sentinel) => &sentinel.id,
        }
    }

    #[must_use]
    pub fn is_dismiss(&self) -> bool {
        matches!(self, Self::Dismiss(_))
    }

    #[must_use]
    pub fn as_toast(&self) -> Option<&Toast> {
        match self {
            Self::Show(toast) => Some(toast),
            Self::Dismiss(_) => None,
        }
    }
}

/// Optional presentational and behavioral overrides for one toast.
///
/// Every `None` means "not specified": on a new toast the field stays at its
/// default, on an update the previous value survives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToastOptions {
    pub id: Option<ToastId>,
    pub description: Option<Content>,
    pub icon: Option<Content>,
    pub action: Option<Action>,
    pub cancel: Option<Action>,
    pub duration: Option<Duration>,
    pub dismissible: Option<bool>,
    pub close_button: Option<bool>,
    pub rich_colors: Option<bool>,
    pub invert: Option<bool>,
    pub unstyled: Option<bool>,
    pub class_name: Option<String>,
    pub description_class_name: Option<String>,
    pub class_names: BTreeMap<String, String>,
    pub style: Map<String, Value>,
    pub position: Option<Position>,
    pub toaster_id: Option<String>,
    pub test_id: Option<String>,
    pub close_button_aria_label: Option<String>,
    pub on_dismiss: Option<ToastCallback>,
    pub on_auto_close: Option<ToastCallback>,
    pub extra: Map<String, Value>,
}

macro_rules! option_setters {
    ($($(#[$meta:meta])* $name:ident: $ty:ty),* $(,)?) => {
        $(
            $(#[$meta])*
            #[must_use]
            pub fn $name(mut self, value: impl Into<$ty>) -> Self {
                self.$name = Some(value.into());
                self
            }
        )*
    };
}

impl ToastOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    option_setters! {
        id: ToastId,
        description: Content,
        icon: Content,
        action: Action,
        cancel: Action,
        /// How long the renderer keeps the toast up before auto-closing.
        duration: Duration,
        dismissible: bool,
        close_button: bool,
        rich_colors: bool,
        invert: bool,
        unstyled: bool,
        class_name: String,
        description_class_name: String,
        position: Position,
        toaster_id: String,
        test_id: String,
        close_button_aria_label: String,
    }

    /// Add a class name for one toast slot (`"title"`, `"icon"`, ...).
    #[must_use]
    pub fn class_names(mut self, slot: impl Into<String>, class: impl Into<String>) -> Self {
        self.class_names.insert(slot.into(), class.into());
        self
    }

    /// Add one inline style property.
    #[must_use]
    pub fn style(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.style.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn on_dismiss(mut self, f: impl Fn(&Toast) + 'static) -> Self {
        self.on_dismiss = Some(ToastCallback::new(f));
        self
    }

    #[must_use]
    pub fn on_auto_close(mut self, f: impl Fn(&Toast) + 'static) -> Self {
        self.on_auto_close = Some(ToastCallback::new(f));
        self
    }

    /// Attach an opaque field for the renderer.
    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Merge these options over `toast`. The id is left alone.
    pub fn apply(self, toast: &mut Toast) {
        let Self {
            id: _,
            description,
            icon,
            action,
            cancel,
            duration,
            dismissible,
            close_button,
            rich_colors,
            invert,
            unstyled,
            class_name,
            description_class_name,
            class_names,
            style,
            position,
            toaster_id,
            test_id,
            close_button_aria_label,
            on_dismiss,
            on_auto_close,
            extra,
        } = self;

        macro_rules! merge {
            ($target:ident; $($field:ident),* $(,)?) => {
                $(
                    if let Some(value) = $field {
                        $target.$field = Some(value);
                    }
                )*
            };
        }

        merge!(
            toast;
            description,
            icon,
            action,
            cancel,
            duration,
            close_button,
            rich_colors,
            invert,
            unstyled,
            class_name,
            description_class_name,
            position,
            toaster_id,
            test_id,
            close_button_aria_label,
            on_dismiss,
            on_auto_close,
        );
        if let Some(dismissible) = dismissible {
            toast.dismissible = dismissible;
        }
        toast.class_names.extend(class_names);
        toast.style.extend(style);
        toast.extra.extend(extra);
    }
}

/// Data for `create`: a message, an optional type and the option bundle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToastPatch {
    /// Becomes the record's title. `None` clears it on update.
    pub message: Option<Content>,
    pub kind: Option<ToastType>,
    pub jsx: Option<RenderNode>,
    pub options: ToastOptions,
}

impl ToastPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<Content>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: ToastType) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn jsx(mut self, node: RenderNode) -> Self {
        self.jsx = Some(node);
        self
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<ToastId>) -> Self {
        self.options.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<Content>) -> Self {
        self.options.description = Some(description.into());
        self
    }

    /// Replace the option bundle wholesale.
    #[must_use]
    pub fn options(mut self, options: ToastOptions) -> Self {
        self.options = options;
        self
    }

    /// Merge this patch over an existing record.
    pub fn apply_to(self, toast: &mut Toast) {
        toast.title = self.message;
        if let Some(kind) = self.kind {
            toast.kind = kind;
        }
        if let Some(node) = self.jsx {
            toast.jsx = Some(node);
        }
        self.options.apply(toast);
    }

    /// Build a fresh record with the given id.
    #[must_use]
    pub fn into_toast(self, id: ToastId) -> Toast {
        let mut toast = Toast::new(id);
        self.apply_to(&mut toast);
        toast
    }
}

impl From<ToastOptions> for ToastPatch {
    fn from(options: ToastOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
