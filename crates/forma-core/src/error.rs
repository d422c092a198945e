//! Error types for forma.

use std::fmt;

/// The main error type for forma operations.
///
/// Almost every variant describes a programmer-misuse condition. Operations
/// that detect one log it and leave all state untouched, so receiving an
/// error never means a form is half-modified.
#[derive(Debug)]
pub enum FormsError {
    /// The widget handle is stale or was never issued.
    WidgetNotFound,
    /// The form handle is stale or was never issued.
    FormNotFound,
    /// The widget already belongs to a form.
    AlreadyAttached,
    /// The operation needs a widget that is attached to a form.
    NotAttached,
    /// Group markers cannot be attached, inserted or targeted directly.
    GroupMarker,
    /// A group was opened while another group of the same form is still open.
    NestedGroup,
    /// A group operation was requested but no group is open.
    NoOpenGroup,
    /// An end-of-group marker cannot be removed while the group has members.
    GroupNotEmpty,
    /// The form was unfrozen more often than it was frozen.
    NotFrozen,
    /// The widget is not of the class the operation expects.
    WrongClass {
        /// What the operation needed.
        expected: &'static str,
    },
    /// A widget cannot become its own ancestor.
    CircularParent,
    /// An animated cursor handle with no frames behind it.
    EmptyCursorAnimation,
    /// A line index past the end of a textbox.
    LineOutOfRange {
        index: usize,
        len: usize,
    },
    /// Timer-related error.
    Timer(TimerError),
    /// Configuration-related error.
    Config(ConfigError),
}

impl fmt::Display for FormsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WidgetNotFound => write!(f, "Widget not found or already freed"),
            Self::FormNotFound => write!(f, "Form not found or already freed"),
            Self::AlreadyAttached => write!(f, "Widget already belongs to a form"),
            Self::NotAttached => write!(f, "Widget does not belong to a form"),
            Self::GroupMarker => {
                write!(f, "Can't use a pseudo-widget marking the start or end of a group here")
            }
            Self::NestedGroup => write!(f, "Groups can't be nested"),
            Self::NoOpenGroup => write!(f, "No group is currently open"),
            Self::GroupNotEmpty => {
                write!(f, "Can't remove end of group marker while the group still has members")
            }
            Self::NotFrozen => write!(f, "Unfreezing a form that isn't frozen"),
            Self::WrongClass { expected } => write!(f, "Widget is not a {expected}"),
            Self::CircularParent => write!(f, "Widget can't become its own ancestor"),
            Self::EmptyCursorAnimation => write!(f, "Animated cursor has no frames"),
            Self::LineOutOfRange { index, len } => {
                write!(f, "Line {index} is out of range, the textbox has {len} lines")
            }
            Self::Timer(err) => write!(f, "Timer error: {err}"),
            Self::Config(err) => write!(f, "Configuration error: {err}"),
        }
    }
}

impl std::error::Error for FormsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Timer(err) => Some(err),
            Self::Config(err) => Some(err),
            _ => None,
        }
    }
}

/// Timer-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// The timer ID is invalid or has already been removed.
    InvalidTimerId,
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTimerId => write!(f, "Invalid or expired timer ID"),
        }
    }
}

impl std::error::Error for TimerError {}

/// Errors raised while loading a [`FormsConfig`](crate::FormsConfig).
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    Io(std::io::Error),
    /// The configuration text is not valid TOML for the config schema.
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "Failed to read configuration: {err}"),
            Self::Parse(err) => write!(f, "Failed to parse configuration: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err)
    }
}

impl From<TimerError> for FormsError {
    fn from(err: TimerError) -> Self {
        Self::Timer(err)
    }
}

impl From<ConfigError> for FormsError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// A specialized Result type for forma operations.
pub type Result<T> = std::result::Result<T, FormsError>;
