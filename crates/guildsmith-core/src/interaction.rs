//! Interactive surface types
//!
//! Messages, buttons, select menus and the decision events they produce.
//! The platform layer renders these; the engine only describes them.

use crate::types::UserId;
use serde::{Deserialize, Serialize};

/// Who can see a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Visibility {
    /// Only the invoking member
    #[default]
    Ephemeral,
    /// Everyone in the channel
    Public,
}

/// Button style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlStyle {
    /// Green
    Success,
    /// Red
    Danger,
    /// Grey
    Secondary,
}

/// A clickable button
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
    /// Identifier echoed back in [`DecisionEvent::control_id`]
    pub custom_id: String,
    /// Label shown on the button
    pub label: String,
    /// Visual style
    pub style: ControlStyle,
}

impl Control {
    /// Create a button
    #[inline]
    #[must_use]
    pub fn new(custom_id: impl Into<String>, label: impl Into<String>, style: ControlStyle) -> Self {
        Self {
            custom_id: custom_id.into(),
            label: label.into(),
            style,
        }
    }
}

/// A string select menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectMenu {
    /// Identifier echoed back with the selection
    pub custom_id: String,
    /// Placeholder text
    pub placeholder: String,
    /// Selectable values (label == value)
    pub options: Vec<String>,
    /// Minimum number of picks
    pub min_values: u8,
    /// Maximum number of picks
    pub max_values: u8,
}

impl SelectMenu {
    /// Single-choice menu
    #[must_use]
    pub fn single(custom_id: impl Into<String>, placeholder: impl Into<String>, options: &[&str]) -> Self {
        Self {
            custom_id: custom_id.into(),
            placeholder: placeholder.into(),
            options: options.iter().map(|o| (*o).to_string()).collect(),
            min_values: 1,
            max_values: 1,
        }
    }

    /// Allow picking up to `max` values
    #[inline]
    #[must_use]
    pub fn with_max(mut self, max: u8) -> Self {
        self.max_values = max.max(self.min_values);
        self
    }
}

/// A message or reply body
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Message {
    /// Text content
    pub content: String,
    /// Buttons, in one row
    pub controls: Vec<Control>,
    /// Select menus, one per row
    pub menus: Vec<SelectMenu>,
}

impl Message {
    /// Plain text message
    #[inline]
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Add a button
    #[inline]
    #[must_use]
    pub fn with_control(mut self, control: Control) -> Self {
        self.controls.push(control);
        self
    }

    /// Add a select menu
    #[inline]
    #[must_use]
    pub fn with_menu(mut self, menu: SelectMenu) -> Self {
        self.menus.push(menu);
        self
    }
}

/// A button press delivered by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionEvent {
    /// Member who pressed the control
    pub user: UserId,
    /// [`Control::custom_id`] of the pressed control
    pub control_id: String,
}

impl DecisionEvent {
    /// Create decision event
    #[inline]
    #[must_use]
    pub fn new(user: UserId, control_id: impl Into<String>) -> Self {
        Self {
            user,
            control_id: control_id.into(),
        }
    }
}

/// Member issuing a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoker {
    /// Member identity
    pub user: UserId,
    /// Holds the administrator permission in the workspace
    pub administrator: bool,
}

impl Invoker {
    /// Operator with administrator rights
    #[inline]
    #[must_use]
    pub fn admin(user: UserId) -> Self {
        Self {
            user,
            administrator: true,
        }
    }

    /// Regular member
    #[inline]
    #[must_use]
    pub fn member(user: UserId) -> Self {
        Self {
            user,
            administrator: false,
        }
    }
}
