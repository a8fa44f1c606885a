//! Paired viewport state with per-field synchronization
//!
//! Two viewports ("left" and "right") share a [`SyncPolicy`]. An update to
//! one side is applied to it and, when the policy allows, the changed fields
//! are copied to the other side. Propagation runs one way per call.

use serde::Serialize;
use std::fmt;

use crate::types::WindowLevel;

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 10.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Translation {
    pub x: f64,
    pub y: f64,
}

impl Translation {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Display transform of a single viewer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub scale: f64,
    pub translation: Translation,
    /// Degrees
    pub rotation: f64,
    pub window_width: Option<f64>,
    pub window_center: Option<f64>,
    pub slice_index: usize,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translation: Translation::default(),
            rotation: 0.0,
            window_width: None,
            window_center: None,
            slice_index: 0,
        }
    }
}

impl Viewport {
    /// Window for the pixel decoder, when both halves are set
    #[must_use]
    pub fn window_level(&self) -> Option<WindowLevel> {
        Some(WindowLevel::new(self.window_center?, self.window_width?))
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "scale={scale} pan=({x},{y}) rotation={rotation} slice={slice}",
            scale = self.scale,
            x = self.translation.x,
            y = self.translation.y,
            rotation = self.rotation,
            slice = self.slice_index,
        )?;
        if let Some(window) = self.window_level() {
            write!(f, " {window}")?;
        }
        Ok(())
    }
}

/// Which fields follow the other viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncPolicy {
    pub enabled: bool,
    pub sync_scroll: bool,
    pub sync_pan: bool,
    pub sync_zoom: bool,
    pub sync_window_level: bool,
    pub sync_rotation: bool,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            sync_scroll: true,
            sync_pan: true,
            sync_zoom: true,
            sync_window_level: true,
            sync_rotation: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Partial viewport change; `None` fields are left as they are
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewportUpdate {
    pub scale: Option<f64>,
    pub translation: Option<Translation>,
    pub rotation: Option<f64>,
    /// A non-positive width clears the window
    pub window_width: Option<f64>,
    pub window_center: Option<f64>,
    pub slice_index: Option<usize>,
}

impl ViewportUpdate {
    fn apply_to(&self, viewport: &mut Viewport) {
        if let Some(scale) = self.scale.filter(|s| s.is_finite()) {
            viewport.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        }
        if let Some(translation) = self.translation {
            viewport.translation = translation;
        }
        if let Some(rotation) = self.rotation {
            viewport.rotation = rotation;
        }
        if let Some(width) = self.window_width {
            viewport.window_width = (width > 0.0).then_some(width);
        }
        if let Some(center) = self.window_center {
            viewport.window_center = Some(center);
        }
        if let Some(slice_index) = self.slice_index {
            viewport.slice_index = slice_index;
        }
    }

    #[inline]
    fn touches_window(&self) -> bool {
        self.window_width.is_some() || self.window_center.is_some()
    }
}

/// Two viewports kept in step according to a [`SyncPolicy`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewportSync {
    left: Viewport,
    right: Viewport,
    policy: SyncPolicy,
}

impl ViewportSync {
    #[must_use]
    pub fn new(policy: SyncPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn viewport(&self, side: Side) -> &Viewport {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    fn viewport_mut(&mut self, side: Side) -> &mut Viewport {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    #[must_use]
    pub fn policy(&self) -> SyncPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: SyncPolicy) {
        self.policy = policy;
    }

    /// Apply `update` to `side` and propagate the allowed fields
    pub fn update_viewport(&mut self, side: Side, update: &ViewportUpdate) {
        update.apply_to(self.viewport_mut(side));

        if !self.policy.enabled {
            return;
        }

        let source = *self.viewport(side);
        let policy = self.policy;
        let target = self.viewport_mut(side.other());

        if policy.sync_zoom && update.scale.is_some() {
            target.scale = source.scale;
        }
        if policy.sync_pan && update.translation.is_some() {
            target.translation = source.translation;
        }
        if policy.sync_rotation && update.rotation.is_some() {
            target.rotation = source.rotation;
        }
        if policy.sync_window_level && update.touches_window() {
            target.window_width = source.window_width;
            target.window_center = source.window_center;
        }
        if policy.sync_scroll && update.slice_index.is_some() {
            target.slice_index = source.slice_index;
        }
    }

    /// Both viewports back to the default transform, slice 0
    pub fn reset_viewports(&mut self) {
        self.left = Viewport::default();
        self.right = Viewport::default();
    }

    pub fn next_slice(&mut self, side: Side) {
        let slice_index = self.viewport(side).slice_index.saturating_add(1);
        self.update_viewport(
            side,
            &ViewportUpdate {
                slice_index: Some(slice_index),
                ..ViewportUpdate::default()
            },
        );
    }

    /// No-op at slice 0
    pub fn previous_slice(&mut self, side: Side) {
        let Some(slice_index) = self.viewport(side).slice_index.checked_sub(1) else {
            return;
        };
        self.update_viewport(
            side,
            &ViewportUpdate {
                slice_index: Some(slice_index),
                ..ViewportUpdate::default()
            },
        );
    }
}
