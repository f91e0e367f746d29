//! Policy parameters: the structured output of the narrative translator.
//!
//! RULE: Parameters are loaded once, before the engine is built, and are
//! immutable for the run. A missing field never fails a tick: it reads
//! as "feature disabled" (no teleport, no spawn bias, unbounded vision).
//!
//! `location_restriction` and `inactive_windows` are carried and
//! serialised but not enforced. Enforcement, if it ever lands, goes
//! through `PolicyHooks`.

use crate::{
    entity::{PlayerName, Vision},
    error::{SimError, SimResult},
    types::{NodeId, Tick},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One optional value per player, keyed `"A"` / `"B"` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerPlayer<T> {
    #[serde(rename = "A")]
    pub a: Option<T>,
    #[serde(rename = "B")]
    pub b: Option<T>,
}

impl<T> Default for PerPlayer<T> {
    fn default() -> Self {
        Self { a: None, b: None }
    }
}

impl<T> PerPlayer<T> {
    pub fn new(a: Option<T>, b: Option<T>) -> Self {
        Self { a, b }
    }

    pub fn get(&self, name: PlayerName) -> Option<&T> {
        match name {
            PlayerName::A => self.a.as_ref(),
            PlayerName::B => self.b.as_ref(),
        }
    }

    fn get_mut(&mut self, name: PlayerName) -> Option<&mut T> {
        match name {
            PlayerName::A => self.a.as_mut(),
            PlayerName::B => self.b.as_mut(),
        }
    }
}

/// Two opposite corners `[[x1, y1], [x2, y2]]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox(pub [f64; 2], pub [f64; 2]);

/// `[start, end]` tick pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InactiveWindow(pub Tick, pub Tick);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PolicyParameters {
    #[serde(default)]
    pub teleport_access:      Option<PerPlayer<bool>>,
    /// Probability in [0, 1] that a tick's spawn lands near the player.
    #[serde(default)]
    pub spawn_bias:           Option<PerPlayer<f64>>,
    #[serde(default)]
    pub location_restriction: Option<PerPlayer<BoundingBox>>,
    #[serde(default)]
    pub vision_radius:        Option<PerPlayer<f64>>,
    #[serde(default)]
    pub inactive_windows:     Option<PerPlayer<InactiveWindow>>,
}

impl PolicyParameters {
    pub fn from_json(json: &str) -> SimResult<Self> {
        let raw: PolicyParameters = serde_json::from_str(json)?;
        raw.validated()
    }

    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Clamp spawn-bias weights into [0, 1]; reject unusable vision radii.
    pub fn validated(mut self) -> SimResult<Self> {
        if let Some(bias) = self.spawn_bias.as_mut() {
            for name in PlayerName::ALL {
                if let Some(w) = bias.get_mut(name) {
                    if !w.is_finite() {
                        return Err(SimError::InvalidPolicy(format!(
                            "spawn_bias for {name} is not a number"
                        )));
                    }
                    if !(0.0..=1.0).contains(w) {
                        log::warn!("spawn_bias for {name} = {w} outside [0, 1]; clamping");
                        *w = w.clamp(0.0, 1.0);
                    }
                }
            }
        }
        if let Some(vision) = &self.vision_radius {
            for name in PlayerName::ALL {
                if let Some(&r) = vision.get(name) {
                    if !r.is_finite() || r < 0.0 {
                        return Err(SimError::InvalidPolicy(format!(
                            "vision_radius for {name} must be finite and >= 0, got {r}"
                        )));
                    }
                }
            }
        }
        Ok(self)
    }

    pub fn teleport_access(&self, name: PlayerName) -> bool {
        self.teleport_access
            .as_ref()
            .and_then(|t| t.get(name))
            .copied()
            .unwrap_or(false)
    }

    pub fn spawn_bias(&self, name: PlayerName) -> Option<f64> {
        self.spawn_bias.as_ref().and_then(|b| b.get(name)).copied()
    }

    pub fn vision(&self, name: PlayerName) -> Vision {
        self.vision_radius
            .as_ref()
            .and_then(|v| v.get(name))
            .map(|&r| Vision::Radius(r))
            .unwrap_or(Vision::Unbounded)
    }

    pub fn location_restriction(&self, name: PlayerName) -> Option<BoundingBox> {
        self.location_restriction
            .as_ref()
            .and_then(|l| l.get(name))
            .copied()
    }

    pub fn inactive_window(&self, name: PlayerName) -> Option<InactiveWindow> {
        self.inactive_windows
            .as_ref()
            .and_then(|w| w.get(name))
            .copied()
    }
}

/// Movement gates consulted every tick. Both default to "allowed".
pub trait PolicyHooks: Send {
    /// May `player` step onto `node` this tick?
    fn can_enter(&self, _player: PlayerName, _node: NodeId) -> bool {
        true
    }

    /// Does `player` act at all during `tick`?
    fn is_active(&self, _player: PlayerName, _tick: Tick) -> bool {
        true
    }
}

/// The default: nothing is gated.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unrestricted;

impl PolicyHooks for Unrestricted {}
