//=========================================================================
// Input Guard
//=========================================================================
//
// Full-screen blocking surface between the scene and the popup layer.
//
// The guard goes up the moment a show/hide request enters arbitration
// and comes down only once every tracked show animation and load has
// finished and no popup remains open.
//
// Routing:
//   guard down                   → Scene
//   guard up, transition pending → Blocked (releases still reach Scene)
//   guard up, settled            → Overlay
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

use log::trace;

//=== Internal Dependencies ===============================================

use super::PopupName;
use crate::core::host::{Completion, NodeId, SceneGraph};
use crate::core::input::InputEvent;

//=== InputRoute ==========================================================

/// Where an input event should be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRoute {
    /// Nothing covers the scene; deliver normally.
    Scene,

    /// Popups are open and idle; deliver to the popup layer only.
    Overlay,

    /// A transition is in flight; drop the event.
    Blocked,
}

//=== InputGuard ==========================================================

/// The blocking surface and the transitions keeping it up.
#[derive(Debug, Default)]
pub struct InputGuard {
    node: Option<NodeId>,
    active: bool,
    transitions: HashMap<PopupName, Completion>,
    loads_in_flight: usize,
}

impl InputGuard {
    pub fn new() -> Self {
        Self::default()
    }

    //--- Surface ----------------------------------------------------------

    /// Creates the surface node under `parent`, sized to the visible
    /// area, behind every popup and initially inactive.
    pub fn install(&mut self, scene: &mut dyn SceneGraph, parent: NodeId, name: &str) {
        let size = scene.visible_size();
        let node = scene.create_node(name);

        scene.attach(node, parent);
        scene.set_size(node, size);
        scene.set_priority(node, i32::MIN);
        scene.set_input_blocking(node, true);
        scene.set_active(node, false);

        self.node = Some(node);
        self.active = false;
    }

    /// Destroys the surface node and forgets all transitions.
    pub fn uninstall(&mut self, scene: &mut dyn SceneGraph) {
        if let Some(node) = self.node.take() {
            scene.destroy(node);
        }
        self.active = false;
        self.transitions.clear();
        self.loads_in_flight = 0;
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    //--- Activation -------------------------------------------------------

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Raises or lowers the guard. Setting the current value is a no-op.
    pub fn set_active(&mut self, scene: &mut dyn SceneGraph, active: bool) {
        if self.active == active {
            return;
        }
        self.active = active;
        if let Some(node) = self.node {
            scene.set_active(node, active);
        }
        trace!(target: "popup::guard", "Input guard {}", if active { "up" } else { "down" });
    }

    //--- Transitions ------------------------------------------------------

    /// Keeps the guard up until `done` resolves or `name` is forgotten.
    pub fn track(&mut self, name: &str, done: Completion) {
        self.transitions.insert(name.to_string(), done);
    }

    pub fn forget(&mut self, name: &str) {
        self.transitions.remove(name);
    }

    pub fn forget_all(&mut self) {
        self.transitions.clear();
    }

    /// Drops finished transitions, returning their names.
    pub fn poll(&mut self) -> Vec<PopupName> {
        let finished: Vec<PopupName> = self
            .transitions
            .iter()
            .filter(|(_, done)| done.is_done())
            .map(|(name, _)| name.clone())
            .collect();

        for name in &finished {
            self.transitions.remove(name);
        }
        finished
    }

    pub fn set_loads_in_flight(&mut self, count: usize) {
        self.loads_in_flight = count;
    }

    /// Whether any animation or load is still pending.
    pub fn is_transitioning(&self) -> bool {
        !self.transitions.is_empty() || self.loads_in_flight > 0
    }

    /// Once nothing is pending, leaves the guard up only if popups are
    /// open. Does nothing while a transition is still in flight.
    pub fn settle(&mut self, scene: &mut dyn SceneGraph, popups_open: bool) {
        if !self.is_transitioning() {
            self.set_active(scene, popups_open);
        }
    }

    //--- Routing ----------------------------------------------------------

    pub fn route(&self, event: &InputEvent) -> InputRoute {
        let route = if !self.active {
            InputRoute::Scene
        } else if self.is_transitioning() {
            // Releases must reach the layer that saw the press
            if event.is_release() {
                InputRoute::Scene
            } else {
                InputRoute::Blocked
            }
        } else {
            InputRoute::Overlay
        };

        trace!(target: "popup::guard", "{:?} → {:?}", event, route);
        route
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
