//=========================================================================
// Headless Host
//=========================================================================
//
// In-memory collaborators for running the popup system without a
// renderer: servers, replay tools, and tests.
//
// Components:
// - `HeadlessScene`: records nodes and their properties
// - `ImmediateAnimator`: applies final tween values, resolves at once
// - `ManualAnimator`: parks tweens until the caller finishes them
// - `QueuedLoader`: parks load requests until the caller completes them
//
// All three are cheap-to-clone handles over shared state, so a caller can
// keep one clone for inspection and box the other into a `Host`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use log::trace;

//=== Internal Dependencies ===============================================

use super::{
    Animator, AssetLoader, Completion, CompletionSignal, LoadReply, NodeId, SceneGraph, Size,
    TemplateRef, Tween, Vec2,
};

//=== HeadlessScene =======================================================

/// Snapshot of a node's recorded properties.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub name: String,
    pub parent: Option<NodeId>,
    pub active: bool,
    pub position: Vec2,
    pub size: Size,
    pub priority: i32,
    pub scale: f32,
    pub opacity: u8,
    pub input_blocking: bool,
}

impl NodeRecord {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            active: true,
            position: Vec2::default(),
            size: Size::default(),
            priority: 0,
            scale: 1.0,
            opacity: 255,
            input_blocking: false,
        }
    }
}

#[derive(Debug, Default)]
struct SceneState {
    next_id: u64,
    nodes: HashMap<NodeId, NodeRecord>,
    visible: Size,
}

/// Scene graph that only records what it is told.
#[derive(Debug, Clone)]
pub struct HeadlessScene {
    state: Rc<RefCell<SceneState>>,
}

impl HeadlessScene {
    pub fn new(visible: Size) -> Self {
        Self {
            state: Rc::new(RefCell::new(SceneState {
                visible,
                ..SceneState::default()
            })),
        }
    }

    /// Returns a copy of the node's record, if it still exists.
    pub fn node(&self, node: NodeId) -> Option<NodeRecord> {
        self.state.borrow().nodes.get(&node).cloned()
    }

    /// Finds a live node by name.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        let state = self.state.borrow();
        let mut ids: Vec<_> = state
            .nodes
            .iter()
            .filter(|(_, record)| record.name == name)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids.first().copied()
    }

    pub fn node_count(&self) -> usize {
        self.state.borrow().nodes.len()
    }

    fn with_node(&self, node: NodeId, f: impl FnOnce(&mut NodeRecord)) {
        if let Some(record) = self.state.borrow_mut().nodes.get_mut(&node) {
            f(record);
        }
    }
}

impl Default for HeadlessScene {
    fn default() -> Self {
        Self::new(Size::new(1280.0, 720.0))
    }
}

impl SceneGraph for HeadlessScene {
    fn create_node(&mut self, name: &str) -> NodeId {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = NodeId(state.next_id);
        state.nodes.insert(id, NodeRecord::new(name));
        id
    }

    fn attach(&mut self, node: NodeId, parent: NodeId) {
        self.with_node(node, |r| r.parent = Some(parent));
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.state.borrow().nodes.get(&node).and_then(|r| r.parent)
    }

    fn set_active(&mut self, node: NodeId, active: bool) {
        self.with_node(node, |r| r.active = active);
    }

    fn is_active(&self, node: NodeId) -> bool {
        self.state
            .borrow()
            .nodes
            .get(&node)
            .map(|r| r.active)
            .unwrap_or(false)
    }

    fn place(&mut self, node: NodeId, position: Vec2) {
        self.with_node(node, |r| r.position = position);
    }

    fn set_size(&mut self, node: NodeId, size: Size) {
        self.with_node(node, |r| r.size = size);
    }

    fn set_priority(&mut self, node: NodeId, priority: i32) {
        self.with_node(node, |r| r.priority = priority);
    }

    fn set_scale(&mut self, node: NodeId, scale: f32) {
        self.with_node(node, |r| r.scale = scale);
    }

    fn set_opacity(&mut self, node: NodeId, opacity: u8) {
        self.with_node(node, |r| r.opacity = opacity);
    }

    fn set_input_blocking(&mut self, node: NodeId, blocking: bool) {
        self.with_node(node, |r| r.input_blocking = blocking);
    }

    fn destroy(&mut self, node: NodeId) {
        let mut state = self.state.borrow_mut();
        state.nodes.remove(&node);

        // Destroy the subtree as well
        let mut orphans: Vec<NodeId> = vec![node];
        while let Some(parent) = orphans.pop() {
            let children: Vec<NodeId> = state
                .nodes
                .iter()
                .filter(|(_, r)| r.parent == Some(parent))
                .map(|(id, _)| *id)
                .collect();
            for child in children {
                state.nodes.remove(&child);
                orphans.push(child);
            }
        }
    }

    fn visible_size(&self) -> Size {
        self.state.borrow().visible
    }
}

//=== ImmediateAnimator ===================================================

/// Animator that jumps straight to each tween's final values.
///
/// Only useful paired with the scene it writes to.
#[derive(Debug, Clone)]
pub struct ImmediateAnimator {
    scene: HeadlessScene,
}

impl ImmediateAnimator {
    pub fn new(scene: HeadlessScene) -> Self {
        Self { scene }
    }
}

impl Animator for ImmediateAnimator {
    fn animate(&mut self, node: NodeId, tween: Tween) -> Completion {
        trace!(target: "popup", "Immediate tween on {:?} ({:.2}s skipped)", node, tween.duration());
        if let Some(scale) = tween.final_scale() {
            self.scene.set_scale(node, scale);
        }
        if let Some(opacity) = tween.final_opacity() {
            self.scene.set_opacity(node, opacity);
        }
        Completion::ready()
    }
}

//=== ManualAnimator ======================================================

/// Animator that holds every tween until explicitly finished.
#[derive(Debug, Clone, Default)]
pub struct ManualAnimator {
    running: Rc<RefCell<VecDeque<(NodeId, Tween, CompletionSignal)>>>,
}

impl ManualAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tweens still playing.
    pub fn running(&self) -> usize {
        self.running.borrow().len()
    }

    /// Nodes with a tween still playing, oldest first.
    pub fn running_nodes(&self) -> Vec<NodeId> {
        self.running.borrow().iter().map(|(node, _, _)| *node).collect()
    }

    /// Finishes the oldest running tween. Returns false if none was running.
    pub fn finish_next(&self) -> bool {
        let next = self.running.borrow_mut().pop_front();
        match next {
            Some((_, _, signal)) => {
                signal.fire();
                true
            }
            None => false,
        }
    }

    /// Finishes every running tween.
    pub fn finish_all(&self) {
        while self.finish_next() {}
    }
}

impl Animator for ManualAnimator {
    fn animate(&mut self, node: NodeId, tween: Tween) -> Completion {
        let (signal, completion) = Completion::pair();
        self.running.borrow_mut().push_back((node, tween, signal));
        completion
    }
}

//=== QueuedLoader ========================================================

#[derive(Default)]
struct LoaderState {
    assets: HashMap<String, TemplateRef>,
    requests: VecDeque<LoadReply>,
    issued: usize,
}

/// Loader that serves registered templates when told to.
///
/// Requests for unregistered paths fail when completed.
#[derive(Clone, Default)]
pub struct QueuedLoader {
    state: Rc<RefCell<LoaderState>>,
}

impl QueuedLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the template served for `path`.
    pub fn insert(&self, path: impl Into<String>, template: TemplateRef) {
        self.state.borrow_mut().assets.insert(path.into(), template);
    }

    /// Number of requests waiting for completion.
    pub fn pending(&self) -> usize {
        self.state.borrow().requests.len()
    }

    /// Total number of load requests ever received.
    pub fn issued(&self) -> usize {
        self.state.borrow().issued
    }

    /// Completes the oldest waiting request. Returns false if none waited.
    pub fn complete_next(&self) -> bool {
        let (reply, asset) = {
            let mut state = self.state.borrow_mut();
            let Some(reply) = state.requests.pop_front() else {
                return false;
            };
            let asset = state.assets.get(reply.path()).cloned();
            (reply, asset)
        };

        let result = asset.ok_or_else(|| format!("no asset registered at '{}'", reply.path()));
        reply.complete(result);
        true
    }

    /// Completes every waiting request.
    pub fn complete_all(&self) {
        while self.complete_next() {}
    }

    /// Fails the oldest waiting request with `reason`.
    pub fn fail_next(&self, reason: &str) -> bool {
        let next = self.state.borrow_mut().requests.pop_front();
        match next {
            Some(reply) => {
                reply.complete(Err(reason.to_string()));
                true
            }
            None => false,
        }
    }
}

impl AssetLoader for QueuedLoader {
    fn load(&mut self, path: &str, reply: LoadReply) {
        trace!(target: "popup::assets", "Queued load for '{}'", path);
        let mut state = self.state.borrow_mut();
        state.issued += 1;
        state.requests.push_back(reply);
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::TweenTarget;

    //--- HeadlessScene Tests ----------------------------------------------

    #[test]
    fn scene_records_node_properties() {
        let mut scene = HeadlessScene::default();
        let root = scene.create_node("Root");
        let child = scene.create_node("Child");

        scene.attach(child, root);
        scene.set_active(child, false);
        scene.set_priority(child, 5);

        let record = scene.node(child).unwrap();
        assert_eq!(record.parent, Some(root));
        assert!(!record.active);
        assert_eq!(record.priority, 5);
        assert_eq!(scene.find("Child"), Some(child));
    }

    #[test]
    fn destroy_removes_subtree() {
        let mut scene = HeadlessScene::default();
        let root = scene.create_node("Root");
        let child = scene.create_node("Child");
        let grandchild = scene.create_node("Grandchild");
        scene.attach(child, root);
        scene.attach(grandchild, child);

        scene.destroy(root);

        assert_eq!(scene.node_count(), 0);
    }

    #[test]
    fn clones_share_state() {
        let mut scene = HeadlessScene::default();
        let observer = scene.clone();
        let node = scene.create_node("Shared");
        assert!(observer.node(node).is_some());
    }

    //--- Animator Tests ---------------------------------------------------

    #[test]
    fn immediate_animator_applies_final_values() {
        let mut scene = HeadlessScene::default();
        let node = scene.create_node("Anim");
        scene.set_scale(node, 0.0);
        let mut animator = ImmediateAnimator::new(scene.clone());

        let done = animator.animate(
            node,
            Tween::new().to(0.2, TweenTarget::Scale(1.1)).to(0.05, TweenTarget::Scale(1.0)),
        );

        assert!(done.is_done());
        assert_eq!(scene.node(node).unwrap().scale, 1.0);
    }

    #[test]
    fn manual_animator_holds_until_finished() {
        let mut animator = ManualAnimator::new();
        let done = animator.animate(NodeId(1), Tween::new().to(0.25, TweenTarget::Opacity(255)));

        assert_eq!(animator.running(), 1);
        assert!(!done.is_done());

        assert!(animator.finish_next());
        assert!(done.is_done());
        assert!(!animator.finish_next());
    }

    //--- Loader Tests -----------------------------------------------------

    #[test]
    fn loader_fails_unregistered_paths() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut loader = QueuedLoader::new();
        loader.load("ui/missing", LoadReply::new("ui/missing", 3, tx));

        assert_eq!(loader.pending(), 1);
        assert!(loader.complete_next());

        let event = rx.try_recv().unwrap();
        assert_eq!(event.path, "ui/missing");
        assert_eq!(event.generation, 3);
        assert!(event.result.is_err());
    }
}
