//=========================================================================
// Host Collaborators
//=========================================================================
//
// Contracts the popup system consumes from the surrounding application.
//
// Architecture:
//   Host
//     ├─ scene: Box<dyn SceneGraph>     (create/attach/destroy nodes)
//     ├─ animator: Box<dyn Animator>    (timed scale/opacity tweens)
//     └─ loader: Box<dyn AssetLoader>   (async template loading)
//
// Popups only ever see a PopupContext, a short-lived borrow of the scene
// graph and animator handed to them for the duration of a lifecycle call.
//
//=========================================================================

//=== Module Declarations =================================================

mod animation;
mod assets;
mod scene_graph;

pub mod headless;

//=== Public API ==========================================================

pub use animation::{Animator, Completion, CompletionSignal, Tween, TweenStep, TweenTarget};
pub use assets::{AssetLoader, LoadEvent, LoadReply, LoadResult, PopupTemplate, TemplateRef};
pub use scene_graph::{NodeId, SceneGraph, Size, Vec2};

use crate::core::popup::Closer;

//=== Host ================================================================

/// Owned bundle of the collaborators a [`crate::core::popup::PopupManager`]
/// drives.
pub struct Host {
    pub scene: Box<dyn SceneGraph>,
    pub animator: Box<dyn Animator>,
    pub loader: Box<dyn AssetLoader>,
}

impl Host {
    pub fn new<S, A, L>(scene: S, animator: A, loader: L) -> Self
    where
        S: SceneGraph + 'static,
        A: Animator + 'static,
        L: AssetLoader + 'static,
    {
        Self {
            scene: Box::new(scene),
            animator: Box::new(animator),
            loader: Box::new(loader),
        }
    }

    /// Borrows the scene graph and animator for a lifecycle call.
    pub fn context(&mut self) -> PopupContext<'_> {
        PopupContext {
            scene: self.scene.as_mut(),
            animator: self.animator.as_mut(),
            closer: None,
        }
    }
}

//=== PopupContext ========================================================

/// Capabilities available to a popup during a lifecycle call.
pub struct PopupContext<'a> {
    pub scene: &'a mut dyn SceneGraph,
    pub animator: &'a mut dyn Animator,

    /// Route back to the owning manager, when there is one.
    pub closer: Option<&'a Closer>,
}

impl<'a> PopupContext<'a> {
    pub fn new(scene: &'a mut dyn SceneGraph, animator: &'a mut dyn Animator) -> Self {
        Self {
            scene,
            animator,
            closer: None,
        }
    }

    pub fn with_closer(mut self, closer: &'a Closer) -> Self {
        self.closer = Some(closer);
        self
    }
}
