//=========================================================================
// Popup Base
//=========================================================================
//
// Reusable lifecycle state machine and default show animations.
//
// Concrete popups embed a PopupBase and forward the Popup trait to it,
// adding their own hooks around the calls. The base owns the popup's root
// node handle and the in-flight show completion.
//
// Default animations:
//   Scale: scale 0 → 1.1 (0.2s) → 1.0 (0.05s)
//   Fade:  opacity 0 → 255 (0.25s)
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::{CloseKind, Closer, PopupState};
use crate::core::host::{Completion, NodeId, PopupContext, SceneGraph, Tween, TweenTarget};

//=== Animation Presets ===================================================

const SCALE_OVERSHOOT: f32 = 1.1;
const SCALE_GROW_SECS: f32 = 0.2;
const SCALE_SETTLE_SECS: f32 = 0.05;
const FADE_SECS: f32 = 0.25;

/// Show animation played by [`PopupBase::animate_in`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AnimType {
    /// Bounce in from zero scale.
    #[default]
    Scale,

    /// Fade in from transparent.
    Fade,
}

impl AnimType {
    /// Tween played after the node has been reset to its start value.
    pub fn tween(self) -> Tween {
        match self {
            Self::Scale => Tween::new()
                .to(SCALE_GROW_SECS, TweenTarget::Scale(SCALE_OVERSHOOT))
                .to(SCALE_SETTLE_SECS, TweenTarget::Scale(1.0)),
            Self::Fade => Tween::new().to(FADE_SECS, TweenTarget::Opacity(255)),
        }
    }

    fn reset(self, scene: &mut dyn SceneGraph, node: NodeId) {
        match self {
            Self::Scale => scene.set_scale(node, 0.0),
            Self::Fade => scene.set_opacity(node, 0),
        }
    }
}

//=== PopupBase ===========================================================

/// Lifecycle bookkeeping shared by popup implementations.
///
/// # Defaults
///
/// - **Animation**: [`AnimType::Scale`]
/// - **Block input**: true (the popup swallows clicks aimed beneath it)
#[derive(Debug)]
pub struct PopupBase {
    node: NodeId,
    name: String,
    state: PopupState,
    animation: Option<AnimType>,
    block_input: bool,
    showing: Option<Completion>,
    closer: Option<Closer>,
}

impl PopupBase {
    //--- Construction -----------------------------------------------------

    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            name: String::new(),
            state: PopupState::Unshown,
            animation: Some(AnimType::Scale),
            block_input: true,
            showing: None,
            closer: None,
        }
    }

    pub fn with_animation(mut self, anim: AnimType) -> Self {
        self.animation = Some(anim);
        self
    }

    pub fn without_animation(mut self) -> Self {
        self.animation = None;
        self
    }

    pub fn with_block_input(mut self, block: bool) -> Self {
        self.block_input = block;
        self
    }

    /// Applies construction-time node settings.
    ///
    /// Call once right after building the base, before handing the popup
    /// to the manager. The node starts inactive.
    pub fn install(self, scene: &mut dyn SceneGraph) -> Self {
        scene.set_input_blocking(self.node, self.block_input);
        scene.set_active(self.node, false);
        self
    }

    //--- Accessors --------------------------------------------------------

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Name assigned by the manager at init; empty before that.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn animation(&self) -> Option<AnimType> {
        self.animation
    }

    pub fn blocks_input(&self) -> bool {
        self.block_input
    }

    /// Current state, reporting `Shown` as soon as the show animation has
    /// finished even if [`PopupBase::poll`] has not run yet.
    pub fn state(&self) -> PopupState {
        match (&self.state, &self.showing) {
            (PopupState::Showing, Some(done)) if done.is_done() => PopupState::Shown,
            (state, _) => *state,
        }
    }

    //--- Lifecycle --------------------------------------------------------

    pub fn init(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Activates the node and starts the configured show animation.
    pub fn animate_in(&mut self, ctx: &mut PopupContext<'_>) -> Completion {
        if self.state == PopupState::Removed {
            warn!(target: "popup", "Show requested for destroyed popup '{}'", self.name);
            return Completion::ready();
        }

        if let Some(closer) = ctx.closer {
            self.closer = Some(closer.clone());
        }
        ctx.scene.set_active(self.node, true);

        // Unanimated shows still pass through Showing; poll reports them once
        let Some(anim) = self.animation else {
            let done = Completion::ready();
            self.state = PopupState::Showing;
            self.showing = Some(done.clone());
            return done;
        };

        anim.reset(ctx.scene, self.node);
        let done = ctx.animator.animate(self.node, anim.tween());

        debug!(target: "popup", "Popup '{}' showing ({:?})", self.name, anim);
        self.state = PopupState::Showing;
        self.showing = Some(done.clone());
        done
    }

    /// Promotes `Showing` to `Shown` once the animation has finished.
    ///
    /// Returns true exactly once per show, on the call that observes the
    /// promotion, so wrappers can fire their "shown" hook.
    pub fn poll(&mut self) -> bool {
        if self.state == PopupState::Showing && self.state() == PopupState::Shown {
            self.state = PopupState::Shown;
            self.showing = None;
            return true;
        }
        false
    }

    /// Hides the node immediately.
    ///
    /// Returns true if the popup was active; hiding an inactive popup is a
    /// no-op. An in-flight show animation is abandoned.
    pub fn animate_out(&mut self, ctx: &mut PopupContext<'_>) -> bool {
        if !self.state.is_active() {
            return false;
        }

        self.state = PopupState::Hiding;
        self.showing = None;
        ctx.scene.set_active(self.node, false);
        self.state = PopupState::Hidden;
        true
    }

    //--- Self Dismissal ---------------------------------------------------

    /// Asks the owning manager to hide this popup on its next update.
    ///
    /// Returns false if the popup has never been shown by a manager.
    pub fn request_hide(&self) -> bool {
        self.request_close(CloseKind::Hide)
    }

    /// Asks the owning manager to hide, destroy and evict this popup.
    pub fn request_remove(&self) -> bool {
        self.request_close(CloseKind::Remove)
    }

    fn request_close(&self, kind: CloseKind) -> bool {
        match &self.closer {
            Some(closer) => closer.request(&self.name, kind),
            None => {
                warn!(target: "popup", "Popup '{}' asked to close before being shown", self.name);
                false
            }
        }
    }

    /// Hides (if needed) and destroys the node. Terminal.
    pub fn destroy(&mut self, ctx: &mut PopupContext<'_>) {
        if self.state == PopupState::Removed {
            return;
        }
        self.animate_out(ctx);
        ctx.scene.destroy(self.node);
        self.state = PopupState::Removed;
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::headless::{HeadlessScene, ManualAnimator};

    fn setup() -> (HeadlessScene, ManualAnimator, PopupBase) {
        let mut scene = HeadlessScene::default();
        let node = scene.create_node("Dialog");
        let base = PopupBase::new(node).install(&mut scene);
        (scene, ManualAnimator::new(), base)
    }

    //--- Construction Tests -----------------------------------------------

    #[test]
    fn install_applies_defaults() {
        let (scene, _, base) = setup();
        let record = scene.node(base.node()).unwrap();

        assert!(record.input_blocking);
        assert!(!record.active);
        assert_eq!(base.state(), PopupState::Unshown);
        assert_eq!(base.animation(), Some(AnimType::Scale));
    }

    //--- Show Tests -------------------------------------------------------

    #[test]
    fn scale_show_waits_for_animation() {
        let (mut scene, mut animator, mut base) = setup();
        let mut ctx = PopupContext::new(&mut scene, &mut animator);

        let done = base.animate_in(&mut ctx);
        assert_eq!(base.state(), PopupState::Showing);
        assert!(!done.is_done());
        assert_eq!(scene.node(base.node()).unwrap().scale, 0.0);
        assert!(scene.node(base.node()).unwrap().active);

        animator.finish_all();
        assert_eq!(base.state(), PopupState::Shown);
        assert!(base.poll());
        assert!(!base.poll(), "poll reports the promotion only once");
    }

    #[test]
    fn fade_show_resets_opacity() {
        let (mut scene, mut animator, base) = setup();
        let mut base = base.with_animation(AnimType::Fade);
        let mut ctx = PopupContext::new(&mut scene, &mut animator);

        base.animate_in(&mut ctx);

        assert_eq!(scene.node(base.node()).unwrap().opacity, 0);
        assert_eq!(animator.running(), 1);
    }

    #[test]
    fn unanimated_show_is_immediate() {
        let (mut scene, mut animator, base) = setup();
        let mut base = base.without_animation();
        let mut ctx = PopupContext::new(&mut scene, &mut animator);

        let done = base.animate_in(&mut ctx);

        assert!(done.is_done());
        assert_eq!(base.state(), PopupState::Shown);
        assert_eq!(animator.running(), 0);
        assert!(base.poll(), "unanimated shows are still reported once");
        assert!(!base.poll());
    }

    //--- Hide Tests -------------------------------------------------------

    #[test]
    fn hide_during_show_abandons_animation() {
        let (mut scene, mut animator, mut base) = setup();
        let mut ctx = PopupContext::new(&mut scene, &mut animator);

        base.animate_in(&mut ctx);
        assert!(base.animate_out(&mut ctx));

        assert_eq!(base.state(), PopupState::Hidden);
        animator.finish_all();
        assert_eq!(base.state(), PopupState::Hidden, "late completion must not revive");
        assert!(!base.poll());
    }

    #[test]
    fn hide_when_hidden_is_noop() {
        let (mut scene, mut animator, mut base) = setup();
        let mut ctx = PopupContext::new(&mut scene, &mut animator);

        assert!(!base.animate_out(&mut ctx));
        assert_eq!(base.state(), PopupState::Unshown);
    }

    //--- Self Dismissal Tests ---------------------------------------------

    #[test]
    fn close_requests_need_a_manager_route() {
        let (mut scene, mut animator, mut base) = setup();
        base.init("Dialog");
        assert!(!base.request_hide(), "never shown by a manager");

        let (tx, rx) = crossbeam_channel::unbounded();
        let closer = Closer::new(tx);
        let mut ctx = PopupContext::new(&mut scene, &mut animator).with_closer(&closer);
        base.animate_in(&mut ctx);

        assert!(base.request_remove());
        let request = rx.try_recv().unwrap();
        assert_eq!(request.name, "Dialog");
        assert_eq!(request.kind, CloseKind::Remove);
    }

    //--- Destroy Tests ----------------------------------------------------

    #[test]
    fn destroy_removes_node_and_is_terminal() {
        let (mut scene, mut animator, mut base) = setup();
        let mut ctx = PopupContext::new(&mut scene, &mut animator);

        base.animate_in(&mut ctx);
        base.destroy(&mut ctx);
        base.destroy(&mut ctx);

        assert_eq!(base.state(), PopupState::Removed);
        assert!(scene.node(base.node()).is_none());

        let mut ctx = PopupContext::new(&mut scene, &mut animator);
        assert!(base.animate_in(&mut ctx).is_done());
        assert_eq!(base.state(), PopupState::Removed);
    }
}
