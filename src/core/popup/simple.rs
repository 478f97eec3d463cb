//=========================================================================
// Simple Popup
//=========================================================================
//
// Ready-made popup and template built on PopupBase.
//
// SimplePopup carries the caller's params and optional hooks:
//   on_init  → first show, before animating
//   on_show  → show animation finished
//   on_hide  → popup hidden
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::atomic::{AtomicUsize, Ordering};

//=== Internal Dependencies ===============================================

use super::{AnimType, Params, Popup, PopupBase, PopupState};
use crate::core::host::{Completion, NodeId, PopupContext, PopupTemplate, SceneGraph};

//=== Hooks ===============================================================

type Hook = Box<dyn FnMut(&str)>;

#[derive(Default)]
struct Hooks {
    on_init: Option<Hook>,
    on_show: Option<Hook>,
    on_hide: Option<Hook>,
}

fn fire(hook: &mut Option<Hook>, name: &str) {
    if let Some(hook) = hook.as_mut() {
        hook(name);
    }
}

//=== SimplePopup =========================================================

/// Popup with no behavior beyond its base, params and hooks.
pub struct SimplePopup {
    base: PopupBase,
    params: Option<Params>,
    hooks: Hooks,
}

impl SimplePopup {
    pub fn new(base: PopupBase) -> Self {
        Self {
            base,
            params: None,
            hooks: Hooks::default(),
        }
    }

    pub fn on_init(mut self, hook: impl FnMut(&str) + 'static) -> Self {
        self.hooks.on_init = Some(Box::new(hook));
        self
    }

    pub fn on_show(mut self, hook: impl FnMut(&str) + 'static) -> Self {
        self.hooks.on_show = Some(Box::new(hook));
        self
    }

    pub fn on_hide(mut self, hook: impl FnMut(&str) + 'static) -> Self {
        self.hooks.on_hide = Some(Box::new(hook));
        self
    }

    pub fn base(&self) -> &PopupBase {
        &self.base
    }

    /// Params from the most recent show, downcast to `T`.
    pub fn params<T: 'static>(&self) -> Option<&T> {
        self.params.as_ref().and_then(|p| p.downcast_ref::<T>())
    }
}

impl Popup for SimplePopup {
    fn node(&self) -> NodeId {
        self.base.node()
    }

    fn state(&self) -> PopupState {
        self.base.state()
    }

    fn init(&mut self, name: &str, params: Option<Params>) {
        self.base.init(name);
        self.params = params;
        fire(&mut self.hooks.on_init, name);
    }

    fn animate_in(&mut self, ctx: &mut PopupContext<'_>) -> Completion {
        let done = self.base.animate_in(ctx);
        self.poll();
        done
    }

    fn animate_out(&mut self, ctx: &mut PopupContext<'_>) {
        if self.base.animate_out(ctx) {
            fire(&mut self.hooks.on_hide, self.base.name());
        }
    }

    fn destroy(&mut self, ctx: &mut PopupContext<'_>) {
        self.animate_out(ctx);
        self.base.destroy(ctx);
    }

    fn reopen(&mut self, params: Option<Params>) {
        if params.is_some() {
            self.params = params;
        }
    }

    fn poll(&mut self) {
        if self.base.poll() {
            fire(&mut self.hooks.on_show, self.base.name());
        }
    }
}

//=== SimpleTemplate ======================================================

/// Template producing [`SimplePopup`]s.
///
/// Counts how many instances it has produced, which makes duplicate
/// instantiation easy to spot.
#[derive(Debug)]
pub struct SimpleTemplate {
    name: String,
    animation: Option<AnimType>,
    block_input: bool,
    instances: AtomicUsize,
}

impl SimpleTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            animation: Some(AnimType::Scale),
            block_input: true,
            instances: AtomicUsize::new(0),
        }
    }

    pub fn with_animation(mut self, anim: Option<AnimType>) -> Self {
        self.animation = anim;
        self
    }

    pub fn with_block_input(mut self, block: bool) -> Self {
        self.block_input = block;
        self
    }

    /// Number of instances created so far.
    pub fn instances(&self) -> usize {
        self.instances.load(Ordering::Relaxed)
    }
}

impl PopupTemplate for SimpleTemplate {
    fn declared_name(&self) -> &str {
        &self.name
    }

    fn instantiate(&self, scene: &mut dyn SceneGraph) -> Option<Box<dyn Popup>> {
        let node = scene.create_node(&self.name);
        let base = PopupBase::new(node).with_block_input(self.block_input);
        let base = match self.animation {
            Some(anim) => base.with_animation(anim),
            None => base.without_animation(),
        };

        self.instances.fetch_add(1, Ordering::Relaxed);
        Some(Box::new(SimplePopup::new(base.install(scene))))
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::core::host::headless::{HeadlessScene, ManualAnimator};

    #[test]
    fn template_counts_instances() {
        let mut scene = HeadlessScene::default();
        let template = SimpleTemplate::new("Shop");

        let popup = template.instantiate(&mut scene).unwrap();
        template.instantiate(&mut scene).unwrap();

        assert_eq!(template.declared_name(), "Shop");
        assert_eq!(template.instances(), 2);
        assert_eq!(scene.node(popup.node()).unwrap().name, "Shop");
    }

    #[test]
    fn hooks_fire_in_lifecycle_order() {
        let mut scene = HeadlessScene::default();
        let mut animator = ManualAnimator::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let node = scene.create_node("Mail");
        let (a, b, c) = (log.clone(), log.clone(), log.clone());
        let mut popup = SimplePopup::new(PopupBase::new(node).install(&mut scene))
            .on_init(move |n| a.borrow_mut().push(format!("init:{}", n)))
            .on_show(move |n| b.borrow_mut().push(format!("show:{}", n)))
            .on_hide(move |n| c.borrow_mut().push(format!("hide:{}", n)));

        popup.init("mail", Some(Box::new(7u32)));
        let mut ctx = PopupContext::new(&mut scene, &mut animator);
        popup.animate_in(&mut ctx);
        animator.finish_all();
        popup.poll();

        let mut ctx = PopupContext::new(&mut scene, &mut animator);
        popup.animate_out(&mut ctx);
        popup.animate_out(&mut ctx);

        assert_eq!(popup.params::<u32>(), Some(&7));
        assert_eq!(*log.borrow(), vec!["init:mail", "show:mail", "hide:mail"]);
    }

    #[test]
    fn unanimated_show_fires_show_hook_at_once() {
        let mut scene = HeadlessScene::default();
        let mut animator = ManualAnimator::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let node = scene.create_node("Plain");
        let shown = log.clone();
        let mut popup = SimplePopup::new(PopupBase::new(node).without_animation().install(&mut scene))
            .on_show(move |n| shown.borrow_mut().push(format!("show:{}", n)));

        popup.init("Plain", None);
        let mut ctx = PopupContext::new(&mut scene, &mut animator);
        popup.animate_in(&mut ctx);
        popup.poll();

        assert_eq!(*log.borrow(), vec!["show:Plain"]);
        assert_eq!(popup.state(), PopupState::Shown);
    }

    #[test]
    fn reopen_replaces_params_only_when_given() {
        let mut scene = HeadlessScene::default();
        let node = scene.create_node("Gift");
        let mut popup = SimplePopup::new(PopupBase::new(node));

        popup.init("gift", Some(Box::new("first")));
        popup.reopen(None);
        assert_eq!(popup.params::<&str>(), Some(&"first"));

        popup.reopen(Some(Box::new("second")));
        assert_eq!(popup.params::<&str>(), Some(&"second"));
    }
}
