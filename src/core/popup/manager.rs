//=========================================================================
// Popup Manager
//=========================================================================
//
// Facade composing the instance cache, stack arbiter and input guard.
//
// Architecture:
// ```text
//   show(opts) ──resolve──> cached? ──yes──> present()
//                              │                 ├─ StackArbiter::decide
//                              no                ├─ hide displaced popups
//                              ├─ template ──────┤  init / reopen
//                              └─ path ──load──┐ └─ animate_in + guard.track
//                                              │
//   update() <── crossbeam ── LoadReply ───────┘
//     ├─ replay waiting requests (one load per path)
//     ├─ poll active popups and guard transitions
//     ├─ apply close requests (Closer) via hide() / remove()
//     └─ settle guard
// ```
//
// All Stack/Cache mutation happens synchronously inside these calls.
// Animations, loads and close requests only ever report back through
// completions and channels, which are observed in update(). Loads carry
// the session generation; replies from before a teardown are dropped.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::collections::HashMap;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, error, info, warn};

//=== Internal Dependencies ===============================================

use super::{
    CloseKind, CloseRequest, Closer, InputGuard, InputRoute, InstanceCache, NameResolution,
    Origin, Params, Placement, Popup, PopupEntry, PopupError, PopupName, ShowType, StackArbiter,
};
use crate::core::host::{Host, LoadEvent, LoadReply, NodeId, TemplateRef};
use crate::core::input::InputEvent;

//=== Request Options =====================================================

/// Arguments to [`PopupManager::show`].
///
/// At least one of `name`, `template` or `path` must be set. The name
/// resolves from, in order: `name`, the template's declared name, then
/// the name `path` resolved to when it was last loaded.
#[derive(Default)]
pub struct ShowOptions {
    pub name: Option<PopupName>,
    pub template: Option<TemplateRef>,
    pub path: Option<String>,

    /// Higher is more foreground-worthy. Default 0.
    pub priority: i32,
    pub params: Option<Params>,

    /// Falls back to the manager's default show type.
    pub show_type: Option<ShowType>,
}

impl ShowOptions {
    /// Shows an already cached (or loading) popup by name.
    pub fn named(name: impl Into<PopupName>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Shows a popup instantiated from `template` on first use.
    pub fn template(template: TemplateRef) -> Self {
        Self {
            template: Some(template),
            ..Self::default()
        }
    }

    /// Shows a popup loaded from `path` on first use.
    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<PopupName>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_params<T: Any>(mut self, params: T) -> Self {
        self.params = Some(Box::new(params));
        self
    }

    pub fn with_show_type(mut self, show_type: ShowType) -> Self {
        self.show_type = Some(show_type);
        self
    }
}

/// Arguments to [`PopupManager::pre_load`].
#[derive(Default)]
pub struct PreloadOptions {
    pub name: Option<PopupName>,
    pub template: Option<TemplateRef>,
    pub path: Option<String>,
}

impl PreloadOptions {
    pub fn template(template: TemplateRef) -> Self {
        Self {
            template: Some(template),
            ..Self::default()
        }
    }

    pub fn path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<PopupName>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// What a successful [`PopupManager::show`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowOutcome {
    /// The popup is now the top and is animating in.
    Presented(PopupName),

    /// A higher-priority popup is on top; this one waits below it.
    Queued(PopupName),

    /// The popup's template is loading; it is presented from `update()`.
    Loading(String),
}

//=== Pending Loads =======================================================

/// A request parked until its path finishes loading.
enum PendingRequest {
    Show {
        name: Option<PopupName>,
        priority: i32,
        params: Option<Params>,
        show_type: ShowType,
    },
    Preload {
        name: Option<PopupName>,
    },
}

impl PendingRequest {
    fn name(&self) -> Option<&str> {
        match self {
            Self::Show { name, .. } | Self::Preload { name } => name.as_deref(),
        }
    }

    fn is_show(&self) -> bool {
        matches!(self, Self::Show { .. })
    }
}

//=== PopupManagerBuilder =================================================

/// Builder for a [`PopupManager`].
///
/// # Default Values
///
/// - **Root name**: `"Popup"`
/// - **Guard name**: `"BlockInput"`
/// - **Default show type**: [`ShowType::Replace`]
pub struct PopupManagerBuilder {
    host: Host,
    root_name: String,
    guard_name: String,
    default_show_type: ShowType,
}

impl PopupManagerBuilder {
    pub fn new(host: Host) -> Self {
        Self {
            host,
            root_name: "Popup".to_string(),
            guard_name: "BlockInput".to_string(),
            default_show_type: ShowType::Replace,
        }
    }

    /// Sets the name of the root container node.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty.
    pub fn with_root_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "Root name must not be empty");
        self.root_name = name;
        self
    }

    /// Sets the name of the input guard node.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty.
    pub fn with_guard_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "Guard name must not be empty");
        self.guard_name = name;
        self
    }

    /// Show type used when a request does not specify one.
    pub fn with_default_show_type(mut self, show_type: ShowType) -> Self {
        self.default_show_type = show_type;
        self
    }

    /// Builds an uninitialized manager. Call [`PopupManager::init`] next.
    pub fn build(self) -> PopupManager {
        let (load_tx, load_rx) = unbounded();
        let (close_tx, close_rx) = unbounded();

        PopupManager {
            host: self.host,
            root: None,
            root_name: self.root_name,
            guard_name: self.guard_name,
            default_show_type: self.default_show_type,
            cache: InstanceCache::new(),
            stack: StackArbiter::new(),
            guard: InputGuard::new(),
            loads: HashMap::new(),
            load_tx,
            load_rx,
            generation: 0,
            closer: Closer::new(close_tx),
            close_rx,
        }
    }
}

//=== PopupManager ========================================================

/// Owns every popup, the open stack and the input guard.
///
/// One manager per overlay layer. It is an ordinary value: construct it
/// where the application wires its UI and pass it (or a handle to it) to
/// the code that opens popups.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use aetheric_popups::prelude::*;
/// use aetheric_popups::core::host::headless::{HeadlessScene, ImmediateAnimator, QueuedLoader};
///
/// let scene = HeadlessScene::default();
/// let host = Host::new(scene.clone(), ImmediateAnimator::new(scene), QueuedLoader::new());
/// let mut popups = PopupManager::builder(host).build();
/// popups.init().unwrap();
///
/// let shop = Arc::new(SimpleTemplate::new("Shop"));
/// popups.show(ShowOptions::template(shop)).unwrap();
/// popups.update();
///
/// assert_eq!(popups.current_name(), Some("Shop"));
/// ```
pub struct PopupManager {
    host: Host,
    root: Option<NodeId>,
    root_name: String,
    guard_name: String,
    default_show_type: ShowType,
    cache: InstanceCache,
    stack: StackArbiter,
    guard: InputGuard,
    loads: HashMap<String, Vec<PendingRequest>>,
    load_tx: Sender<LoadEvent>,
    load_rx: Receiver<LoadEvent>,
    generation: u64,
    closer: Closer,
    close_rx: Receiver<CloseRequest>,
}

impl PopupManager {
    //--- Construction -----------------------------------------------------

    pub fn builder(host: Host) -> PopupManagerBuilder {
        PopupManagerBuilder::new(host)
    }

    pub fn new(host: Host) -> Self {
        PopupManagerBuilder::new(host).build()
    }

    /// Creates the root container and the input guard.
    ///
    /// # Errors
    ///
    /// [`PopupError::AlreadyInitialized`] if called twice without an
    /// intervening [`PopupManager::teardown`].
    pub fn init(&mut self) -> Result<(), PopupError> {
        if self.root.is_some() {
            return Err(PopupError::AlreadyInitialized);
        }

        let scene = self.host.scene.as_mut();
        let size = scene.visible_size();
        let root = scene.create_node(&self.root_name);
        scene.set_size(root, size);
        scene.place(root, size.center());

        self.guard.install(scene, root, &self.guard_name);
        self.root = Some(root);

        info!(
            target: "popup",
            "Popup manager initialized ({}x{})",
            size.width, size.height
        );
        Ok(())
    }

    /// Destroys every popup, the guard and the root container.
    ///
    /// Pending loads are abandoned; their results are ignored if they
    /// arrive later. The manager can be initialized again afterwards.
    pub fn teardown(&mut self) -> Result<(), PopupError> {
        let root = self.root.ok_or(PopupError::NotInitialized)?;

        self.remove_all();
        self.loads.clear();
        self.generation = self.generation.wrapping_add(1);
        self.close_rx.try_iter().for_each(drop);
        self.guard.uninstall(self.host.scene.as_mut());
        self.host.scene.destroy(root);
        self.root = None;

        info!(target: "popup", "Popup manager torn down");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.root.is_some()
    }

    //--- Show -------------------------------------------------------------

    /// Shows a popup, creating it on first use.
    ///
    /// # Errors
    ///
    /// - [`PopupError::NotInitialized`] before [`PopupManager::init`]
    /// - [`PopupError::MissingSource`] if nothing identifies the popup
    /// - [`PopupError::UnknownPopup`] on first show of a bare name
    /// - [`PopupError::MissingLifecycle`] if the template's instance is
    ///   not a popup
    ///
    /// Load failures surface later, from [`PopupManager::update`].
    pub fn show(&mut self, options: ShowOptions) -> Result<ShowOutcome, PopupError> {
        if self.root.is_none() {
            return Err(PopupError::NotInitialized);
        }

        let ShowOptions {
            name,
            template,
            path,
            priority,
            params,
            show_type,
        } = options;

        let resolution =
            self.cache
                .resolve_name(name.as_deref(), template.as_deref(), path.as_deref());
        if resolution == NameResolution::Unresolved && path.is_none() {
            return Err(PopupError::MissingSource);
        }

        let show_type = show_type.unwrap_or(self.default_show_type);
        let guard_was_up = self.guard.is_active();
        self.raise_guard();

        let name = match resolution {
            NameResolution::Resolved(name) => name,
            NameResolution::Unresolved => {
                let path = path.unwrap_or_default();
                let request = PendingRequest::Show {
                    name: None,
                    priority,
                    params,
                    show_type,
                };
                return Ok(self.request_load(path, request));
            }
        };

        if self.cache.contains(&name) {
            return self.present(name, priority, params, show_type);
        }

        if let Some(template) = template {
            if let Err(e) = self.instantiate(&name, &template, Origin::Template) {
                self.rollback_guard(guard_was_up);
                return Err(e);
            }
            return self.present(name, priority, params, show_type);
        }

        let waiting_path = path.or_else(|| self.loading_path_for(&name));
        match waiting_path {
            Some(path) => {
                let request = PendingRequest::Show {
                    name: Some(name),
                    priority,
                    params,
                    show_type,
                };
                Ok(self.request_load(path, request))
            }
            None => {
                self.rollback_guard(guard_was_up);
                Err(PopupError::UnknownPopup(name))
            }
        }
    }

    /// Arbitrates a cached popup onto the stack and drives its lifecycle.
    fn present(
        &mut self,
        name: PopupName,
        priority: i32,
        params: Option<Params>,
        show_type: ShowType,
    ) -> Result<ShowOutcome, PopupError> {
        let Some(root) = self.root else {
            return Err(PopupError::NotInitialized);
        };
        if !self.cache.contains(&name) {
            self.settle_guard();
            return Err(PopupError::UnknownPopup(name));
        }

        let cache = &self.cache;
        let placement = self
            .stack
            .decide(&name, priority, show_type, |open| cache.priority(open));

        let mut ctx = self.host.context().with_closer(&self.closer);

        if let Placement::Foreground { hide } = &placement {
            for other in hide {
                if let Some(entry) = self.cache.get_mut(other) {
                    entry.popup.animate_out(&mut ctx);
                }
                self.guard.forget(other);
            }
        }

        let Some(entry) = self.cache.get_mut(&name) else {
            return Err(PopupError::UnknownPopup(name));
        };

        entry.priority = priority;
        let node = entry.popup.node();
        if ctx.scene.parent(node) != Some(root) {
            ctx.scene.attach(node, root);
        }
        ctx.scene.set_priority(node, priority);

        if entry.initialized {
            entry.popup.reopen(params);
        } else {
            entry.popup.init(&name, params);
            entry.initialized = true;
        }

        let outcome = match placement {
            Placement::Foreground { .. } => {
                let done = entry.popup.animate_in(&mut ctx);
                self.guard.track(&name, done);
                ShowOutcome::Presented(name)
            }
            Placement::Background { .. } => {
                if entry.popup.is_active() {
                    entry.popup.animate_out(&mut ctx);
                }
                self.guard.forget(&name);
                ShowOutcome::Queued(name)
            }
        };

        self.settle_guard();
        Ok(outcome)
    }

    //--- Hide / Remove ----------------------------------------------------

    /// Closes a popup, keeping it cached.
    ///
    /// If it was the top, the popup beneath it is shown again. Unknown
    /// names are ignored with a warning.
    pub fn hide(&mut self, name: &str) {
        if !self.cache.contains(name) {
            warn!(target: "popup", "Hide ignored: popup '{}' is not cached", name);
            return;
        }

        self.raise_guard();
        let was_top = self.stack.remove(name);

        let mut ctx = self.host.context().with_closer(&self.closer);
        if let Some(entry) = self.cache.get_mut(name) {
            entry.popup.animate_out(&mut ctx);
        }
        self.guard.forget(name);

        if was_top == Some(true) {
            self.surface_top();
        }

        if self.stack.is_empty() {
            self.guard.forget_all();
            self.guard.set_active(self.host.scene.as_mut(), false);
        } else {
            self.settle_guard();
        }
    }

    /// Re-shows the new top if it was left inactive.
    fn surface_top(&mut self) {
        let Some(top) = self.stack.top().map(str::to_string) else {
            return;
        };

        let mut ctx = self.host.context().with_closer(&self.closer);
        let Some(entry) = self.cache.get_mut(&top) else {
            return;
        };

        if !entry.popup.is_active() {
            debug!(target: "popup::stack", "Surfacing '{}'", top);
            let done = entry.popup.animate_in(&mut ctx);
            self.guard.track(&top, done);
        }
    }

    /// Hides a popup, destroys it and evicts it from the cache.
    ///
    /// Unknown names are ignored with a warning.
    pub fn remove(&mut self, name: &str) {
        if !self.cache.contains(name) {
            warn!(target: "popup", "Remove ignored: popup '{}' is not cached", name);
            return;
        }

        self.hide(name);
        self.destroy_cached(name);
    }

    /// Closes every open popup and lowers the guard.
    pub fn hide_all(&mut self) {
        let open = self.stack.clear();

        let mut ctx = self.host.context().with_closer(&self.closer);
        for name in &open {
            if let Some(entry) = self.cache.get_mut(name) {
                entry.popup.animate_out(&mut ctx);
            }
        }

        self.guard.forget_all();
        self.guard.set_active(self.host.scene.as_mut(), false);
        debug!(target: "popup::stack", "Hid {} popup(s)", open.len());
    }

    /// Closes everything and destroys every cached popup, including
    /// pre-loaded and queued ones.
    pub fn remove_all(&mut self) {
        self.hide_all();
        for name in self.cache.names() {
            self.destroy_cached(&name);
        }
    }

    fn destroy_cached(&mut self, name: &str) {
        if let Some(mut entry) = self.cache.evict(name) {
            let mut ctx = self.host.context().with_closer(&self.closer);
            entry.popup.destroy(&mut ctx);
            debug!(target: "popup", "Popup '{}' destroyed", name);
        }
    }

    //--- Preload ----------------------------------------------------------

    /// Creates and caches a popup without showing it.
    ///
    /// Already cached names are left alone with a warning. With a path,
    /// the popup is cached once the load completes in `update()`.
    pub fn pre_load(&mut self, options: PreloadOptions) -> Result<(), PopupError> {
        let PreloadOptions {
            name,
            template,
            path,
        } = options;

        let resolution =
            self.cache
                .resolve_name(name.as_deref(), template.as_deref(), path.as_deref());

        if let NameResolution::Resolved(name) = &resolution {
            if self.cache.contains(name) {
                warn!(target: "popup", "Popup '{}' is already loaded", name);
                return Ok(());
            }
        }

        match (resolution, template, path) {
            (NameResolution::Resolved(name), Some(template), _) => {
                self.instantiate(&name, &template, Origin::Template)
            }
            (resolution, None, Some(path)) => {
                let name = match resolution {
                    NameResolution::Resolved(name) => Some(name),
                    NameResolution::Unresolved => None,
                };
                self.request_load(path, PendingRequest::Preload { name });
                Ok(())
            }
            (NameResolution::Resolved(name), None, None) => Err(PopupError::UnknownPopup(name)),
            _ => Err(PopupError::MissingSource),
        }
    }

    //--- Loading ----------------------------------------------------------

    fn instantiate(
        &mut self,
        name: &str,
        template: &TemplateRef,
        origin: Origin,
    ) -> Result<(), PopupError> {
        let Some(popup) = template.instantiate(self.host.scene.as_mut()) else {
            error!(target: "popup", "Popup '{}' does not implement the popup lifecycle", name);
            return Err(PopupError::MissingLifecycle(name.to_string()));
        };

        debug!(target: "popup", "Popup '{}' instantiated ({:?})", name, origin);
        self.cache.put(name, PopupEntry::new(popup, origin));
        Ok(())
    }

    /// Parks `request` on the load for `path`, starting it if needed.
    fn request_load(&mut self, path: String, request: PendingRequest) -> ShowOutcome {
        let waiting = self.loads.entry(path.clone()).or_default();
        let first = waiting.is_empty();
        waiting.push(request);

        if first {
            debug!(target: "popup::assets", "Loading '{}'", path);
            let reply = LoadReply::new(path.clone(), self.generation, self.load_tx.clone());
            self.host.loader.load(&path, reply);
        } else {
            debug!(target: "popup::assets", "Joined in-flight load of '{}'", path);
        }

        self.guard.set_loads_in_flight(self.show_loads());
        ShowOutcome::Loading(path)
    }

    /// Path of an in-flight load already waiting on `name`.
    fn loading_path_for(&self, name: &str) -> Option<String> {
        self.loads
            .iter()
            .find(|(_, waiting)| waiting.iter().any(|r| r.name() == Some(name)))
            .map(|(path, _)| path.clone())
    }

    fn show_loads(&self) -> usize {
        self.loads
            .values()
            .filter(|waiting| waiting.iter().any(PendingRequest::is_show))
            .count()
    }

    fn finish_load(&mut self, event: LoadEvent, errors: &mut Vec<PopupError>) {
        let LoadEvent {
            path,
            generation,
            result,
        } = event;

        if generation != self.generation {
            debug!(target: "popup::assets", "Ignoring load of '{}' from a previous session", path);
            return;
        }

        let Some(waiting) = self.loads.remove(&path) else {
            debug!(target: "popup::assets", "Ignoring stale load of '{}'", path);
            return;
        };

        let template = match result {
            Ok(template) => template,
            Err(reason) => {
                error!(target: "popup::assets", "Loading '{}' failed: {}", path, reason);
                errors.push(PopupError::LoadFailed { path, reason });
                return;
            }
        };

        for request in waiting {
            let name = request
                .name()
                .unwrap_or_else(|| template.declared_name())
                .to_string();
            self.cache.remember(&path, &name);

            if !self.cache.contains(&name) {
                if let Err(e) = self.instantiate(&name, &template, Origin::Path(path.clone())) {
                    errors.push(e);
                    continue;
                }
            }

            if let PendingRequest::Show {
                priority,
                params,
                show_type,
                ..
            } = request
            {
                self.raise_guard();
                if let Err(e) = self.present(name, priority, params, show_type) {
                    errors.push(e);
                }
            }
        }
    }

    //--- Update -----------------------------------------------------------

    /// Processes finished loads, animations and close requests.
    ///
    /// Call once per frame. Returns the errors of asynchronous work that
    /// failed since the last call.
    pub fn update(&mut self) -> Vec<PopupError> {
        let mut errors = Vec::new();

        let finished: Vec<LoadEvent> = self.load_rx.try_iter().collect();
        for event in finished {
            self.finish_load(event, &mut errors);
        }
        self.guard.set_loads_in_flight(self.show_loads());

        for (_, entry) in self.cache.iter_mut() {
            if entry.popup.is_active() {
                entry.popup.poll();
            }
        }
        for name in self.guard.poll() {
            debug!(target: "popup", "Popup '{}' finished showing", name);
        }

        let requests: Vec<CloseRequest> = self.close_rx.try_iter().collect();
        for request in requests {
            match request.kind {
                CloseKind::Hide => self.hide(&request.name),
                CloseKind::Remove => self.remove(&request.name),
            }
        }

        if self.root.is_some() {
            self.settle_guard();
        }
        errors
    }

    //--- Guard ------------------------------------------------------------

    fn raise_guard(&mut self) {
        self.guard.set_active(self.host.scene.as_mut(), true);
    }

    fn settle_guard(&mut self) {
        let open = !self.stack.is_empty();
        self.guard.settle(self.host.scene.as_mut(), open);
    }

    /// Restores the guard after a failed request, unless something else
    /// is still transitioning.
    fn rollback_guard(&mut self, was_up: bool) {
        if !self.guard.is_transitioning() {
            self.guard.set_active(self.host.scene.as_mut(), was_up);
        }
    }

    /// Decides which layer an input event belongs to.
    pub fn route_input(&self, event: &InputEvent) -> InputRoute {
        self.guard.route(event)
    }

    pub fn guard_active(&self) -> bool {
        self.guard.is_active()
    }

    pub fn guard_node(&self) -> Option<NodeId> {
        self.guard.node()
    }

    //--- Queries ----------------------------------------------------------

    /// Name of the topmost open popup.
    pub fn current_name(&self) -> Option<&str> {
        self.stack.top()
    }

    /// The topmost open popup.
    pub fn current_popup(&self) -> Option<&dyn Popup> {
        self.current_name().and_then(|name| self.popup(name))
    }

    /// A cached popup by name, open or not.
    pub fn popup(&self, name: &str) -> Option<&dyn Popup> {
        self.cache.get(name).map(|entry| entry.popup.as_ref())
    }

    pub fn popup_mut(&mut self, name: &str) -> Option<&mut dyn Popup> {
        match self.cache.get_mut(name) {
            Some(entry) => Some(entry.popup.as_mut()),
            None => None,
        }
    }

    /// Open popup names, back to front.
    pub fn stack(&self) -> &[PopupName] {
        self.stack.names()
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.contains(name)
    }

    /// Every cached popup name, sorted.
    pub fn cached_names(&self) -> Vec<PopupName> {
        self.cache.names()
    }

    /// Name a load path resolved to, once it has loaded.
    pub fn name_for_path(&self, path: &str) -> Option<&str> {
        self.cache.paths().lookup(path)
    }

    /// Handle for closing popups from UI callbacks on the next update.
    pub fn closer(&self) -> Closer {
        self.closer.clone()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
