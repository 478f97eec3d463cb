//=========================================================================
// Asset Contract
//=========================================================================
//
// Template instantiation and asynchronous load-by-path.
//
// Architecture:
//   PopupManager ──load(path, LoadReply)──> AssetLoader
//        ↑                                       │ (now or later,
//        │                                       │  any thread)
//   update(): try_iter() <── crossbeam ── LoadReply::complete()
//
// The loader never touches manager state. It only completes the reply;
// the manager drains finished loads at its next update() so that every
// Stack/Cache mutation stays on the manager's own turn.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;

use crossbeam_channel::Sender;
use log::warn;

//=== Internal Dependencies ===============================================

use super::SceneGraph;
use crate::core::popup::Popup;

//=== PopupTemplate =======================================================

/// A reusable description a popup instance can be created from.
///
/// Plays the role of a prefab: it carries a declared name (used when the
/// caller supplies none) and knows how to build a live instance.
pub trait PopupTemplate: Send + Sync {
    /// Name declared by the template itself.
    fn declared_name(&self) -> &str;

    /// Builds a live instance, creating its node(s) in `scene`.
    ///
    /// Returns `None` when the instantiated root does not carry the popup
    /// lifecycle, which the manager reports as a configuration error.
    fn instantiate(&self, scene: &mut dyn SceneGraph) -> Option<Box<dyn Popup>>;
}

/// Shared handle to a template.
pub type TemplateRef = Arc<dyn PopupTemplate>;

//=== Load Results ========================================================

/// Outcome of a single load request.
pub type LoadResult = Result<TemplateRef, String>;

/// Finished load, as delivered to the manager.
///
/// `generation` identifies the manager session that issued the load, so
/// replies outliving a teardown are recognized as stale.
pub struct LoadEvent {
    pub path: String,
    pub generation: u64,
    pub result: LoadResult,
}

impl std::fmt::Debug for LoadEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let outcome = match &self.result {
            Ok(template) => format!("Ok({})", template.declared_name()),
            Err(reason) => format!("Err({})", reason),
        };
        f.debug_struct("LoadEvent")
            .field("path", &self.path)
            .field("generation", &self.generation)
            .field("result", &outcome)
            .finish()
    }
}

/// One-shot reply handle passed to [`AssetLoader::load`].
///
/// Can be moved to another thread and completed from there.
pub struct LoadReply {
    path: String,
    generation: u64,
    sender: Sender<LoadEvent>,
}

impl LoadReply {
    pub(crate) fn new(path: impl Into<String>, generation: u64, sender: Sender<LoadEvent>) -> Self {
        Self {
            path: path.into(),
            generation,
            sender,
        }
    }

    /// Path this reply answers for.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Delivers the load outcome to the manager.
    ///
    /// If the manager has been dropped the outcome is discarded.
    pub fn complete(self, result: LoadResult) {
        let event = LoadEvent {
            path: self.path,
            generation: self.generation,
            result,
        };
        if let Err(e) = self.sender.send(event) {
            warn!(
                target: "popup::assets",
                "Manager gone, dropping load result for '{}'",
                e.into_inner().path
            );
        }
    }
}

//=== AssetLoader Trait ===================================================

/// Asynchronous load-by-path capability.
pub trait AssetLoader {
    /// Starts loading the template at `path`.
    ///
    /// The implementation must eventually call [`LoadReply::complete`];
    /// completing synchronously inside this call is allowed.
    fn load(&mut self, path: &str, reply: LoadReply);
}
