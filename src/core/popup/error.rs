//=========================================================================
// Popup Errors
//=========================================================================
//
// Failures surfaced by the popup manager.
//
// Structural errors (init order, missing arguments, missing lifecycle)
// are returned synchronously from the failing call. Load failures are
// returned from `PopupManager::update`. Hiding or removing an unknown
// popup is not an error; it is logged and ignored.
//
//=========================================================================

/// Popup manager errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopupError {
    /// An operation needing the root container ran before `init`.
    NotInitialized,

    /// `init` was called on an initialized manager.
    AlreadyInitialized,

    /// No name, template or path was given.
    MissingSource,

    /// First show of a name with neither a template nor a path to create
    /// it from.
    UnknownPopup(String),

    /// The template's instance does not implement the popup lifecycle.
    MissingLifecycle(String),

    /// Loading a template by path failed.
    LoadFailed { path: String, reason: String },
}

//--- Trait Implementations -----------------------------------------------

impl std::fmt::Display for PopupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "Popup manager used before init()"),
            Self::AlreadyInitialized => write!(f, "Popup manager is already initialized"),
            Self::MissingSource => write!(f, "Popup request needs a name, template or path"),
            Self::UnknownPopup(name) => {
                write!(f, "Popup '{}' is not cached; first show needs a template or path", name)
            }
            Self::MissingLifecycle(name) => {
                write!(f, "Popup '{}' does not implement the popup lifecycle", name)
            }
            Self::LoadFailed { path, reason } => {
                write!(f, "Loading popup '{}' failed: {}", path, reason)
            }
        }
    }
}

impl std::error::Error for PopupError {}

//=========================================================================
// Unit Tests
//=========================================================================
