//=========================================================================
// Scene Graph Contract
//=========================================================================
//
// The rendering collaborator's node primitives, as seen by the popup
// system.
//
// The overlay manager never renders anything itself. It creates a root
// container and an input guard surface, parents popup nodes under the
// root, and toggles visibility. Everything else (layout math, draw order
// beyond the priority hint, asset formats) belongs to the implementor.
//
//=========================================================================

//=== NodeId ==============================================================

/// Opaque handle to a node owned by a [`SceneGraph`].
///
/// Handles are issued by [`SceneGraph::create_node`] and stay valid until
/// [`SceneGraph::destroy`] is called on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

//=== Geometry ============================================================

/// Width/height pair in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Center point of a rectangle of this size anchored at the origin.
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Position in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

//=== SceneGraph Trait ====================================================

/// Node create/attach/destroy capability provided by the host renderer.
///
/// Every method takes a handle previously returned by `create_node`.
/// Implementations should treat calls on destroyed handles as no-ops;
/// the popup system never relies on them failing.
pub trait SceneGraph {
    /// Creates a detached, active node.
    fn create_node(&mut self, name: &str) -> NodeId;

    /// Re-parents `node` under `parent`.
    fn attach(&mut self, node: NodeId, parent: NodeId);

    /// Returns the node's parent, if attached.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Shows or hides the node (and its subtree).
    fn set_active(&mut self, node: NodeId, active: bool);

    /// Returns whether the node is currently active.
    fn is_active(&self, node: NodeId) -> bool;

    /// Places the node at a position relative to its parent.
    fn place(&mut self, node: NodeId, position: Vec2);

    /// Sets the node's content size.
    fn set_size(&mut self, node: NodeId, size: Size);

    /// Sets the sibling draw-order hint (higher draws in front).
    fn set_priority(&mut self, node: NodeId, priority: i32);

    /// Sets a uniform scale immediately.
    fn set_scale(&mut self, node: NodeId, scale: f32);

    /// Sets opacity immediately (0 = transparent, 255 = opaque).
    fn set_opacity(&mut self, node: NodeId, opacity: u8);

    /// Makes the node swallow pointer input that would otherwise reach
    /// nodes beneath it.
    fn set_input_blocking(&mut self, node: NodeId, blocking: bool);

    /// Destroys the node and its subtree.
    fn destroy(&mut self, node: NodeId);

    /// Visible area of the screen, used to size full-screen surfaces.
    fn visible_size(&self) -> Size;
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_center_is_half_extent() {
        let size = Size::new(800.0, 600.0);
        assert_eq!(size.center(), Vec2::new(400.0, 300.0));
    }

    #[test]
    fn node_ids_order_by_value() {
        assert!(NodeId(1) < NodeId(2));
        assert_eq!(NodeId(7), NodeId(7));
    }
}
