use crate::{
    error::{Error, Result},
    geom::{Point, Rect},
    id::WidgetId,
    tree::Tree,
};

/// Where a registered child is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// At the parent's position, default size.
    Parent,
    /// At an explicit position, default size.
    At(Point),
    /// Explicit position and size.
    Bounds(Rect),
}

/// Collects the children a widget declares during `build`.
///
/// Appends are recorded in declaration order and committed to the tree as soon
/// as the parent's `build` returns, before any child is built. Declaration
/// order is paint order, and the default input order within one z layer.
#[derive(Debug)]
pub struct ChildAppender {
    /// Widget whose children are being declared.
    parent: WidgetId,
    /// Pending registrations.
    pending: Vec<(WidgetId, Placement)>,
}

impl ChildAppender {
    /// An appender collecting children for `parent`.
    pub(crate) fn new(parent: WidgetId) -> Self {
        Self {
            parent,
            pending: Vec::new(),
        }
    }

    /// The widget whose children are being declared.
    pub fn parent(&self) -> WidgetId {
        self.parent
    }

    /// Add a child at the parent's position with its default size.
    pub fn append(&mut self, child: impl Into<WidgetId>) {
        self.pending.push((child.into(), Placement::Parent));
    }

    /// Add a child at an explicit position with its default size.
    pub fn append_at(&mut self, child: impl Into<WidgetId>, position: Point) {
        self.pending.push((child.into(), Placement::At(position)));
    }

    /// Add a child with explicit bounds.
    pub fn append_with_bounds(&mut self, child: impl Into<WidgetId>, bounds: Rect) {
        self.pending.push((child.into(), Placement::Bounds(bounds)));
    }

    /// Number of children declared so far.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Have no children been declared?
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Write the declared children into the tree, returning them in order.
    pub(crate) fn commit(self, tree: &mut Tree) -> Result<Vec<WidgetId>> {
        let parent = self.parent;
        let pass = tree.pass;
        let origin = tree.state(parent).ok_or(Error::NotFound(parent))?.position;
        let mut committed = Vec::with_capacity(self.pending.len());
        for (child, placement) in self.pending {
            let Some(state) = tree.state(child) else {
                return Err(Error::NotFound(child));
            };
            if child == tree.root() {
                return Err(Error::Tree("the root cannot be registered as a child".into()));
            }
            if tree.is_ancestor_or_self(child, parent) {
                return Err(Error::Tree(format!(
                    "{} cannot be registered under itself or its descendant",
                    state.name
                )));
            }
            if state.registered == pass {
                return Err(Error::Tree(format!(
                    "{} registered twice in one build pass",
                    state.name
                )));
            }

            tree.register(child, pass);
            let Some(state) = tree.state_mut(child) else {
                return Err(Error::NotFound(child));
            };
            state.parent = Some(parent);
            match placement {
                Placement::Parent => {
                    state.position = origin;
                    state.size = None;
                }
                Placement::At(p) => {
                    state.position = p;
                    state.size = None;
                }
                Placement::Bounds(r) => {
                    state.position = r.tl;
                    state.size = Some(r.expanse());
                }
            }
            if let Some(p) = tree.state_mut(parent) {
                p.children.push(child);
            }
            committed.push(child);
        }
        Ok(committed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{context::Context, geom::Expanse, render::Canvas, widget::Widget};

    struct Leaf;

    impl Widget for Leaf {
        fn build(&mut self, _: &mut Context<'_>, _: &mut ChildAppender) -> Result<()> {
            Ok(())
        }
        fn draw(&self, _: &Context<'_>, _: &mut Canvas<'_>) {}
        fn default_size(&self) -> Expanse {
            Expanse::new(2, 3)
        }
    }

    fn setup() -> (Tree, WidgetId, WidgetId, WidgetId) {
        let mut t = Tree::new(Box::new(Leaf));
        let a = t.insert(Box::new(Leaf));
        let b = t.insert(Box::new(Leaf));
        let c = t.insert(Box::new(Leaf));
        t.begin_pass();
        (t, a, b, c)
    }

    #[test]
    fn placements() {
        let (mut t, a, b, c) = setup();
        let root = t.root();
        t.nodes[root].state.position = Point::new(5, 5);
        let mut app = ChildAppender::new(root);
        app.append(a);
        app.append_at(b, Point::new(1, 2));
        app.append_with_bounds(c, Rect::new(3, 3, 10, 10));
        assert_eq!(app.len(), 3);
        assert_eq!(app.commit(&mut t).unwrap(), vec![a, b, c]);
        assert_eq!(t.children(root), &[a, b, c]);
        assert_eq!(t.nodes[a].state.bounds(), Rect::new(5, 5, 2, 3));
        assert_eq!(t.nodes[b].state.bounds(), Rect::new(1, 2, 2, 3));
        assert_eq!(t.nodes[c].state.bounds(), Rect::new(3, 3, 10, 10));
        assert_eq!(t.parent(c), Some(root));
    }

    #[test]
    fn append_resets_size() {
        let (mut t, a, _, _) = setup();
        let root = t.root();
        let mut app = ChildAppender::new(root);
        app.append_with_bounds(a, Rect::new(0, 0, 9, 9));
        app.commit(&mut t).unwrap();

        t.begin_pass();
        let mut app = ChildAppender::new(root);
        app.append(a);
        app.commit(&mut t).unwrap();
        assert_eq!(t.nodes[a].state.bounds(), Rect::new(0, 0, 2, 3));
    }

    #[test]
    fn structural_errors() {
        let (mut t, a, b, _) = setup();
        let root = t.root();

        let mut app = ChildAppender::new(root);
        app.append(a);
        app.append(a);
        assert!(matches!(app.commit(&mut t), Err(Error::Tree(_))));

        t.begin_pass();
        let mut app = ChildAppender::new(root);
        app.append(root);
        assert!(matches!(app.commit(&mut t), Err(Error::Tree(_))));

        t.begin_pass();
        let mut app = ChildAppender::new(root);
        app.append(a);
        app.commit(&mut t).unwrap();
        let mut app = ChildAppender::new(a);
        app.append(b);
        app.commit(&mut t).unwrap();
        let mut app = ChildAppender::new(b);
        app.append(a);
        assert!(matches!(app.commit(&mut t), Err(Error::Tree(_))));

        t.remove(b).unwrap();
        let mut app = ChildAppender::new(a);
        app.append(b);
        assert!(matches!(app.commit(&mut t), Err(Error::NotFound(_))));
    }
}
