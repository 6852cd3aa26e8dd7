//! Integration tests for z-order and hit testing.

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use grove::{
        Canvas, ChildAppender, Context, InputOutcome, OVERLAY_Z_DELTA, Result, Widget, WidgetId,
        geom::{Expanse, Point, Rect},
        testing::{Block, Harness, Slot},
    };
    use proptest::prelude::*;

    /// Root with two overlapping siblings: A at (0,0,10,10), then B at (5,5,10,10).
    fn siblings() -> (Harness, WidgetId, WidgetId) {
        let mut h = Harness::new(Expanse::new(20, 20));
        let root = h.root();
        let a = h.block(Block::default()).id();
        let b = h.block(Block::default()).id();
        h.attach(root, a, Slot::Bounds(Rect::new(0, 0, 10, 10)));
        h.attach(root, b, Slot::Bounds(Rect::new(5, 5, 10, 10)));
        h.update().unwrap();
        (h, a, b)
    }

    #[test]
    fn later_sibling_is_hit_first() {
        let (h, a, b) = siblings();
        let root = h.root();
        assert_eq!(h.app.widgets_at(Point::new(7, 7)), vec![b, a, root]);
        assert_eq!(h.app.widgets_at(Point::new(2, 2)), vec![a, root]);
        assert_eq!(h.app.widgets_at(Point::new(12, 12)), vec![b, root]);
        assert!(h.app.widgets_at(Point::new(25, 5)).is_empty());
    }

    #[test]
    fn pass_through_is_excluded_with_subtree() {
        let (mut h, a, b) = siblings();
        let c = h.block(Block::default()).id();
        h.attach(b, c, Slot::Bounds(Rect::new(6, 6, 2, 2)));
        h.update().unwrap();
        assert_eq!(h.app.widgets_at(Point::new(7, 7)), vec![c, b, a, h.root()]);

        h.with_block(b, |blk| blk.pass_through = true);
        h.update().unwrap();
        assert_eq!(h.app.widgets_at(Point::new(7, 7)), vec![a, h.root()]);
    }

    #[test]
    fn hidden_is_excluded_with_subtree() {
        let (mut h, a, b) = siblings();
        let c = h.block(Block::default()).id();
        h.attach(b, c, Slot::Bounds(Rect::new(6, 6, 2, 2)));
        h.update().unwrap();
        h.app.context(b).set_visible(b, false);
        h.update().unwrap();
        assert_eq!(h.app.widgets_at(Point::new(7, 7)), vec![a, h.root()]);
    }

    #[test]
    fn overlay_wins_regardless_of_order() {
        let mut h = Harness::new(Expanse::new(20, 20));
        let root = h.root();
        let c = h
            .block(Block {
                z_delta: OVERLAY_Z_DELTA,
                ..Default::default()
            })
            .id();
        let a = h.block(Block::default()).id();
        h.attach(root, c, Slot::Bounds(Rect::new(0, 0, 10, 10)));
        h.attach(root, a, Slot::Bounds(Rect::new(0, 0, 10, 10)));
        h.update().unwrap();

        assert_eq!(h.app.widgets_at(Point::new(3, 3)), vec![c, a, root]);
        assert_eq!(h.app.tree().layers(), &[0, 16]);

        let ctx = h.app.context(root);
        assert_eq!(ctx.z(c), 16);
        assert!(ctx.is_hit_at(c, Point::new(3, 3)));
        assert!(!ctx.is_hit_at(a, Point::new(3, 3)));
        assert!(!ctx.is_hit_at(root, Point::new(3, 3)));
        assert!(ctx.is_hit_at(root, Point::new(15, 15)));
    }

    #[test]
    fn equal_layer_does_not_occlude() {
        let (mut h, a, b) = siblings();
        let ctx = h.app.context(a);
        assert!(ctx.is_hit_at(b, Point::new(7, 7)));
        assert!(ctx.is_hit_at(a, Point::new(7, 7)));
        assert!(!ctx.is_hit_at(b, Point::new(2, 2)));
    }

    #[test]
    fn pointer_hit() {
        let (mut h, a, b) = siblings();
        h.host.move_pointer((12, 12));
        h.update().unwrap();
        let ctx = h.app.context(a);
        assert!(ctx.is_hit(b));
        assert!(!ctx.is_hit(a));
    }

    #[test]
    fn children_are_clipped_but_overlays_are_not() {
        let (mut h, a, _) = siblings();
        let inner = h.block(Block::default()).id();
        let popup = h
            .block(Block {
                z_delta: OVERLAY_Z_DELTA,
                ..Default::default()
            })
            .id();
        h.attach(a, inner, Slot::Bounds(Rect::new(8, 0, 6, 2)));
        h.attach(a, popup, Slot::Bounds(Rect::new(8, 0, 6, 2)));
        h.update().unwrap();
        let ctx = h.app.context(a);
        assert_eq!(ctx.visible_bounds(inner), Rect::new(8, 0, 2, 2));
        assert_eq!(ctx.visible_bounds(popup), Rect::new(8, 0, 6, 2));
        assert_eq!(h.app.widgets_at(Point::new(12, 1)), vec![popup, h.root()]);
    }

    #[test]
    fn cumulative_z_is_parent_plus_delta() {
        let mut h = Harness::new(Expanse::new(20, 20));
        let root = h.root();
        let mut parent = root;
        let mut ids = vec![];
        for delta in [0, OVERLAY_Z_DELTA, -3, OVERLAY_Z_DELTA] {
            let id = h
                .block(Block {
                    z_delta: delta,
                    ..Default::default()
                })
                .id();
            h.attach(parent, id, Slot::Default);
            ids.push(id);
            parent = id;
        }
        h.update().unwrap();
        let ctx = h.app.context(root);
        assert_eq!(ctx.z(root), 0);
        let zs: Vec<i64> = ids.iter().map(|id| ctx.z(*id)).collect();
        assert_eq!(zs, vec![0, 16, 13, 29]);
        assert_eq!(h.app.tree().layers(), &[0, 13, 16, 29]);
    }

    /// An overlay that hides itself the first time the pointer reaches it.
    struct Popup;

    impl Widget for Popup {
        fn build(&mut self, _: &mut Context<'_>, _: &mut ChildAppender) -> Result<()> {
            Ok(())
        }

        fn draw(&self, _: &Context<'_>, _: &mut Canvas<'_>) {}

        fn handle_pointing_input(&mut self, ctx: &mut Context<'_>) -> InputOutcome {
            let me = ctx.id();
            if ctx.is_hit(me) {
                ctx.set_visible(me, false);
            }
            InputOutcome::Ignore
        }

        fn z_delta(&self) -> i32 {
            OVERLAY_Z_DELTA
        }
    }

    /// Records whether it is hit, and what covers the pointer, when offered
    /// pointing input.
    #[derive(Default)]
    struct Under {
        seen: Rc<RefCell<Vec<(bool, Vec<WidgetId>)>>>,
    }

    impl Widget for Under {
        fn build(&mut self, _: &mut Context<'_>, _: &mut ChildAppender) -> Result<()> {
            Ok(())
        }

        fn draw(&self, _: &Context<'_>, _: &mut Canvas<'_>) {}

        fn handle_pointing_input(&mut self, ctx: &mut Context<'_>) -> InputOutcome {
            let covering = ctx.input().pointer().map(|p| ctx.widgets_at(p));
            self.seen
                .borrow_mut()
                .push((ctx.is_hit(ctx.id()), covering.unwrap_or_default()));
            InputOutcome::Ignore
        }
    }

    #[test]
    fn hiding_during_dispatch_updates_hits() {
        let mut h = Harness::new(Expanse::new(20, 20));
        let root = h.root();
        let under = Under::default();
        let seen = under.seen.clone();
        let popup = h.app.insert(Popup).id();
        let under = h.app.insert(under).id();
        h.attach(root, popup, Slot::Bounds(Rect::new(0, 0, 10, 10)));
        h.attach(root, under, Slot::Bounds(Rect::new(0, 0, 10, 10)));
        h.host.move_pointer((3, 3));
        h.update().unwrap();

        assert_eq!(seen.take(), vec![(true, vec![under, root])]);
        assert!(!h.app.context(root).is_visible(popup));
    }

    proptest! {
        #[test]
        fn hit_list_matches_model(
            kids in proptest::collection::vec(
                ((0i32..16, 0i32..16, 1u32..8, 1u32..8), prop::bool::ANY, prop::bool::ANY),
                1..6,
            ),
            px in 0i32..20,
            py in 0i32..20,
        ) {
            let mut h = Harness::new(Expanse::new(16, 16));
            let root = h.root();
            let mut model = vec![];
            for ((x, y, w, ht), overlay, pass) in &kids {
                let rect = Rect::new(*x, *y, *w, *ht);
                let z = if *overlay { OVERLAY_Z_DELTA } else { 0 };
                let id = h.block(Block { z_delta: z, pass_through: *pass, ..Default::default() }).id();
                h.attach(root, id, Slot::Bounds(rect));
                let clip = if *overlay { Some(rect) } else { rect.intersect(&Rect::new(0, 0, 16, 16)) };
                let hit = !*pass && clip.is_some_and(|c| c.contains_point(Point::new(px, py)));
                model.push((z, id, hit));
            }
            h.update().unwrap();

            let mut want: Vec<(i32, WidgetId)> = model
                .iter()
                .rev()
                .filter(|(_, _, hit)| *hit)
                .map(|(z, id, _)| (*z, *id))
                .collect();
            if Rect::new(0, 0, 16, 16).contains_point(Point::new(px, py)) {
                want.push((0, root));
            }
            want.sort_by_key(|(z, _)| std::cmp::Reverse(*z));
            let want: Vec<WidgetId> = want.into_iter().map(|(_, id)| id).collect();
            prop_assert_eq!(h.app.widgets_at(Point::new(px, py)), want);
        }
    }
}
