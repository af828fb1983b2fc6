//! Axis-aligned collision kernel
//!
//! Every solid in the world is an axis-aligned rectangle with its origin at
//! the top-left corner (y grows downward). Overlap is strict: rectangles that
//! only share an edge are not touching.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    #[inline]
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.w * 0.5, self.h * 0.5)
    }

    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Does a circle intersect this rectangle?
    pub fn intersects_circle(&self, center: Vec2, radius: f32) -> bool {
        let closest = Vec2::new(
            center.x.clamp(self.x, self.right()),
            center.y.clamp(self.y, self.bottom()),
        );
        closest.distance_squared(center) < radius * radius
    }
}

/// Strict rectangle overlap: touching edges do not count
#[inline]
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

/// Area of the intersection of two rectangles (0 when apart)
#[inline]
pub fn overlap_area(a: &Rect, b: &Rect) -> f32 {
    let w = a.right().min(b.right()) - a.x.max(b.x);
    let h = a.bottom().min(b.bottom()) - a.y.max(b.y);
    if w > 0.0 && h > 0.0 { w * h } else { 0.0 }
}

/// Which face of the obstacle the entity was pushed out through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Pushed sideways; horizontal velocity zeroed
    Side,
    /// Pushed up onto the obstacle's top face
    Landed,
    /// Pushed down off the obstacle's underside
    Ceiling,
}

/// Minimum translation that separates `a` from `b`
///
/// Pushes along the axis of smaller penetration; an exact tie resolves
/// vertically. Returns `None` when the rectangles don't overlap.
pub fn min_translation(a: &Rect, b: &Rect) -> Option<(Vec2, Contact)> {
    if !overlaps(a, b) {
        return None;
    }

    let delta = a.center() - b.center();
    let half = a.half_extents() + b.half_extents();
    let pen_x = half.x - delta.x.abs();
    let pen_y = half.y - delta.y.abs();

    if pen_x < pen_y {
        let target_x = if delta.x >= 0.0 {
            b.right() + skin(b.right())
        } else {
            b.x - a.w - skin(b.x)
        };
        Some((Vec2::new(target_x - a.x, 0.0), Contact::Side))
    } else if delta.y <= 0.0 {
        let target_y = b.y - a.h - skin(b.y);
        Some((Vec2::new(0.0, target_y - a.y), Contact::Landed))
    } else {
        let target_y = b.bottom() + skin(b.bottom());
        Some((Vec2::new(0.0, target_y - a.y), Contact::Ceiling))
    }
}

/// Separation gap left after a push so float rounding can't re-overlap
#[inline]
fn skin(edge: f32) -> f32 {
    (edge.abs() * f32::EPSILON * 4.0).max(1e-3)
}

/// Anything the kernel can push around
pub trait Body {
    fn rect(&self) -> Rect;
    fn translate(&mut self, delta: Vec2);
    fn vel(&self) -> Vec2;
    fn vel_mut(&mut self) -> &mut Vec2;
}

/// Push `body` out of `obstacle` and apply the velocity side effects
///
/// - side contact zeroes horizontal velocity
/// - landing zeroes vertical velocity
/// - ceiling contact clamps vertical velocity to >= 0 without zeroing it
///
/// The caller records grounding/support from the returned contact.
pub fn resolve<B: Body + ?Sized>(body: &mut B, obstacle: &Rect) -> Option<Contact> {
    let (push, contact) = min_translation(&body.rect(), obstacle)?;
    body.translate(push);
    let vel = body.vel_mut();
    match contact {
        Contact::Side => vel.x = 0.0,
        Contact::Landed => vel.y = 0.0,
        Contact::Ceiling => vel.y = vel.y.max(0.0),
    }
    Some(contact)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe {
        rect: Rect,
        vel: Vec2,
    }

    impl Body for Probe {
        fn rect(&self) -> Rect {
            self.rect
        }
        fn translate(&mut self, delta: Vec2) {
            self.rect.x += delta.x;
            self.rect.y += delta.y;
        }
        fn vel(&self) -> Vec2 {
            self.vel
        }
        fn vel_mut(&mut self) -> &mut Vec2 {
            &mut self.vel
        }
    }

    fn probe(x: f32, y: f32, w: f32, h: f32, vel: Vec2) -> Probe {
        Probe {
            rect: Rect::new(x, y, w, h),
            vel,
        }
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        let c = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!overlaps(&a, &b));
        assert!(!overlaps(&a, &c));
        assert!(overlaps(&a, &Rect::new(9.9, 9.9, 5.0, 5.0)));
    }

    #[test]
    fn test_landing_zeroes_vertical_velocity() {
        let ground = Rect::new(0.0, 100.0, 200.0, 40.0);
        let mut p = probe(50.0, 62.0, 32.0, 44.0, Vec2::new(120.0, 300.0));

        assert_eq!(resolve(&mut p, &ground), Some(Contact::Landed));
        assert_eq!(p.vel, Vec2::new(120.0, 0.0));
        assert!(p.rect.bottom() <= ground.y);
    }

    #[test]
    fn test_side_push_zeroes_horizontal_velocity() {
        let wall = Rect::new(100.0, 0.0, 40.0, 200.0);
        let mut p = probe(75.0, 50.0, 32.0, 44.0, Vec2::new(250.0, -40.0));

        assert_eq!(resolve(&mut p, &wall), Some(Contact::Side));
        assert_eq!(p.vel, Vec2::new(0.0, -40.0));
        assert!(p.rect.right() <= wall.x);
    }

    #[test]
    fn test_ceiling_clamps_without_zeroing_fall() {
        let slab = Rect::new(0.0, 0.0, 200.0, 20.0);

        let mut rising = probe(50.0, 15.0, 32.0, 44.0, Vec2::new(0.0, -500.0));
        assert_eq!(resolve(&mut rising, &slab), Some(Contact::Ceiling));
        assert_eq!(rising.vel.y, 0.0);

        let mut falling = probe(50.0, 15.0, 32.0, 44.0, Vec2::new(0.0, 80.0));
        assert_eq!(resolve(&mut falling, &slab), Some(Contact::Ceiling));
        assert_eq!(falling.vel.y, 80.0);
        assert!(falling.rect.y >= slab.bottom());
    }

    #[test]
    fn test_exact_tie_prefers_vertical() {
        // Equal 4px penetration on both axes, entity above-left
        let obstacle = Rect::new(10.0, 10.0, 10.0, 10.0);
        let mut p = probe(4.0, 4.0, 10.0, 10.0, Vec2::new(5.0, 5.0));

        assert_eq!(resolve(&mut p, &obstacle), Some(Contact::Landed));
        assert_eq!(p.rect.x, 4.0);
        assert_eq!(p.vel.x, 5.0);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let obstacle = Rect::new(0.0, 0.0, 50.0, 50.0);
        let mut p = probe(40.0, 30.0, 20.0, 20.0, Vec2::new(10.0, 10.0));

        assert!(resolve(&mut p, &obstacle).is_some());
        assert!(!overlaps(&p.rect(), &obstacle));
        let before = p.rect;
        assert_eq!(resolve(&mut p, &obstacle), None);
        assert_eq!(p.rect, before);
    }

    #[test]
    fn test_circle_rect_intersection() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.intersects_circle(Vec2::new(15.0, 5.0), 6.0));
        assert!(!r.intersects_circle(Vec2::new(15.0, 5.0), 4.0));
        assert!(r.intersects_circle(Vec2::new(5.0, 5.0), 1.0));
    }
}
