use std::ops::Sub;

use crate::foundation::core::VectorInt;

/// Injectable strict-less predicate used by every rectangle operation.
///
/// Never assumed to be `<`: epsilon orderings for floats are supplied the same
/// way as the native one.
pub trait StrictOrder<T: ?Sized> {
    fn less(&self, a: &T, b: &T) -> bool;
}

/// The native `<` ordering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NativeLess;

impl<T: PartialOrd> StrictOrder<T> for NativeLess {
    fn less(&self, a: &T, b: &T) -> bool {
        a < b
    }
}

/// `a < b` only when `a` is below `b` by more than `epsilon`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpsilonLess {
    pub epsilon: f64,
}

impl EpsilonLess {
    pub const fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }
}

impl StrictOrder<f64> for EpsilonLess {
    fn less(&self, a: &f64, b: &f64) -> bool {
        *a < *b - self.epsilon
    }
}

impl StrictOrder<f32> for EpsilonLess {
    fn less(&self, a: &f32, b: &f32) -> bool {
        f64::from(*a) < f64::from(*b) - self.epsilon
    }
}

impl<T, F> StrictOrder<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    fn less(&self, a: &T, b: &T) -> bool {
        self(a, b)
    }
}

pub(crate) fn min_by<T: Copy, L: StrictOrder<T> + ?Sized>(a: T, b: T, less: &L) -> T {
    if less.less(&b, &a) { b } else { a }
}

pub(crate) fn max_by<T: Copy, L: StrictOrder<T> + ?Sized>(a: T, b: T, less: &L) -> T {
    if less.less(&a, &b) { b } else { a }
}

pub(crate) fn equal_by<T, L: StrictOrder<T> + ?Sized>(a: &T, b: &T, less: &L) -> bool {
    !less.less(a, b) && !less.less(b, a)
}

/// Axis-aligned rectangle over an ordered scalar.
///
/// A rectangle is *valid* when `minx < maxx && miny < maxy` under the
/// predicate in use. Invalid rectangles are representable and every set
/// operation treats them as empty; callers check [`Rect::valid`] before
/// reading the bounds of a computed result.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Rect<T> {
    pub minx: T,
    pub miny: T,
    pub maxx: T,
    pub maxy: T,
}

/// Pixel-space rectangle, half-open on the max edges.
pub type RectInt = Rect<i32>;

/// Real-valued rectangle.
pub type RectReal = Rect<f64>;

impl<T: Copy> Rect<T> {
    /// Degenerate rectangle covering the single point `(x, y)`.
    pub fn from_point(x: T, y: T) -> Self {
        Self {
            minx: x,
            miny: y,
            maxx: x,
            maxy: y,
        }
    }

    /// Store the bounds verbatim, without reordering.
    pub fn from_bounds(minx: T, miny: T, maxx: T, maxy: T) -> Self {
        Self {
            minx,
            miny,
            maxx,
            maxy,
        }
    }

    /// Rectangle spanning both corners under `less`, in any order.
    pub fn new_by<L: StrictOrder<T> + ?Sized>(x0: T, y0: T, x1: T, y1: T, less: &L) -> Self {
        let mut r = Self::from_point(x0, y0);
        r.expand_by(x1, y1, less);
        r
    }

    pub fn set_point(&mut self, x: T, y: T) {
        *self = Self::from_point(x, y);
    }

    pub fn valid_by<L: StrictOrder<T> + ?Sized>(&self, less: &L) -> bool {
        less.less(&self.minx, &self.maxx) && less.less(&self.miny, &self.maxy)
    }

    /// Grow the bounds to include `(x, y)`.
    pub fn expand_by<L: StrictOrder<T> + ?Sized>(&mut self, x: T, y: T, less: &L) {
        self.minx = min_by(self.minx, x, less);
        self.miny = min_by(self.miny, y, less);
        self.maxx = max_by(self.maxx, x, less);
        self.maxy = max_by(self.maxy, y, less);
    }

    /// Opposing edges overlap strictly; sharing an edge is not intersecting.
    pub fn intersects_by<L: StrictOrder<T> + ?Sized>(&self, other: &Self, less: &L) -> bool {
        less.less(&self.minx, &other.maxx)
            && less.less(&other.minx, &self.maxx)
            && less.less(&self.miny, &other.maxy)
            && less.less(&other.miny, &self.maxy)
    }

    /// Every edge of `small` lies inside or on the matching edge of `self`.
    pub fn contains_by<L: StrictOrder<T> + ?Sized>(&self, small: &Self, less: &L) -> bool {
        !less.less(&small.minx, &self.minx)
            && !less.less(&self.maxx, &small.maxx)
            && !less.less(&small.miny, &self.miny)
            && !less.less(&self.maxy, &small.maxy)
    }

    /// Componentwise max of mins / min of maxes. May be invalid.
    pub fn intersection_by<L: StrictOrder<T> + ?Sized>(&self, other: &Self, less: &L) -> Self {
        Self {
            minx: max_by(self.minx, other.minx, less),
            miny: max_by(self.miny, other.miny, less),
            maxx: min_by(self.maxx, other.maxx, less),
            maxy: min_by(self.maxy, other.maxy, less),
        }
    }

    /// Bounding box of both inputs; covers any gap between disjoint rects.
    pub fn union_by<L: StrictOrder<T> + ?Sized>(&self, other: &Self, less: &L) -> Self {
        Self {
            minx: min_by(self.minx, other.minx, less),
            miny: min_by(self.miny, other.miny, less),
            maxx: max_by(self.maxx, other.maxx, less),
            maxy: max_by(self.maxy, other.maxy, less),
        }
    }
}

impl<T: Copy + PartialOrd> Rect<T> {
    pub fn new(x0: T, y0: T, x1: T, y1: T) -> Self {
        Self::new_by(x0, y0, x1, y1, &NativeLess)
    }

    pub fn valid(&self) -> bool {
        self.valid_by(&NativeLess)
    }

    pub fn expand(&mut self, x: T, y: T) {
        self.expand_by(x, y, &NativeLess);
    }

    pub fn intersects(&self, other: &Self) -> bool {
        self.intersects_by(other, &NativeLess)
    }

    pub fn contains(&self, small: &Self) -> bool {
        self.contains_by(small, &NativeLess)
    }

    pub fn intersection(&self, other: &Self) -> Self {
        self.intersection_by(other, &NativeLess)
    }

    pub fn union(&self, other: &Self) -> Self {
        self.union_by(other, &NativeLess)
    }
}

impl<T: Copy + Sub<Output = T>> Rect<T> {
    pub fn width(&self) -> T {
        self.maxx - self.minx
    }

    pub fn height(&self) -> T {
        self.maxy - self.miny
    }
}

impl Rect<i32> {
    pub const fn zero() -> Self {
        Self {
            minx: 0,
            miny: 0,
            maxx: 0,
            maxy: 0,
        }
    }

    /// Rectangle of size `width x height` anchored at the origin.
    pub const fn with_size(width: i32, height: i32) -> Self {
        Self {
            minx: 0,
            miny: 0,
            maxx: width,
            maxy: height,
        }
    }

    pub fn min_point(&self) -> VectorInt {
        VectorInt::new(self.minx, self.miny)
    }

    pub fn size(&self) -> VectorInt {
        VectorInt::new(self.width(), self.height())
    }

    /// Pixel count; zero for invalid rectangles.
    pub fn area(&self) -> i64 {
        if !self.valid() {
            return 0;
        }
        (i64::from(self.maxx) - i64::from(self.minx)) * (i64::from(self.maxy) - i64::from(self.miny))
    }

    /// Half-open containment test for a pixel.
    pub fn is_inside(&self, x: i32, y: i32) -> bool {
        x >= self.minx && x < self.maxx && y >= self.miny && y < self.maxy
    }

    /// Shift by `v`. Bounds saturate at the `i32` range.
    pub fn translate(&self, v: VectorInt) -> Self {
        Self {
            minx: self.minx.saturating_add(v.x),
            miny: self.miny.saturating_add(v.y),
            maxx: self.maxx.saturating_add(v.x),
            maxy: self.maxy.saturating_add(v.y),
        }
    }

    /// Grow every edge outwards by `r`.
    pub fn expand_by_radius(&self, r: i32) -> Self {
        self.expand_x(r).expand_y(r)
    }

    pub fn expand_x(&self, r: i32) -> Self {
        Self {
            minx: self.minx.saturating_sub(r),
            maxx: self.maxx.saturating_add(r),
            ..*self
        }
    }

    pub fn expand_y(&self, r: i32) -> Self {
        Self {
            miny: self.miny.saturating_sub(r),
            maxy: self.maxy.saturating_add(r),
            ..*self
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/rect.rs"]
mod tests;
