use super::rect::{NativeLess, Rect, RectInt, StrictOrder, equal_by};

/// Remove `r` from every rectangle in `list`.
///
/// Each overlapped rectangle is replaced, at its position, by up to four
/// disjoint pieces (left and right full-height strips, then the top and
/// bottom strips between them). Rectangles that do not overlap `r` are left
/// untouched. An invalid `r` is a no-op.
pub fn rects_subtract_by<T, L>(list: &mut Vec<Rect<T>>, r: &Rect<T>, less: &L)
where
    T: Copy,
    L: StrictOrder<T> + ?Sized,
{
    if !r.valid_by(less) {
        return;
    }
    let mut out = Vec::with_capacity(list.len() + 3);
    for x in list.drain(..) {
        let y = x.intersection_by(r, less);
        if !y.valid_by(less) {
            out.push(x);
            continue;
        }
        let pieces = [
            Rect::from_bounds(x.minx, x.miny, y.minx, x.maxy),
            Rect::from_bounds(y.maxx, x.miny, x.maxx, x.maxy),
            Rect::from_bounds(y.minx, x.miny, y.maxx, y.miny),
            Rect::from_bounds(y.minx, y.maxy, y.maxx, x.maxy),
        ];
        out.extend(pieces.into_iter().filter(|p| p.valid_by(less)));
    }
    *list = out;
}

pub fn rects_subtract<T: Copy + PartialOrd>(list: &mut Vec<Rect<T>>, r: &Rect<T>) {
    rects_subtract_by(list, r, &NativeLess);
}

/// Subtract `r` from the list, then append it. The list stays pairwise
/// disjoint if it was before.
pub fn rects_add_by<T, L>(list: &mut Vec<Rect<T>>, r: &Rect<T>, less: &L)
where
    T: Copy,
    L: StrictOrder<T> + ?Sized,
{
    if !r.valid_by(less) {
        return;
    }
    rects_subtract_by(list, r, less);
    list.push(*r);
}

pub fn rects_add<T: Copy + PartialOrd>(list: &mut Vec<Rect<T>>, r: &Rect<T>) {
    rects_add_by(list, r, &NativeLess);
}

/// Drop invalid rectangles, then coalesce pairs sharing a full edge until
/// no pair merges.
///
/// Two rectangles merge horizontally when one's right edge is the other's
/// left edge and their vertical extents match, and vertically when one's
/// bottom edge is the other's top edge and their horizontal extents match.
/// The covered area never changes.
pub fn rects_merge_by<T, L>(list: &mut Vec<Rect<T>>, less: &L)
where
    T: Copy,
    L: StrictOrder<T> + ?Sized,
{
    list.retain(|r| r.valid_by(less));

    let eq = |a: &T, b: &T| equal_by(a, b, less);
    let mut merged_any = true;
    while merged_any {
        merged_any = false;
        let mut i = 0;
        while i < list.len() {
            let mut merged = false;
            for j in 0..list.len() {
                if i == j {
                    continue;
                }
                let (a, b) = (list[i], list[j]);
                if eq(&a.maxx, &b.minx) && eq(&a.miny, &b.miny) && eq(&a.maxy, &b.maxy) {
                    list[j].minx = a.minx;
                    merged = true;
                } else if eq(&a.maxy, &b.miny) && eq(&a.minx, &b.minx) && eq(&a.maxx, &b.maxx) {
                    list[j].miny = a.miny;
                    merged = true;
                }
                if merged {
                    list.remove(i);
                    break;
                }
            }
            if merged {
                merged_any = true;
            } else {
                i += 1;
            }
        }
    }
}

pub fn rects_merge<T: Copy + PartialOrd>(list: &mut Vec<Rect<T>>) {
    rects_merge_by(list, &NativeLess);
}

/// Set of pixels needing a re-render, kept as disjoint integer rectangles.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DamageRegion {
    rects: Vec<RectInt>,
}

impl DamageRegion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rect(r: RectInt) -> Self {
        let mut d = Self::new();
        d.add(r);
        d
    }

    pub fn rects(&self) -> &[RectInt] {
        &self.rects
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn add(&mut self, r: RectInt) {
        rects_add(&mut self.rects, &r);
    }

    pub fn subtract(&mut self, r: RectInt) {
        rects_subtract(&mut self.rects, &r);
    }

    pub fn merge(&mut self) {
        rects_merge(&mut self.rects);
    }

    pub fn clear(&mut self) {
        self.rects.clear();
    }

    /// Bounding box of the region, `None` when empty.
    pub fn bounds(&self) -> Option<RectInt> {
        let (first, rest) = self.rects.split_first()?;
        Some(rest.iter().fold(*first, |acc, r| acc.union(r)))
    }

    /// Covered pixel count. Exact because the rectangles are disjoint.
    pub fn area(&self) -> i64 {
        self.rects.iter().map(RectInt::area).sum()
    }

    pub fn covers(&self, x: i32, y: i32) -> bool {
        self.rects.iter().any(|r| r.is_inside(x, y))
    }
}

impl FromIterator<RectInt> for DamageRegion {
    fn from_iter<I: IntoIterator<Item = RectInt>>(iter: I) -> Self {
        let mut d = Self::new();
        for r in iter {
            d.add(r);
        }
        d
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/region.rs"]
mod tests;
