use super::*;

#[test]
fn new_normalises_corner_order() {
    let r = RectInt::new(10, 8, 2, 3);
    assert_eq!(r, Rect::from_bounds(2, 3, 10, 8));
    assert!(r.valid());
}

#[test]
fn degenerate_rects_are_invalid() {
    assert!(!RectInt::from_point(4, 4).valid());
    assert!(!RectInt::from_bounds(0, 0, 5, 0).valid());
    assert!(!RectInt::from_bounds(3, 0, 1, 2).valid());
}

#[test]
fn edge_touching_rects_do_not_intersect() {
    let a = RectInt::new(0, 0, 10, 10);
    let b = RectInt::new(10, 0, 20, 10);
    assert!(!a.intersects(&b));
    assert!(!b.intersects(&a));
    assert!(!a.intersection(&b).valid());

    let c = RectInt::new(9, 9, 12, 12);
    assert!(a.intersects(&c));
    assert_eq!(a.intersection(&c), RectInt::new(9, 9, 10, 10));
}

#[test]
fn contains_is_inclusive_on_edges() {
    let big = RectInt::new(0, 0, 10, 10);
    assert!(big.contains(&big));
    assert!(big.contains(&RectInt::new(2, 2, 10, 5)));
    assert!(!big.contains(&RectInt::new(-1, 2, 5, 5)));
}

#[test]
fn union_covers_gap_between_disjoint_rects() {
    let a = RectInt::new(0, 0, 2, 2);
    let b = RectInt::new(5, 6, 7, 8);
    let u = a.union(&b);
    assert_eq!(u, RectInt::new(0, 0, 7, 8));
    assert!(u.contains(&a) && u.contains(&b));
}

#[test]
fn intersection_after_union_recovers_each_operand() {
    let a = RectInt::new(-3, 1, 4, 9);
    let b = RectInt::new(2, -5, 6, 3);
    let u = a.union(&b);
    assert_eq!(u.intersection(&a), a);
    assert_eq!(u.intersection(&b), b);
}

#[test]
fn epsilon_predicate_treats_near_values_as_equal() {
    let eps = EpsilonLess::new(1e-3);
    let a = RectReal::from_bounds(0.0, 0.0, 1.0, 1.0);
    let b = RectReal::from_bounds(0.9995, 0.0, 2.0, 1.0);
    assert!(a.intersects(&b));
    assert!(!a.intersects_by(&b, &eps));

    let thin = RectReal::from_bounds(0.0, 0.0, 0.0005, 1.0);
    assert!(thin.valid());
    assert!(!thin.valid_by(&eps));
}

#[test]
fn closure_predicates_are_accepted() {
    let reversed = |a: &i32, b: &i32| a > b;
    let r = Rect::new_by(0, 0, 5, 5, &reversed);
    // Under a reversed ordering the "min" corner holds the larger values.
    assert_eq!(r, Rect::from_bounds(5, 5, 0, 0));
    assert!(r.valid_by(&reversed));
}

#[test]
fn int_helpers() {
    let r = RectInt::new(2, 3, 6, 5);
    assert_eq!(r.width(), 4);
    assert_eq!(r.height(), 2);
    assert_eq!(r.area(), 8);
    assert_eq!(RectInt::from_bounds(5, 5, 1, 1).area(), 0);
    assert!(r.is_inside(2, 3));
    assert!(!r.is_inside(6, 3));
    assert_eq!(r.translate(VectorInt::new(-2, -3)), RectInt::with_size(4, 2));
    assert_eq!(r.expand_by_radius(1), RectInt::new(1, 2, 7, 6));
    assert_eq!(r.expand_x(2), RectInt::new(0, 3, 8, 5));
}
