use super::*;

fn ramp(w: usize, h: usize) -> Vec<u16> {
    (0..w * h).map(|i| i as u16).collect()
}

#[test]
fn rejects_short_buffers() {
    let buf = vec![0u8; 5];
    assert!(PenRef::new(&buf[..], 3, 2).is_err());
    assert!(PenRef::new(&buf[..], 5, 1).is_ok());
}

#[test]
fn row_view_length_matches_distance_to_end() {
    let buf = ramp(6, 4);
    let mut pen = PenRef::new(&buf[..], 6, 4).unwrap();
    pen.move_to(2, 1);
    let off = pen.end() - pen.pos();
    assert_eq!(off, PenOffset { dx: 4, dy: 3 });
    assert_eq!(pen.x().len() as isize, off.dx);
    assert_eq!(pen.x(), &[8, 9, 10, 11]);
    assert_eq!(pen.y().count() as isize, off.dy);
    assert_eq!(pen.y().copied().collect::<Vec<_>>(), vec![8, 14, 20]);
}

#[test]
fn views_past_the_last_row_are_empty() {
    let mut buf = ramp(3, 2);
    let mut pen = Pen::new(&mut buf[..], 3, 2).unwrap();
    pen.move_to(0, 2);
    assert!(pen.x().is_empty());
    assert!(pen.x_mut().is_empty());
    assert_eq!(pen.y().count(), 0);
    pen.move_to(3, 1);
    assert!(pen.x().is_empty());
}

#[test]
fn relative_reads_and_bounds() {
    let buf = ramp(4, 4);
    let mut pen = PenRef::new(&buf[..], 4, 4).unwrap();
    pen.move_to(1, 1);
    assert_eq!(pen.get_value(), 5);
    assert_eq!(pen.get(-1, -1), 0);
    assert_eq!(pen.get(2, 2), 15);
    assert_eq!(pen.try_get(3, 0), None);
    assert_eq!(pen.try_get(-2, 0), None);
    pen.inc_x();
    pen.inc_y();
    assert_eq!(pen.get_value(), 10);
    pen.move_by(-2, 1);
    assert_eq!(pen.pos(), PenPos::new(0, 3));
}

#[test]
fn writes_land_at_cursor_offsets() {
    let mut buf = vec![0u8; 9];
    {
        let mut pen = Pen::new(&mut buf[..], 3, 3).unwrap();
        pen.move_to(1, 1);
        pen.put_value(5);
        pen.put(1, -1, 7);
        pen.x_mut()[1] = 9;
        pen.row_mut(2)[0] = 1;
    }
    assert_eq!(buf, vec![0, 0, 7, 0, 5, 9, 1, 0, 0]);
}

#[test]
#[should_panic]
fn out_of_bounds_write_panics() {
    let mut buf = vec![0u8; 4];
    let mut pen = Pen::new(&mut buf[..], 2, 2).unwrap();
    pen.put(2, 0, 1);
}
