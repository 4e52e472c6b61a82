use proptest::prelude::*;
use tilecrawl_core::{Position, VisibilityMask};
use tilecrawl_system_visibility::{line, trace_ray, Config, Visibility};

fn disk(center: Position, radius: f64, width: u32, height: u32) -> Vec<Position> {
    (0..height as i32)
        .flat_map(|y| (0..width as i32).map(move |x| Position::new(x, y)))
        .filter(|cell| center.euclidean_distance(*cell) <= radius)
        .collect()
}

#[test]
fn open_floor_reveals_exactly_the_sight_disk() {
    let visibility = Visibility::new(Config::new(3, 360));
    let viewer = Position::new(5, 5);
    let mask = visibility.compute(viewer, (10, 10), |_| false);

    let visible: Vec<_> = mask.iter_visible().collect();
    assert_eq!(visible, disk(viewer, 3.0, 10, 10));
    assert!(!mask.is_visible(Position::new(8, 8)));
    assert!(!mask.is_visible(Position::new(0, 0)));
    assert!(mask.is_visible(Position::new(5, 2)));
}

#[test]
fn larger_radius_still_covers_the_disk() {
    let visibility = Visibility::default();
    let viewer = Position::new(20, 20);
    let mask = visibility.compute(viewer, (40, 40), |_| false);

    assert_eq!(
        mask.iter_visible().collect::<Vec<_>>(),
        disk(viewer, 8.0, 40, 40)
    );
}

#[test]
fn wall_column_hides_everything_behind_it() {
    let visibility = Visibility::new(Config::new(5, 360));
    let viewer = Position::new(1, 1);
    let mask = visibility.compute(viewer, (7, 3), |cell| cell.x() == 3);

    assert!(mask.is_visible(Position::new(3, 1)), "walls themselves are seen");
    assert!(mask.iter_visible().all(|cell| cell.x() <= 3));
}

#[test]
fn visibility_is_clipped_at_grid_edges() {
    let visibility = Visibility::new(Config::new(4, 360));
    let mask = visibility.compute(Position::new(0, 0), (3, 3), |_| false);
    assert_eq!(mask.visible_count(), 9);
}

#[test]
fn huge_sight_radius_is_bounded_by_the_grid() {
    let visibility = Visibility::new(Config::new(3_000_000_000, 360));
    let mask = visibility.compute(Position::new(2, 1), (5, 3), |_| false);
    assert_eq!(mask.visible_count(), 15);

    let mut mask = VisibilityMask::new(5, 1);
    let marked = trace_ray(
        Position::new(0, 0),
        Position::new(i32::MAX, 0),
        f64::from(u32::MAX),
        |_| false,
        &mut mask,
    );
    assert_eq!(marked, 5);
}

proptest! {
    #[test]
    fn marked_cells_form_a_prefix_of_the_line(
        opaque in prop::collection::vec(prop::bool::weighted(0.2), 100),
        viewer in (0i32..10, 0i32..10),
        endpoint in (-4i32..14, -4i32..14),
        radius in 0u32..12,
    ) {
        let viewer = Position::new(viewer.0, viewer.1);
        let endpoint = Position::new(endpoint.0, endpoint.1);
        let is_opaque = |cell: Position| {
            (0..10).contains(&cell.x())
                && (0..10).contains(&cell.y())
                && opaque[(cell.y() * 10 + cell.x()) as usize]
        };

        let mut mask = VisibilityMask::new(10, 10);
        let marked = trace_ray(viewer, endpoint, f64::from(radius), is_opaque, &mut mask);
        let points: Vec<_> = line(viewer, endpoint).collect();

        prop_assert_eq!(mask.visible_count(), marked);
        for (index, cell) in points.iter().enumerate() {
            prop_assert_eq!(mask.is_visible(*cell), index < marked);
        }
        for cell in &points[..marked.saturating_sub(1)] {
            prop_assert!(!is_opaque(*cell), "ray continued past an opaque cell");
        }
    }
}
