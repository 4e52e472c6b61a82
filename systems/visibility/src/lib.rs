#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Radial line-of-sight system that rebuilds the visibility overlay.
//!
//! Rays are cast at fixed angular increments from the viewer and rasterised
//! with Bresenham's line algorithm. Each ray marks cells until it leaves the
//! grid, passes the sight radius or marks an opaque cell. One-degree rays can
//! skip thin diagonal gaps; the overlay is an approximation, not exact shadow
//! casting.

use tilecrawl_core::{Position, VisibilityMask};

/// Ray casting parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    sight_radius: u32,
    ray_count: u32,
}

impl Config {
    /// Creates a configuration; at least one ray is always cast.
    #[must_use]
    pub fn new(sight_radius: u32, ray_count: u32) -> Self {
        Self {
            sight_radius,
            ray_count: ray_count.max(1),
        }
    }

    /// Maximum Euclidean distance, in cells, that a ray travels.
    #[must_use]
    pub const fn sight_radius(&self) -> u32 {
        self.sight_radius
    }

    /// Number of rays cast around the viewer.
    #[must_use]
    pub const fn ray_count(&self) -> u32 {
        self.ray_count
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(8, 360)
    }
}

/// Pure system that computes the visibility overlay for a viewer.
#[derive(Clone, Debug)]
pub struct Visibility {
    config: Config,
    endpoints: Vec<(i32, i32)>,
}

impl Visibility {
    /// Creates the system and precomputes ray endpoint offsets.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let radius = f64::from(config.sight_radius);
        let rays = f64::from(config.ray_count);
        let endpoints = (0..config.ray_count)
            .map(|index| {
                let angle = (f64::from(index) * 360.0 / rays).to_radians();
                (
                    (radius * angle.cos()).round() as i32,
                    (radius * angle.sin()).round() as i32,
                )
            })
            .collect();

        Self { config, endpoints }
    }

    /// Configuration the system was built with.
    #[must_use]
    pub const fn config(&self) -> Config {
        self.config
    }

    /// Computes a fresh mask for a `dimensions`-sized grid seen from `viewer`.
    ///
    /// `is_opaque` reports cells that stop a ray after being marked.
    pub fn compute<F>(
        &self,
        viewer: Position,
        dimensions: (u32, u32),
        mut is_opaque: F,
    ) -> VisibilityMask
    where
        F: FnMut(Position) -> bool,
    {
        let (width, height) = dimensions;
        let mut mask = VisibilityMask::new(width, height);
        let _ = mask.mark(viewer);

        let radius = f64::from(self.config.sight_radius);
        for &(dx, dy) in &self.endpoints {
            let endpoint = Position::new(viewer.x().saturating_add(dx), viewer.y().saturating_add(dy));
            let _ = trace_ray(viewer, endpoint, radius, &mut is_opaque, &mut mask);
        }

        mask
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Marks cells along the line from `viewer` to `endpoint` and returns how
/// many line cells were marked.
///
/// The marked cells are always a prefix of [`line`]. The ray stops before the
/// first cell that lies outside the mask or farther than `radius` from the
/// viewer, and stops after the first opaque cell.
pub fn trace_ray<F>(
    viewer: Position,
    endpoint: Position,
    radius: f64,
    mut is_opaque: F,
    mask: &mut VisibilityMask,
) -> usize
where
    F: FnMut(Position) -> bool,
{
    let mut marked = 0;
    for cell in line(viewer, endpoint) {
        if viewer.euclidean_distance(cell) > radius || !mask.mark(cell) {
            break;
        }
        marked += 1;
        if is_opaque(cell) {
            break;
        }
    }
    marked
}

/// Rasterises the straight segment between two cells, both ends included.
///
/// Cells are produced lazily, so a caller that stops early never pays for the
/// rest of a long segment.
#[must_use]
pub fn line(from: Position, to: Position) -> Line {
    let (x, y) = (i64::from(from.x()), i64::from(from.y()));
    let (end_x, end_y) = (i64::from(to.x()), i64::from(to.y()));
    let dx = (end_x - x).abs();
    let dy = (end_y - y).abs();

    Line {
        x,
        y,
        end_x,
        end_y,
        dx,
        dy,
        step_x: if x < end_x { 1 } else { -1 },
        step_y: if y < end_y { 1 } else { -1 },
        error: dx - dy,
        finished: false,
    }
}

/// Iterator over the cells of a Bresenham segment, returned by [`line`].
#[derive(Clone, Debug)]
pub struct Line {
    x: i64,
    y: i64,
    end_x: i64,
    end_y: i64,
    dx: i64,
    dy: i64,
    step_x: i64,
    step_y: i64,
    error: i64,
    finished: bool,
}

impl Iterator for Line {
    type Item = Position;

    fn next(&mut self) -> Option<Position> {
        if self.finished {
            return None;
        }
        let (Ok(x), Ok(y)) = (i32::try_from(self.x), i32::try_from(self.y)) else {
            self.finished = true;
            return None;
        };
        if self.x == self.end_x && self.y == self.end_y {
            self.finished = true;
            return Some(Position::new(x, y));
        }

        let doubled = 2 * self.error;
        if doubled > -self.dy {
            self.error -= self.dy;
            self.x += self.step_x;
        }
        if doubled < self.dx {
            self.error += self.dx;
            self.y += self.step_y;
        }
        Some(Position::new(x, y))
    }
}
