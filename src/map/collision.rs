// Swept box-vs-tile collision
// checks run up, down, right, left and each one clamps the displacement the
// later checks see

use bevy::prelude::*;

use crate::map::tilemap::TileMap;

/// Gap kept between a resolved edge and a solid cell so an actor resting on
/// the floor does not flicker between grounded and airborne.
pub const DEFAULT_CLEARANCE: f32 = 0.04;

/// Box corners, named from the actor's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    RightBottom,
    LeftBottom,
    RightTop,
    LeftTop,
}

pub fn corner_position(center: Vec3, half_extents: Vec2, corner: Corner) -> Vec3 {
    let offset = match corner {
        Corner::RightBottom => Vec3::new(half_extents.x, -half_extents.y, 0.0),
        Corner::LeftBottom => Vec3::new(-half_extents.x, -half_extents.y, 0.0),
        Corner::RightTop => Vec3::new(half_extents.x, half_extents.y, 0.0),
        Corner::LeftTop => Vec3::new(-half_extents.x, half_extents.y, 0.0),
    };
    center + offset
}

/// Which sides hit something this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapContact {
    pub ceiling: bool,
    pub landing: bool,
    pub wall: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved {
    pub displacement: Vec3,
    pub contact: MapContact,
}

pub struct CollisionResolver<'a> {
    map: &'a TileMap,
    clearance: f32,
}

impl<'a> CollisionResolver<'a> {
    pub fn new(map: &'a TileMap, clearance: f32) -> Self {
        Self { map, clearance }
    }

    /// Clamp `displacement` so the box at `position` with `half_extents`
    /// never ends up inside a solid cell.
    pub fn resolve(&self, position: Vec3, half_extents: Vec2, displacement: Vec3) -> Resolved {
        let mut info = Resolved { displacement, contact: MapContact::default() };
        self.check_up(position, half_extents, &mut info);
        self.check_down(position, half_extents, &mut info);
        self.check_right(position, half_extents, &mut info);
        self.check_left(position, half_extents, &mut info);
        info
    }

    /// Probe `depth` below both bottom corners. Separate from the downward
    /// sweep so an actor standing still can notice it walked off a ledge.
    pub fn is_supported(&self, position: Vec3, half_extents: Vec2, depth: f32) -> bool {
        let probe = Vec3::new(0.0, -depth, 0.0);
        let row = self.map.index_of(corner_position(position, half_extents, Corner::LeftBottom) + probe).row;
        let (first, last) = self.column_span(position.x, half_extents.x);
        self.first_solid_in_row(row, first, last).is_some()
    }

    fn check_up(&self, position: Vec3, half: Vec2, info: &mut Resolved) {
        if info.displacement.y <= 0.0 {
            return;
        }
        let moved = position + info.displacement;
        let now = self.row_of_top_edge(position.y + half.y);
        let next = self.row_of_top_edge(moved.y + half.y);
        let (first, last) = self.column_span(moved.x, half.x);

        // rows count downward, so rising walks toward smaller rows
        for row in (next..now).rev() {
            if let Some(col) = self.first_solid_in_row(row, first, last) {
                let rect = self.map.rect_of(col, row);
                info.displacement.y = (rect.bottom - (position.y + half.y) - self.clearance).max(0.0);
                info.contact.ceiling = true;
                return;
            }
        }
    }

    fn check_down(&self, position: Vec3, half: Vec2, info: &mut Resolved) {
        if info.displacement.y >= 0.0 {
            return;
        }
        let moved = position + info.displacement;
        let now = self.map.index_of(corner_position(position, half, Corner::LeftBottom)).row;
        let next = self.map.index_of(corner_position(moved, half, Corner::LeftBottom)).row;
        let (first, last) = self.column_span(moved.x, half.x);

        for row in (now + 1)..=next {
            if let Some(col) = self.first_solid_in_row(row, first, last) {
                let rect = self.map.rect_of(col, row);
                info.displacement.y = (rect.top - (position.y - half.y) + self.clearance).min(0.0);
                info.contact.landing = true;
                return;
            }
        }
    }

    fn check_right(&self, position: Vec3, half: Vec2, info: &mut Resolved) {
        if info.displacement.x <= 0.0 {
            return;
        }
        let moved = position + info.displacement;
        let now = self.col_of_right_edge(position.x + half.x);
        let next = self.col_of_right_edge(moved.x + half.x);
        let (top, bottom) = self.row_span(moved.y, half.y);

        for col in (now + 1)..=next {
            if self.first_solid_in_column(col, top, bottom).is_some() {
                let rect = self.map.rect_of(col, top);
                info.displacement.x = (rect.left - (position.x + half.x) - self.clearance).max(0.0);
                info.contact.wall = true;
                return;
            }
        }
    }

    fn check_left(&self, position: Vec3, half: Vec2, info: &mut Resolved) {
        if info.displacement.x >= 0.0 {
            return;
        }
        let moved = position + info.displacement;
        let now = self.map.index_of(corner_position(position, half, Corner::LeftBottom)).col;
        let next = self.map.index_of(corner_position(moved, half, Corner::LeftBottom)).col;
        let (top, bottom) = self.row_span(moved.y, half.y);

        for col in (next..now).rev() {
            if self.first_solid_in_column(col, top, bottom).is_some() {
                let rect = self.map.rect_of(col, top);
                info.displacement.x = (rect.right - (position.x - half.x) + self.clearance).min(0.0);
                info.contact.wall = true;
                return;
            }
        }
    }

    // columns covered by the box's left and right corners
    fn column_span(&self, center_x: f32, half_width: f32) -> (i32, i32) {
        let left = self.map.index_of(Vec3::new(center_x - half_width, 0.0, 0.0)).col;
        (left, self.col_of_right_edge(center_x + half_width))
    }

    // rows covered by the box's top and bottom corners, top row first
    fn row_span(&self, center_y: f32, half_height: f32) -> (i32, i32) {
        let bottom = self.map.index_of(Vec3::new(0.0, center_y - half_height, 0.0)).row;
        (self.row_of_top_edge(center_y + half_height), bottom)
    }

    // `index_of` hands a point on a seam to the cell on its positive side.
    // Right and top edges belong to the cell they close off instead, so an
    // edge flush with a solid cell is outside it.
    fn col_of_right_edge(&self, x: f32) -> i32 {
        let size = self.map.tile_size();
        ((x + size * 0.5) / size).ceil() as i32 - 1
    }

    fn row_of_top_edge(&self, y: f32) -> i32 {
        let size = self.map.tile_size();
        let from_bottom = ((y + size * 0.5) / size).ceil() as i32 - 1;
        self.map.height() as i32 - 1 - from_bottom
    }

    fn first_solid_in_row(&self, row: i32, first_col: i32, last_col: i32) -> Option<i32> {
        (first_col..=last_col).find(|&col| self.map.is_solid(col, row))
    }

    fn first_solid_in_column(&self, col: i32, top_row: i32, bottom_row: i32) -> Option<i32> {
        (top_row..=bottom_row).find(|&row| self.map.is_solid(col, row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::tilemap::TileType;

    const HALF: Vec2 = Vec2::new(0.4, 0.4);
    const EPS: f32 = 1e-5;

    fn open_map(width: usize, height: usize) -> Vec<Vec<TileType>> {
        vec![vec![TileType::Empty; width]; height]
    }

    fn overlaps_solid(map: &TileMap, center: Vec3, half: Vec2) -> bool {
        let min = map.index_of(center - half.extend(0.0));
        let max = map.index_of(center + half.extend(0.0));
        for row in max.row..=min.row {
            for col in min.col..=max.col {
                if !map.is_solid(col, row) {
                    continue;
                }
                let rect = map.rect_of(col, row);
                let inside_x = center.x + half.x > rect.left && center.x - half.x < rect.right;
                let inside_y = center.y + half.y > rect.bottom && center.y - half.y < rect.top;
                if inside_x && inside_y {
                    return true;
                }
            }
        }
        false
    }

    #[test]
    fn landing_scenario_clamps_to_tile_top_plus_clearance() {
        // tile centered at (5, 9) so its top edge sits at y = 9.5
        let mut rows = open_map(10, 12);
        rows[2][5] = TileType::Solid;
        let map = TileMap::from_rows(rows, 1.0).unwrap();
        assert_eq!(map.world_position_of(5, 2), Vec3::new(5.0, 9.0, 0.0));

        let resolver = CollisionResolver::new(&map, DEFAULT_CLEARANCE);
        let position = Vec3::new(5.0, 10.0, 0.0);
        let resolved = resolver.resolve(position, HALF, Vec3::new(0.0, -0.5, 0.0));

        assert!(resolved.contact.landing);
        assert!(!resolved.contact.ceiling);
        assert!(!resolved.contact.wall);
        assert!((resolved.displacement.y - -0.06).abs() < EPS);
        let bottom = position.y + resolved.displacement.y - HALF.y;
        assert!((bottom - (9.5 + DEFAULT_CLEARANCE)).abs() < EPS);
        assert!(resolver.is_supported(position + resolved.displacement, HALF, 0.06));
    }

    #[test]
    fn zero_displacement_is_a_no_op() {
        let mut rows = open_map(6, 6);
        rows[5] = vec![TileType::Solid; 6];
        let map = TileMap::from_rows(rows, 1.0).unwrap();
        let resolver = CollisionResolver::new(&map, DEFAULT_CLEARANCE);
        let resolved = resolver.resolve(Vec3::new(2.0, 0.94, 0.0), HALF, Vec3::ZERO);
        assert_eq!(resolved.displacement, Vec3::ZERO);
        assert_eq!(resolved.contact, MapContact::default());
    }

    #[test]
    fn no_tunneling_through_single_tile_wall() {
        // one-wide wall at column 5 spanning every row
        let mut rows = open_map(12, 6);
        for row in rows.iter_mut() {
            row[5] = TileType::Solid;
        }
        let map = TileMap::from_rows(rows, 1.0).unwrap();
        let resolver = CollisionResolver::new(&map, DEFAULT_CLEARANCE);
        let wall = map.rect_of(5, 0);
        let start = Vec3::new(1.0, 2.0, 0.0);

        for step in 0..80 {
            let speed = 0.05 + step as f32 * 0.1;
            let resolved = resolver.resolve(start, HALF, Vec3::new(speed, 0.0, 0.0));
            let end = start + resolved.displacement;
            assert!(!overlaps_solid(&map, end, HALF), "speed {speed} overlaps the wall");
            assert!(end.x + HALF.x <= wall.left + EPS, "speed {speed} went past the wall");
            if start.x + HALF.x + speed >= wall.left {
                assert!(resolved.contact.wall, "speed {speed} should report the wall");
                assert!((end.x + HALF.x - (wall.left - DEFAULT_CLEARANCE)).abs() < EPS);
            }
        }

        // and back from the other side
        let start = Vec3::new(9.0, 2.0, 0.0);
        let resolved = resolver.resolve(start, HALF, Vec3::new(-6.0, 0.0, 0.0));
        let end = start + resolved.displacement;
        assert!(resolved.contact.wall);
        assert!((end.x - HALF.x - (wall.right + DEFAULT_CLEARANCE)).abs() < EPS);
    }

    #[test]
    fn fast_fall_stops_on_thin_floor() {
        let mut rows = open_map(6, 20);
        rows[15][2] = TileType::Solid;
        let map = TileMap::from_rows(rows, 1.0).unwrap();
        let resolver = CollisionResolver::new(&map, DEFAULT_CLEARANCE);
        let floor = map.rect_of(2, 15);
        let start = Vec3::new(2.0, 15.0, 0.0);

        let resolved = resolver.resolve(start, HALF, Vec3::new(0.0, -12.0, 0.0));
        assert!(resolved.contact.landing);
        let bottom = start.y + resolved.displacement.y - HALF.y;
        assert!((bottom - (floor.top + DEFAULT_CLEARANCE)).abs() < EPS);
    }

    #[test]
    fn ceiling_clamps_rise() {
        let mut rows = open_map(6, 8);
        rows[2][2] = TileType::Solid;
        let map = TileMap::from_rows(rows, 1.0).unwrap();
        let resolver = CollisionResolver::new(&map, DEFAULT_CLEARANCE);
        let ceiling = map.rect_of(2, 2);
        let start = Vec3::new(2.0, 3.9, 0.0);

        let resolved = resolver.resolve(start, HALF, Vec3::new(0.0, 0.5, 0.0));
        assert!(resolved.contact.ceiling);
        let top = start.y + resolved.displacement.y + HALF.y;
        assert!((top - (ceiling.bottom - DEFAULT_CLEARANCE)).abs() < EPS);
    }

    #[test]
    fn cell_already_occupied_does_not_clamp() {
        // the top edge already reaches into row 2; only rows beyond the
        // current one can stop the rise
        let mut rows = open_map(6, 8);
        rows[2][2] = TileType::Solid;
        let map = TileMap::from_rows(rows, 1.0).unwrap();
        let resolver = CollisionResolver::new(&map, DEFAULT_CLEARANCE);
        let start = Vec3::new(2.0, 4.2, 0.0);
        let resolved = resolver.resolve(start, HALF, Vec3::new(0.0, 0.05, 0.0));
        assert!(!resolved.contact.ceiling);
        assert_eq!(resolved.displacement.y, 0.05);
    }

    #[test]
    fn right_edge_flush_with_a_wall_stays_out() {
        // unit box whose right edge sits exactly on the wall's left side
        let mut rows = open_map(10, 5);
        for row in rows.iter_mut() {
            row[5] = TileType::Solid;
        }
        let map = TileMap::from_rows(rows, 1.0).unwrap();
        let half = Vec2::splat(0.5);
        let wall = map.rect_of(5, 2);
        let start = Vec3::new(4.0, 2.0, 0.0);
        assert_eq!(start.x + half.x, wall.left);

        for clearance in [DEFAULT_CLEARANCE, 0.0] {
            let resolver = CollisionResolver::new(&map, clearance);
            let resolved = resolver.resolve(start, half, Vec3::new(0.3, 0.0, 0.0));
            assert!(resolved.contact.wall, "clearance {clearance}");
            assert_eq!(resolved.displacement.x, 0.0);
            assert!(!overlaps_solid(&map, start + resolved.displacement, half));

            // sliding up or down along the wall does not touch it
            let rise = resolver.resolve(start, half, Vec3::new(0.0, 0.3, 0.0));
            assert!(!rise.contact.ceiling);
            assert_eq!(rise.displacement.y, 0.3);
        }
    }

    #[test]
    fn top_edge_flush_with_a_ceiling_stays_out() {
        // solid cell centered at (2, 3), its bottom at y = 2.5
        let mut rows = open_map(5, 5);
        rows[1][2] = TileType::Solid;
        let map = TileMap::from_rows(rows, 1.0).unwrap();
        let half = Vec2::splat(0.5);
        let ceiling = map.rect_of(2, 1);
        let start = Vec3::new(2.0, 2.0, 0.0);
        assert_eq!(start.y + half.y, ceiling.bottom);

        for clearance in [DEFAULT_CLEARANCE, 0.0] {
            let resolver = CollisionResolver::new(&map, clearance);
            let resolved = resolver.resolve(start, half, Vec3::new(0.0, 0.3, 0.0));
            assert!(resolved.contact.ceiling, "clearance {clearance}");
            assert_eq!(resolved.displacement.y, 0.0);
            assert!(!overlaps_solid(&map, start + resolved.displacement, half));

            let walk = resolver.resolve(start, half, Vec3::new(0.3, 0.0, 0.0));
            assert!(!walk.contact.wall);
            assert_eq!(walk.displacement.x, 0.3);
        }
    }

    #[test]
    fn zero_clearance_clamp_holds_on_the_next_tick() {
        let mut rows = open_map(10, 5);
        for row in rows.iter_mut() {
            row[5] = TileType::Solid;
        }
        let map = TileMap::from_rows(rows, 1.0).unwrap();
        let resolver = CollisionResolver::new(&map, 0.0);
        let half = Vec2::splat(0.5);
        let mut position = Vec3::new(3.0, 2.0, 0.0);
        for _ in 0..5 {
            let resolved = resolver.resolve(position, half, Vec3::new(0.75, 0.0, 0.0));
            position += resolved.displacement;
            assert!(!overlaps_solid(&map, position, half));
            assert!(position.x + half.x <= 4.5);
        }
        assert_eq!(position.x + half.x, 4.5);
    }

    #[test]
    fn walking_along_the_floor_is_not_a_wall() {
        let mut rows = open_map(8, 4);
        rows[3] = vec![TileType::Solid; 8];
        let map = TileMap::from_rows(rows, 1.0).unwrap();
        let resolver = CollisionResolver::new(&map, DEFAULT_CLEARANCE);
        let resting = Vec3::new(2.0, 0.5 + DEFAULT_CLEARANCE + HALF.y, 0.0);

        let right = resolver.resolve(resting, HALF, Vec3::new(0.3, 0.0, 0.0));
        assert!(!right.contact.wall);
        assert_eq!(right.displacement.x, 0.3);
        let left = resolver.resolve(resting, HALF, Vec3::new(-0.3, 0.0, 0.0));
        assert!(!left.contact.wall);
        assert_eq!(left.displacement.x, -0.3);
        assert!(resolver.is_supported(resting, HALF, 0.06));
    }

    #[test]
    fn probe_misses_past_a_ledge() {
        let mut rows = open_map(8, 4);
        rows[3][0] = TileType::Solid;
        rows[3][1] = TileType::Solid;
        let map = TileMap::from_rows(rows, 1.0).unwrap();
        let resolver = CollisionResolver::new(&map, DEFAULT_CLEARANCE);
        let y = 0.5 + DEFAULT_CLEARANCE + HALF.y;
        assert!(resolver.is_supported(Vec3::new(1.8, y, 0.0), HALF, 0.06));
        assert!(!resolver.is_supported(Vec3::new(3.0, y, 0.0), HALF, 0.06));
    }

    #[test]
    fn diagonal_into_corner_stays_out() {
        let mut rows = open_map(8, 8);
        rows[7] = vec![TileType::Solid; 8];
        for row in rows.iter_mut() {
            row[6] = TileType::Solid;
        }
        let map = TileMap::from_rows(rows, 1.0).unwrap();
        let resolver = CollisionResolver::new(&map, DEFAULT_CLEARANCE);
        let start = Vec3::new(4.5, 1.5, 0.0);
        let resolved = resolver.resolve(start, HALF, Vec3::new(2.0, -2.0, 0.0));
        let end = start + resolved.displacement;
        assert!(resolved.contact.landing);
        assert!(resolved.contact.wall);
        assert!(!overlaps_solid(&map, end, HALF));
    }

    #[test]
    fn off_map_is_open() {
        let map = TileMap::from_rows(open_map(3, 3), 1.0).unwrap();
        let resolver = CollisionResolver::new(&map, DEFAULT_CLEARANCE);
        let resolved = resolver.resolve(Vec3::new(1.0, 1.0, 0.0), HALF, Vec3::new(-5.0, -5.0, 0.0));
        assert_eq!(resolved.displacement, Vec3::new(-5.0, -5.0, 0.0));
        assert_eq!(resolved.contact, MapContact::default());
    }
}
