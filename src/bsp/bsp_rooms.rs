// src/bsp/bsp_rooms.rs

use crate::map::Room;
use crate::utils::{DungeonRng, RectI};
use log::{debug, warn};

/// Carves one room rectangle out of each partition leaf.
#[derive(Debug, Clone)]
pub struct RoomPlacer {
    pub room_count: usize,
    pub min_room_size: i32,
    pub max_room_size: i32,
    pub boss_min_room_size: i32,
    pub boss_max_room_size: i32,
    pub margin: i32,
}

/// Rooms in placement order (index 0 is the start room) plus the boss index.
#[derive(Debug, Clone)]
pub struct RoomPlacement {
    pub rooms: Vec<Room>,
    pub boss_room: Option<usize>,
    /// Leaves that could not host a room.
    pub skipped_leaves: usize,
}

/// Random room inside `leaf` shrunk by `margin`, or `None` when the usable area
/// is smaller than `min` on either axis.
pub fn fit_room(leaf: RectI, min: i32, max: i32, margin: i32, rng: &mut DungeonRng) -> Option<RectI> {
    let usable_w = leaf.width - 2 * margin;
    let usable_h = leaf.height - 2 * margin;
    if usable_w < min || usable_h < min {
        return None;
    }

    let w = rng.range_inclusive(min, usable_w.min(max));
    let h = rng.range_inclusive(min, usable_h.min(max));
    let x = leaf.x + margin + rng.range_inclusive(0, usable_w - w);
    let y = leaf.y + margin + rng.range_inclusive(0, usable_h - h);
    Some(RectI::new(x, y, w, h))
}

impl RoomPlacer {
    /// Places rooms in the `room_count` largest leaves, largest first.
    ///
    /// The boss leaf is drawn from the non-first leaves before placement so it
    /// can use the boss size range. If that leaf ends up without a room, or its
    /// room lands at index 0, the largest other room becomes the boss room.
    pub fn place(&self, leaves: &[RectI], rng: &mut DungeonRng) -> RoomPlacement {
        let mut ordered = leaves.to_vec();
        ordered.sort_by(|a, b| b.area().cmp(&a.area()));
        ordered.truncate(self.room_count);

        let boss_ordinal = if ordered.len() >= 2 {
            Some(rng.range(1, ordered.len() as i32) as usize)
        } else {
            None
        };

        let mut rooms: Vec<Room> = Vec::with_capacity(ordered.len());
        let mut boss_room = None;
        let mut skipped_leaves = 0;

        for (ordinal, leaf) in ordered.iter().enumerate() {
            let rect = if Some(ordinal) == boss_ordinal {
                fit_room(*leaf, self.boss_min_room_size, self.boss_max_room_size, self.margin, rng).or_else(|| {
                    debug!("Leaf {:?} too small for a boss room, using normal size", leaf);
                    fit_room(*leaf, self.min_room_size, self.max_room_size, self.margin, rng)
                })
            } else {
                fit_room(*leaf, self.min_room_size, self.max_room_size, self.margin, rng)
            };

            match rect {
                Some(rect) => {
                    if Some(ordinal) == boss_ordinal {
                        boss_room = Some(rooms.len());
                    }
                    rooms.push(Room::new(rooms.len(), rect, *leaf));
                }
                None => {
                    warn!("Leaf {:?} cannot host a room; skipped", leaf);
                    skipped_leaves += 1;
                }
            }
        }

        if rooms.len() < 2 {
            boss_room = None;
        } else if matches!(boss_room, None | Some(0)) {
            let fallback = largest_non_start(&rooms);
            warn!("Boss leaf lost its room; boss reassigned to room {:?}", fallback);
            boss_room = fallback;
        }

        RoomPlacement {
            rooms,
            boss_room,
            skipped_leaves,
        }
    }
}

fn largest_non_start(rooms: &[Room]) -> Option<usize> {
    let mut best: Option<&Room> = None;
    for room in rooms.iter().skip(1) {
        if best.map_or(true, |b| room.rect.area() > b.rect.area()) {
            best = Some(room);
        }
    }
    best.map(|r| r.index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placer(room_count: usize) -> RoomPlacer {
        RoomPlacer {
            room_count,
            min_room_size: 6,
            max_room_size: 12,
            boss_min_room_size: 14,
            boss_max_room_size: 20,
            margin: 2,
        }
    }

    #[test]
    fn test_fit_room_inside_margin() {
        let mut rng = DungeonRng::from_seed(4);
        let leaf = RectI::new(10, -20, 30, 18);
        for _ in 0..100 {
            let r = fit_room(leaf, 6, 12, 2, &mut rng).unwrap();
            assert!(leaf.inset(2).contains_rect(&r));
            assert!(r.width >= 6 && r.width <= 12);
            assert!(r.height >= 6 && r.height <= 12);
        }
        assert!(fit_room(RectI::new(0, 0, 9, 30), 6, 12, 2, &mut rng).is_none());
    }

    #[test]
    fn test_boss_room_is_not_start() {
        let leaves = vec![
            RectI::new(0, 0, 40, 40),
            RectI::new(40, 0, 30, 40),
            RectI::new(0, 40, 70, 30),
            RectI::new(70, 0, 30, 70),
        ];
        for seed in 0..20 {
            let mut rng = DungeonRng::from_seed(seed);
            let placed = placer(8).place(&leaves, &mut rng);
            assert_eq!(placed.rooms.len(), 4);
            let boss = placed.boss_room.unwrap();
            assert!(boss >= 1 && boss < 4);
            for (i, room) in placed.rooms.iter().enumerate() {
                assert_eq!(room.index, i);
                assert!(room.leaf.inset(2).contains_rect(&room.rect));
            }
        }
    }

    #[test]
    fn test_largest_leaves_first_and_truncated() {
        let leaves = vec![
            RectI::new(0, 0, 20, 20),
            RectI::new(20, 0, 40, 40),
            RectI::new(60, 0, 30, 30),
        ];
        let mut rng = DungeonRng::from_seed(8);
        let placed = placer(2).place(&leaves, &mut rng);
        assert_eq!(placed.rooms.len(), 2);
        assert_eq!(placed.rooms[0].leaf, RectI::new(20, 0, 40, 40));
        assert_eq!(placed.rooms[1].leaf, RectI::new(60, 0, 30, 30));
    }

    #[test]
    fn test_small_leaf_is_skipped_and_boss_reassigned() {
        // Only the first leaf fits anything; the second one is too thin.
        let leaves = vec![RectI::new(0, 0, 40, 40), RectI::new(40, 0, 8, 30)];
        let mut rng = DungeonRng::from_seed(2);
        let placed = placer(8).place(&leaves, &mut rng);
        assert_eq!(placed.rooms.len(), 1);
        assert_eq!(placed.skipped_leaves, 1);
        assert_eq!(placed.boss_room, None);

        let leaves = vec![
            RectI::new(0, 0, 40, 40),
            RectI::new(40, 0, 9, 40),
            RectI::new(0, 40, 16, 16),
        ];
        for seed in 0..10 {
            let mut rng = DungeonRng::from_seed(seed);
            let placed = placer(8).place(&leaves, &mut rng);
            assert_eq!(placed.rooms.len(), 2);
            assert_eq!(placed.boss_room, Some(1));
        }
    }
}
