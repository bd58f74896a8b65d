//! Collision detection on the cell grid
//!
//! Bullets are single cells; everything else is an axis-aligned box
//! anchored at its top-left corner.

use super::entity::Entity;
use crate::consts::*;

/// Fixed horizontal/vertical extent of a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitBox {
    pub width: i32,
    pub height: i32,
}

impl HitBox {
    pub const ALIEN: HitBox = HitBox {
        width: ALIEN_WIDTH,
        height: ALIEN_HEIGHT,
    };
    pub const UFO: HitBox = HitBox {
        width: UFO_WIDTH,
        height: UFO_HEIGHT,
    };
    pub const PLAYER: HitBox = HitBox {
        width: PLAYER_WIDTH,
        height: PLAYER_HEIGHT,
    };
    pub const TRANSFORM: HitBox = HitBox {
        width: TRANSFORM_WIDTH,
        height: TRANSFORM_HEIGHT,
    };

    /// Hit box for an entity kind, if it can be struck
    pub fn of(entity: &Entity) -> Option<HitBox> {
        match entity {
            Entity::Alien(_) | Entity::Commander(_) | Entity::DiveBomber(_) => Some(Self::ALIEN),
            Entity::Ufo(_) => Some(Self::UFO),
            Entity::Transform(_) => Some(Self::TRANSFORM),
            Entity::Bullet(_) | Entity::Barrier(_) => None,
        }
    }
}

/// Does the cell (px, py) fall inside the box anchored at (x, y)?
#[inline]
pub fn point_in_box(px: i32, py: i32, x: i32, y: i32, hit_box: HitBox) -> bool {
    px >= x && px < x + hit_box.width && py >= y && py < y + hit_box.height
}

/// Do two boxes overlap?
#[inline]
pub fn boxes_overlap(ax: i32, ay: i32, a: HitBox, bx: i32, by: i32, b: HitBox) -> bool {
    ax < bx + b.width && bx < ax + a.width && ay < by + b.height && by < ay + a.height
}

/// Is the cell outside the playfield vertically?
#[inline]
pub fn off_playfield(y: i32) -> bool {
    !(0..PLAYFIELD_HEIGHT).contains(&y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_in_box_edges() {
        let hb = HitBox::ALIEN;
        assert!(point_in_box(10, 5, 10, 5, hb));
        assert!(point_in_box(10 + hb.width - 1, 5 + hb.height - 1, 10, 5, hb));
        assert!(!point_in_box(10 + hb.width, 5, 10, 5, hb));
        assert!(!point_in_box(9, 5, 10, 5, hb));
        assert!(!point_in_box(10, 5 + hb.height, 10, 5, hb));
    }

    #[test]
    fn test_boxes_overlap() {
        let hb = HitBox::PLAYER;
        assert!(boxes_overlap(0, 0, hb, hb.width - 1, 0, hb));
        assert!(!boxes_overlap(0, 0, hb, hb.width, 0, hb));
        assert!(!boxes_overlap(0, 0, hb, 0, hb.height, hb));
    }

    #[test]
    fn test_off_playfield() {
        assert!(off_playfield(-1));
        assert!(off_playfield(PLAYFIELD_HEIGHT));
        assert!(!off_playfield(0));
        assert!(!off_playfield(PLAYFIELD_HEIGHT - 1));
    }
}
