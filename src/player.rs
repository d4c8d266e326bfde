#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub pos: [f32; 2],   // (x, y) position in world space
    pub angle: f32,      // radians, 0 faces +X, grows toward +Y
    pub move_speed: f32, // world units per tick
    pub turn_speed: f32, // radians per tick
}

impl Player {
    /// Spawn at the centre of a grid tile.
    pub fn at_tile_center(tx: usize, ty: usize, tile_size: f32, angle: f32) -> Self {
        Self {
            pos: [
                (tx as f32 + 0.5) * tile_size,
                (ty as f32 + 0.5) * tile_size,
            ],
            angle,
            move_speed: 2.0,
            turn_speed: 0.05,
        }
    }

    /// Unit vector along the facing angle.
    #[inline]
    pub fn direction(&self) -> [f32; 2] {
        [self.angle.cos(), self.angle.sin()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_center_spawn() {
        let p = Player::at_tile_center(1, 3, 64.0, 0.0);
        assert_eq!(p.pos, [96.0, 224.0]);
        assert_eq!(p.direction(), [1.0, 0.0]);
    }
}
