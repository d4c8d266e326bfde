use crate::input::{HeldKeys, Key};
use crate::player::Player;
use crate::world::GridMap;

/// Advance the player by one tick.
///
/// Forward and backward are summed into one candidate position which is
/// accepted only if it lands in an open cell. There is no per-axis sliding:
/// a diagonal step into a corner is dropped whole. Turning is applied
/// regardless of whether the move was accepted.
pub fn step(player: &mut Player, keys: &HeldKeys, grid: &GridMap) {
    let [dx, dy] = player.direction();
    let [mut nx, mut ny] = player.pos;

    if keys.is_held(Key::Forward) {
        nx += dx * player.move_speed;
        ny += dy * player.move_speed;
    }
    if keys.is_held(Key::Backward) {
        nx -= dx * player.move_speed;
        ny -= dy * player.move_speed;
    }

    if [nx, ny] != player.pos {
        if grid.is_blocked(nx, ny) {
            log::trace!("move to ({nx:.1}, {ny:.1}) blocked");
        } else {
            player.pos = [nx, ny];
        }
    }

    if keys.is_held(Key::TurnLeft) {
        player.angle -= player.turn_speed;
    }
    if keys.is_held(Key::TurnRight) {
        player.angle += player.turn_speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn corridor() -> GridMap {
        GridMap::bordered(8, 5, 64.0)
    }

    #[test]
    fn forward_into_open_cell_applies_candidate() {
        let grid = corridor();
        let mut p = Player::at_tile_center(2, 2, 64.0, 0.3);
        let start = p.pos;
        let keys: HeldKeys = [Key::Forward].into_iter().collect();

        step(&mut p, &keys, &grid);

        let expected = [
            start[0] + 0.3f32.cos() * p.move_speed,
            start[1] + 0.3f32.sin() * p.move_speed,
        ];
        assert_eq!(p.pos, expected);
        assert_eq!(p.angle, 0.3);
    }

    #[test]
    fn backward_subtracts_direction() {
        let grid = corridor();
        let mut p = Player::at_tile_center(3, 2, 64.0, 0.0);
        let keys: HeldKeys = [Key::Backward].into_iter().collect();

        step(&mut p, &keys, &grid);

        assert_eq!(p.pos, [224.0 - 2.0, 160.0]);
    }

    #[test]
    fn move_into_wall_keeps_position_but_still_turns() {
        let grid = corridor();
        // one unit short of the west border wall, facing it
        let mut p = Player {
            pos: [65.0, 160.0],
            angle: std::f32::consts::PI,
            move_speed: 2.0,
            turn_speed: 0.05,
        };
        let keys: HeldKeys = [Key::Forward, Key::TurnRight].into_iter().collect();

        step(&mut p, &keys, &grid);

        assert_eq!(p.pos, [65.0, 160.0]);
        assert_eq!(p.angle, std::f32::consts::PI + 0.05);
    }

    #[test]
    fn diagonal_into_corner_does_not_slide() {
        let grid = corridor();
        // near the north-west corner heading up-left: x alone would stay open
        // but the combined step crosses into the border row
        let mut p = Player {
            pos: [70.0, 65.0],
            angle: -FRAC_PI_2 - 0.5,
            move_speed: 2.0,
            turn_speed: 0.05,
        };
        let keys: HeldKeys = [Key::Forward].into_iter().collect();

        step(&mut p, &keys, &grid);

        assert_eq!(p.pos, [70.0, 65.0]);
    }

    #[test]
    fn turn_left_without_moving() {
        let grid = corridor();
        let mut p = Player::at_tile_center(2, 2, 64.0, 1.0);
        let start = p.pos;
        let keys: HeldKeys = [Key::TurnLeft].into_iter().collect();

        step(&mut p, &keys, &grid);

        assert_eq!(p.pos, start);
        assert_eq!(p.angle, 1.0 - 0.05);
    }

    #[test]
    fn no_keys_is_a_no_op() {
        let grid = corridor();
        let mut p = Player::at_tile_center(2, 2, 64.0, 1.0);
        let before = p.clone();

        step(&mut p, &HeldKeys::default(), &grid);

        assert_eq!(p, before);
    }
}
