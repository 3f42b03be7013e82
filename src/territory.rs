use std::collections::HashSet;

use serde::Serialize;

use crate::Point;
use crate::goban::Goban;
use crate::stone::Stone;

/// Compute territory ownership for each point on the board.
///
/// Returns a flat array (same layout as `goban.board()`) where:
/// - `1` = Black territory
/// - `-1` = White territory
/// - `0` = neutral / dame
///
/// Dead-marked stones are removed from a working copy first, so their points
/// join the surrounding empty region. An empty region belongs to a color only
/// when that color is the sole one bordering it. The live board is never
/// touched and nothing is cached between calls.
pub fn estimate_territory(goban: &Goban, dead_stones: &HashSet<Point>) -> Vec<i8> {
    let size = goban.size();
    let len = size as usize * size as usize;

    // Working copy with dead stones removed
    let mut working = goban.board().to_vec();
    for &(col, row) in dead_stones {
        let idx = row as usize * size as usize + col as usize;
        if idx < len {
            working[idx] = 0;
        }
    }

    let mut ownership = vec![0i8; len];
    let mut visited = vec![false; len];

    for y in 0..size {
        for x in 0..size {
            let idx = y as usize * size as usize + x as usize;
            if visited[idx] || working[idx] != 0 {
                continue;
            }

            // Flood-fill this empty region
            let mut region = Vec::new();
            let mut border_colors: u8 = 0; // bit 0 = Black seen, bit 1 = White seen
            let mut stack = vec![(x, y)];

            while let Some(p) = stack.pop() {
                let pi = p.1 as usize * size as usize + p.0 as usize;
                if visited[pi] {
                    continue;
                }
                visited[pi] = true;
                region.push(pi);

                for n in goban.neighbors(p) {
                    let ni = n.1 as usize * size as usize + n.0 as usize;
                    if visited[ni] {
                        continue;
                    }
                    if working[ni] != 0 {
                        match working[ni].signum() {
                            1 => border_colors |= 1,
                            -1 => border_colors |= 2,
                            _ => {}
                        }
                    } else {
                        stack.push(n);
                    }
                }
            }

            let owner = match border_colors {
                1 => 1i8,
                2 => -1i8,
                _ => 0i8, // both colors or none
            };

            for &pi in &region {
                ownership[pi] = owner;
            }
        }
    }

    ownership
}

/// Per-color score breakdown: territory (empty points) and prisoners
/// (captures during play plus opponent stones marked dead).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlayerPoints {
    pub territory: u32,
    pub prisoners: u32,
}

impl PlayerPoints {
    pub fn total(&self) -> u32 {
        self.territory + self.prisoners
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Black,
    White,
    Draw,
}

/// Full score breakdown for both players.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GameScore {
    pub black: PlayerPoints,
    pub white: PlayerPoints,
    pub komi: f64,
}

impl GameScore {
    pub fn black_total(&self) -> f64 {
        self.black.total() as f64
    }

    pub fn white_total(&self) -> f64 {
        self.white.total() as f64 + self.komi
    }

    pub fn winner(&self) -> Winner {
        let diff = self.black_total() - self.white_total();
        if diff > 0.0 {
            Winner::Black
        } else if diff < 0.0 {
            Winner::White
        } else {
            Winner::Draw
        }
    }

    pub fn result(&self) -> String {
        format_result(self.black_total(), self.white_total())
    }
}

/// Calculate final scores with full breakdown.
///
/// Japanese-style scoring:
/// score = territory + prisoners (including dead opponent stones) + komi
/// (White only).
pub fn score(
    goban: &Goban,
    ownership: &[i8],
    dead_stones: &HashSet<Point>,
    komi: f64,
) -> GameScore {
    let mut black_territory: u32 = 0;
    let mut white_territory: u32 = 0;

    for &o in ownership {
        match o {
            1 => black_territory += 1,
            -1 => white_territory += 1,
            _ => {}
        }
    }

    let mut dead_black: u32 = 0;
    let mut dead_white: u32 = 0;

    for &pt in dead_stones {
        match goban.stone_at(pt) {
            Some(Stone::Black) => dead_black += 1,
            Some(Stone::White) => dead_white += 1,
            None => {}
        }
    }

    GameScore {
        black: PlayerPoints {
            territory: black_territory,
            prisoners: goban.captures().get(Stone::Black) + dead_white,
        },
        white: PlayerPoints {
            territory: white_territory,
            prisoners: goban.captures().get(Stone::White) + dead_black,
        },
        komi,
    }
}

/// Format the game result string from final scores.
///
/// Returns "B+{diff}", "W+{diff}", or "Draw".
pub fn format_result(black_score: f64, white_score: f64) -> String {
    let diff = black_score - white_score;
    if diff > 0.0 {
        format!("B+{}", diff)
    } else if diff < 0.0 {
        format!("W+{}", -diff)
    } else {
        "Draw".to_string()
    }
}

#[cfg(test)]
#[allow(clippy::erasing_op, clippy::identity_op)]
mod tests {
    use super::*;

    /// Build a goban from an ASCII layout. 'B' = Black, 'W' = White, '+' = Empty.
    fn goban_from_layout(layout: &[&str]) -> Goban {
        let board: Vec<Vec<i8>> = layout
            .iter()
            .map(|row| {
                row.chars()
                    .map(|c| match c {
                        'B' => Stone::Black.to_int(),
                        'W' => Stone::White.to_int(),
                        _ => 0,
                    })
                    .collect()
            })
            .collect();
        Goban::from_matrix(board)
    }

    // -- Territory estimation --

    #[test]
    fn empty_board_all_neutral() {
        let goban = Goban::new(4);
        let ownership = estimate_territory(&goban, &HashSet::new());
        assert!(ownership.iter().all(|&o| o == 0));
    }

    #[test]
    fn corner_territory_black() {
        let goban = goban_from_layout(&["++B+", "++B+", "BBB+", "++++"]);
        let ownership = estimate_territory(&goban, &HashSet::new());
        assert_eq!(ownership[0], 1); // (0,0)
        assert_eq!(ownership[1], 1); // (1,0)
        assert_eq!(ownership[4], 1); // (0,1)
        assert_eq!(ownership[5], 1); // (1,1)
    }

    #[test]
    fn split_board_both_territories() {
        let goban = goban_from_layout(&["+B+W+", "+B+W+", "+B+W+", "+B+W+", "+B+W+"]);
        let ownership = estimate_territory(&goban, &HashSet::new());
        let size = 5;
        for row in 0..5 {
            assert_eq!(ownership[row * size + 0], 1);
            assert_eq!(ownership[row * size + 2], 0); // borders both colors
            assert_eq!(ownership[row * size + 4], -1);
        }
    }

    #[test]
    fn dame_between_territories() {
        let goban = goban_from_layout(&["B+W", "B+W", "B+W"]);
        let ownership = estimate_territory(&goban, &HashSet::new());
        let size = 3;
        assert_eq!(ownership[0 * size + 1], 0);
        assert_eq!(ownership[1 * size + 1], 0);
        assert_eq!(ownership[2 * size + 1], 0);
    }

    #[test]
    fn every_empty_cell_has_exactly_one_owner() {
        let goban = goban_from_layout(&["+B+W+", "BB+WW", "+++++", "BBWW+", "+B+W+"]);
        let ownership = estimate_territory(&goban, &HashSet::new());
        let mut black = 0u32;
        let mut white = 0u32;
        let mut neutral = 0u32;
        let mut empty_cells = 0u32;
        for (i, &v) in goban.board().iter().enumerate() {
            if v == 0 {
                empty_cells += 1;
                match ownership[i] {
                    1 => black += 1,
                    -1 => white += 1,
                    _ => neutral += 1,
                }
            }
        }
        assert_eq!(black + white + neutral, empty_cells);
    }

    #[test]
    fn dead_stone_positions_join_surrounding_territory() {
        let goban = goban_from_layout(&["BBB", "BWB", "BBB"]);
        let mut dead = HashSet::new();
        dead.insert((1u8, 1u8));

        let ownership = estimate_territory(&goban, &dead);
        assert_eq!(ownership[1 * 3 + 1], 1);
    }

    #[test]
    fn live_stone_has_no_territory_ownership() {
        let goban = goban_from_layout(&["BBB", "BWB", "BBB"]);
        let ownership = estimate_territory(&goban, &HashSet::new());
        assert_eq!(ownership[1 * 3 + 1], 0);
    }

    #[test]
    fn estimation_is_idempotent() {
        let goban = goban_from_layout(&["+B+W+", "+B+W+", "+B+W+", "+B+W+", "+B+W+"]);
        let mut dead = HashSet::new();
        dead.insert((1u8, 0u8));
        let a = estimate_territory(&goban, &dead);
        let b = estimate_territory(&goban, &dead);
        assert_eq!(a, b);
    }

    // -- Scoring --

    #[test]
    fn empty_board_score_is_komi_only() {
        let goban = Goban::new(9);
        let ownership = estimate_territory(&goban, &HashSet::new());
        let s = score(&goban, &ownership, &HashSet::new(), 6.5);
        assert_eq!(s.black.total(), 0);
        assert_eq!(s.white.total(), 0);
        assert_eq!(s.white_total(), 6.5);
        assert_eq!(s.winner(), Winner::White);
        assert_eq!(s.result(), "W+6.5");
    }

    #[test]
    fn territory_counted_per_color() {
        let goban = goban_from_layout(&["+B+W+", "+B+W+", "+B+W+", "+B+W+", "+B+W+"]);
        let ownership = estimate_territory(&goban, &HashSet::new());
        let s = score(&goban, &ownership, &HashSet::new(), 0.5);
        assert_eq!(s.black.territory, 5);
        assert_eq!(s.white.territory, 5);
        assert_eq!(s.winner(), Winner::White); // komi decides
    }

    #[test]
    fn dead_stones_become_opponent_prisoners() {
        let goban = goban_from_layout(&["BBB", "BWB", "BBB"]);
        let mut dead = HashSet::new();
        dead.insert((1u8, 1u8));
        let ownership = estimate_territory(&goban, &dead);
        let s = score(&goban, &ownership, &dead, 0.0);

        assert_eq!(s.black.prisoners, 1);
        assert_eq!(s.white.prisoners, 0);
        // freed point becomes black territory
        assert_eq!(s.black.territory, 1);
        // the live board is untouched
        assert_eq!(goban.stone_at((1, 1)), Some(Stone::White));
    }

    #[test]
    fn score_includes_play_captures() {
        let goban = goban_from_layout(&["+B++", "BWB+", "++++", "++++"]);
        let (goban, _) = goban.play((1, 2), Stone::Black).unwrap();
        let ownership = estimate_territory(&goban, &HashSet::new());
        let s = score(&goban, &ownership, &HashSet::new(), 0.0);
        assert_eq!(s.black.prisoners, 1);
    }

    #[test]
    fn draw_is_representable() {
        let s = GameScore {
            black: PlayerPoints {
                territory: 5,
                prisoners: 0,
            },
            white: PlayerPoints {
                territory: 5,
                prisoners: 0,
            },
            komi: 0.0,
        };
        assert_eq!(s.winner(), Winner::Draw);
        assert_eq!(s.result(), "Draw");
    }

    #[test]
    fn format_results() {
        assert_eq!(format_result(10.0, 6.5), "B+3.5");
        assert_eq!(format_result(4.0, 6.5), "W+2.5");
        assert_eq!(format_result(7.0, 7.0), "Draw");
    }
}
