use tracing::debug;

use crate::Point;
use crate::goban::Goban;
use crate::handicap;
use crate::stone::Stone;

const CAPTURE_WEIGHT: i32 = 2000;
const SELF_ATARI_PENALTY: i32 = -1500;
const EYE_FILL_PENALTY: i32 = -900;
const PRESSURE_BONUS: i32 = 120;
const OWN_CONTACT_BONUS: i32 = 24;
const OPP_CONTACT_BONUS: i32 = 10;
const CENTER_WEIGHT: i32 = 4;
const DISTANCE_PENALTY: i32 = 12;
/// Upper bound of the random tie-break term; smaller than every weight above.
const TIE_BREAK_MAX: i32 = 2;
/// Below this the best candidate is dominated and passing is preferred.
const PASS_FLOOR: i32 = -1000;

/// Board is "nearly empty" up to this many stones; the opening set is seeded.
const NEARLY_EMPTY: usize = 2;
/// Widen to the whole board when fewer legal candidates than this survive.
const MIN_CANDIDATES: usize = 6;
const NEIGHBORHOOD_RADIUS: i16 = 2;

struct Candidate {
    point: Point,
    after: Goban,
    captured: usize,
}

/// Pick a move for `stone` with a one-ply greedy heuristic, or `None` to
/// pass. Every returned point has been validated by the real move applier.
/// Fully deterministic for a given board and rng state.
pub fn choose_move(goban: &Goban, stone: Stone, rng: &mut fastrand::Rng) -> Option<Point> {
    let mut candidates = legal_candidates(goban, stone, focused_points(goban));
    if candidates.len() < MIN_CANDIDATES {
        candidates = legal_candidates(goban, stone, all_empty_points(goban));
    }
    if candidates.is_empty() {
        debug!(%stone, "no legal candidate moves");
        return None;
    }

    // 1) Capture when possible; largest capture wins, first found on ties.
    let mut best_capture: Option<&Candidate> = None;
    for c in &candidates {
        if c.captured > 0 && best_capture.is_none_or(|b| c.captured > b.captured) {
            best_capture = Some(c);
        }
    }
    if let Some(c) = best_capture {
        debug!(%stone, point = ?c.point, captured = c.captured, "capturing move");
        return Some(c.point);
    }

    // 2) Rescue an own group in atari before anything else.
    if let Some(group) = goban.groups_in_atari(stone).into_iter().next() {
        for c in &candidates {
            if group.liberties.contains(&c.point) {
                debug!(%stone, point = ?c.point, "rescuing group in atari");
                return Some(c.point);
            }
        }
    }

    // 3) Greedy arg-max over the weighted heuristic.
    let mut best: Option<Point> = None;
    let mut best_score = i32::MIN;
    for c in &candidates {
        let score = score_candidate(goban, c, stone) + rng.i32(0..=TIE_BREAK_MAX);
        if score > best_score {
            best_score = score;
            best = Some(c.point);
        }
    }

    if best_score < PASS_FLOOR {
        debug!(%stone, best_score, "every candidate is dominated, passing");
        return None;
    }
    debug!(%stone, point = ?best, best_score, "heuristic move");
    best
}

/// Deterministic heuristic value of a candidate, before the tie-break term.
fn score_candidate(goban: &Goban, cand: &Candidate, stone: Stone) -> i32 {
    let mut score = cand.captured as i32 * CAPTURE_WEIGHT;

    // Self-atari unless the move captures.
    if cand.captured == 0 && cand.after.liberties(cand.point).len() == 1 {
        score += SELF_ATARI_PENALTY;
    }

    // Naive eye fill: all four neighbors already own color.
    let neighbors = goban.neighbors(cand.point);
    if neighbors.len() == 4 && neighbors.iter().all(|&n| goban.stone_at(n) == Some(stone)) {
        score += EYE_FILL_PENALTY;
    }

    // Stay close to the action.
    if let Some(d) = nearest_stone_distance(goban, cand.point) {
        score -= d * DISTANCE_PENALTY;
    }

    // Mild pull toward the center.
    let size = goban.size() as i32;
    let mid = (size - 1) / 2;
    let center_dist = (cand.point.0 as i32 - mid).abs() + (cand.point.1 as i32 - mid).abs();
    score += (size - center_dist) * CENTER_WEIGHT;

    // Contact: connecting to own stones beats touching the opponent's.
    for &n in &neighbors {
        match goban.stone_at(n) {
            Some(s) if s == stone => score += OWN_CONTACT_BONUS,
            Some(_) => score += OPP_CONTACT_BONUS,
            None => {}
        }
    }

    // Pressure: opponent groups left at two liberties are one move from atari.
    for chain in cand.after.opponent_neighbor_chains(cand.point) {
        if cand.after.chain_liberties(&chain).len() == 2 {
            score += PRESSURE_BONUS;
        }
    }

    score
}

/// Manhattan distance to the closest stone of either color, if any.
fn nearest_stone_distance(goban: &Goban, (col, row): Point) -> Option<i32> {
    let mut best: Option<i32> = None;
    for y in 0..goban.size() {
        for x in 0..goban.size() {
            if goban.stone_at((x, y)).is_none() {
                continue;
            }
            let d = (x as i32 - col as i32).abs() + (y as i32 - row as i32).abs();
            if best.is_none_or(|b| d < b) {
                best = Some(d);
            }
        }
    }
    best
}

/// Empty points within radius 2 of any stone, plus the opening set while the
/// board is nearly empty. Row-major order, so selection is deterministic.
fn focused_points(goban: &Goban) -> Vec<Point> {
    let size = goban.size();
    let mut marked = vec![false; size as usize * size as usize];

    for row in 0..size {
        for col in 0..size {
            if goban.stone_at((col, row)).is_none() {
                continue;
            }
            for dy in -NEIGHBORHOOD_RADIUS..=NEIGHBORHOOD_RADIUS {
                for dx in -NEIGHBORHOOD_RADIUS..=NEIGHBORHOOD_RADIUS {
                    let x = col as i16 + dx;
                    let y = row as i16 + dy;
                    if x < 0 || y < 0 || x >= size as i16 || y >= size as i16 {
                        continue;
                    }
                    let p = (x as u8, y as u8);
                    if goban.stone_at(p).is_none() {
                        marked[y as usize * size as usize + x as usize] = true;
                    }
                }
            }
        }
    }

    if goban.stones_placed() <= NEARLY_EMPTY {
        for p in handicap::opening_points(size) {
            if goban.stone_at(p).is_none() {
                marked[p.1 as usize * size as usize + p.0 as usize] = true;
            }
        }
    }

    let mut points = Vec::new();
    for row in 0..size {
        for col in 0..size {
            if marked[row as usize * size as usize + col as usize] {
                points.push((col, row));
            }
        }
    }
    points
}

fn all_empty_points(goban: &Goban) -> Vec<Point> {
    let size = goban.size();
    let mut points = Vec::new();
    for row in 0..size {
        for col in 0..size {
            if goban.stone_at((col, row)).is_none() {
                points.push((col, row));
            }
        }
    }
    points
}

/// Filter candidate points through the real applier, keeping the result
/// board and capture count for the scorer.
fn legal_candidates(goban: &Goban, stone: Stone, points: Vec<Point>) -> Vec<Candidate> {
    points
        .into_iter()
        .filter_map(|point| {
            goban
                .play(point, stone)
                .ok()
                .map(|(after, captured)| Candidate {
                    point,
                    after,
                    captured: captured.len(),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn rng() -> fastrand::Rng {
        fastrand::Rng::with_seed(7)
    }

    #[test]
    fn empty_board_move_is_legal() {
        let goban = Goban::new(9);
        let pt = choose_move(&goban, Stone::Black, &mut rng()).expect("should play");
        assert!(goban.is_legal(pt, Stone::Black));
    }

    #[test]
    fn response_to_opening_move_is_legal() {
        let goban = Goban::new(9);
        let (goban, _) = goban.play((4, 4), Stone::Black).unwrap();
        let pt = choose_move(&goban, Stone::White, &mut rng()).expect("should play");
        assert!(goban.is_legal(pt, Stone::White));
    }

    #[test]
    fn takes_available_capture() {
        // Black (0,0) is in atari; White captures at (0,1).
        let goban = goban_from_layout(&["BW+++", "+++++", "+++++", "++B++", "+++++"]);
        let pt = choose_move(&goban, Stone::White, &mut rng());
        assert_eq!(pt, Some((0, 1)));
    }

    #[test]
    fn prefers_larger_capture() {
        // Two black groups in atari: one stone at (0,0), two at (3,0)-(4,0).
        let goban = goban_from_layout(&["BWWBB", "++++W", "+++++", "+++++", "+++++"]);
        let pt = choose_move(&goban, Stone::White, &mut rng());
        assert_eq!(pt, Some((3, 1)));
    }

    #[test]
    fn rescues_own_atari_group() {
        // White (0,0) has one liberty at (0,1); no capture is available.
        let goban = goban_from_layout(&["WB+++", "+++++", "++B++", "+++++", "+++++"]);
        let pt = choose_move(&goban, Stone::White, &mut rng());
        assert_eq!(pt, Some((0, 1)));
    }

    #[test]
    fn passes_when_no_legal_move() {
        // Both empty points are eyes of a live black group: suicide for White.
        let goban = goban_from_layout(&["B+B", "BBB", "B+B"]);
        assert_eq!(choose_move(&goban, Stone::White, &mut rng()), None);
    }

    #[test]
    fn passes_when_every_move_is_hopeless() {
        // The only legal white moves are self-atari crawls in the corner.
        let goban = goban_from_layout(&["++BB", "BBBB", "BBBB", "BBB+"]);
        assert_eq!(choose_move(&goban, Stone::White, &mut rng()), None);
    }

    #[test]
    fn deterministic_for_a_fixed_seed() {
        let goban = goban_from_layout(&[
            "+++++++++",
            "++B+W++++",
            "+++BW++++",
            "+++BW++++",
            "+++++++++",
            "++W+B++++",
            "+++++++++",
            "+++++++++",
            "+++++++++",
        ]);
        let a = choose_move(&goban, Stone::Black, &mut fastrand::Rng::with_seed(42));
        let b = choose_move(&goban, Stone::Black, &mut fastrand::Rng::with_seed(42));
        assert_eq!(a, b);
        assert!(a.is_some());
    }

    #[test]
    fn never_proposes_occupied_point() {
        let goban = goban_from_layout(&[
            "BWBW+++++",
            "WBWB+++++",
            "+++++++++",
            "+++++++++",
            "+++++++++",
            "+++++++++",
            "+++++++++",
            "+++++++++",
            "+++++++++",
        ]);
        for seed in 0..20 {
            let mut r = fastrand::Rng::with_seed(seed);
            if let Some(pt) = choose_move(&goban, Stone::White, &mut r) {
                assert!(goban.stone_at(pt).is_none());
                assert!(goban.is_legal(pt, Stone::White));
            }
        }
    }
}
