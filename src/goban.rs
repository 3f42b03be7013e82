use arrayvec::ArrayVec;

use crate::Point;
use crate::error::GoError;
use crate::stone::Stone;

/// Captures indexed by the capturing stone color.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Captures {
    pub black: u32,
    pub white: u32,
}

impl Captures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, stone: Stone) -> u32 {
        match stone {
            Stone::Black => self.black,
            Stone::White => self.white,
        }
    }

    fn add(&mut self, stone: Stone, count: u32) {
        match stone {
            Stone::Black => self.black += count,
            Stone::White => self.white += count,
        }
    }
}

/// A maximal 4-connected set of same-colored stones together with its
/// distinct liberties (a liberty shared by several stones counts once).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub stones: Vec<Point>,
    pub liberties: Vec<Point>,
}

impl Group {
    pub fn liberty_count(&self) -> usize {
        self.liberties.len()
    }
}

/// The Go board stored as a flat array of i8 signs
/// (`1` Black, `-1` White, `0` empty).
///
/// The ko reference is a snapshot of the full position immediately prior to
/// the move currently on the board; a move recreating it exactly is a simple
/// ko violation. Passes leave the reference untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Goban {
    board: Vec<i8>,
    size: u8,
    captures: Captures,
    ko: Option<Vec<i8>>,
}

impl Goban {
    /// Create an empty square board with the given side length.
    pub fn new(size: u8) -> Self {
        Goban {
            board: vec![0i8; size as usize * size as usize],
            size,
            captures: Captures::new(),
            ko: None,
        }
    }

    /// Create a goban from an existing board matrix (size x size of i8 signs).
    pub fn from_matrix(board: Vec<Vec<i8>>) -> Self {
        let size = board.len() as u8;

        assert!(
            board.iter().all(|row| row.len() == size as usize),
            "malformed board matrix"
        );

        Goban {
            board: board.into_iter().flatten().collect(),
            size,
            captures: Captures::new(),
            ko: None,
        }
    }

    // -- Accessors --

    pub fn board(&self) -> &[i8] {
        &self.board
    }

    pub fn size(&self) -> u8 {
        self.size
    }

    pub fn captures(&self) -> &Captures {
        &self.captures
    }

    pub fn ko(&self) -> Option<&[i8]> {
        self.ko.as_deref()
    }

    pub fn stone_at(&self, point: Point) -> Option<Stone> {
        let (col, row) = point;
        if self.on_board(point) {
            Stone::from_int(self.board[self.idx(col, row)])
        } else {
            None
        }
    }

    pub fn on_board(&self, (col, row): Point) -> bool {
        col < self.size && row < self.size
    }

    pub fn is_empty(&self) -> bool {
        self.board.iter().all(|&s| s == 0)
    }

    pub fn stones_placed(&self) -> usize {
        self.board.iter().filter(|&&s| s != 0).count()
    }

    // -- Game actions --

    /// Attempt a move. Returns the new board value and the captured points,
    /// or a rejection; the receiver is never mutated.
    ///
    /// Order of checks: bounds, occupancy, opponent captures, suicide,
    /// simple ko (full-board comparison with the retained prior position).
    pub fn play(&self, point: Point, stone: Stone) -> Result<(Goban, Vec<Point>), GoError> {
        if !self.on_board(point) {
            return Err(GoError::OutOfBounds);
        }

        if self.stone_at(point).is_some() {
            return Err(GoError::Occupied);
        }

        let mut next = self.clone();
        next.set_stone(point, stone);

        // Remove opponent chains left without liberties. Several independent
        // chains can die to one move.
        let mut captured = Vec::new();
        for chain in next.opponent_neighbor_chains(point) {
            if next.chain_liberties(&chain).is_empty() {
                captured.extend(chain);
            }
        }
        next.capture_mut(&captured);

        // Captures are resolved first: freeing a liberty can rescue what
        // would otherwise be suicide.
        if next.liberties(point).is_empty() {
            return Err(GoError::Suicide);
        }

        if self.ko.as_deref() == Some(next.board.as_slice()) {
            return Err(GoError::KoViolation);
        }

        next.ko = Some(self.board.clone());
        Ok((next, captured))
    }

    /// Rules legality of a move, by running the full applier on a scratch
    /// copy and discarding the result.
    pub fn is_legal(&self, point: Point, stone: Stone) -> bool {
        self.play(point, stone).is_ok()
    }

    /// Whether the color has any legal move at all.
    pub fn has_legal_move(&self, stone: Stone) -> bool {
        for row in 0..self.size {
            for col in 0..self.size {
                if self.stone_at((col, row)).is_none() && self.is_legal((col, row), stone) {
                    return true;
                }
            }
        }
        false
    }

    /// Remove captured stones from the board in place and credit the
    /// capturing side.
    fn capture_mut(&mut self, stones: &[Point]) {
        if stones.is_empty() {
            return;
        }

        let stone_color = self.stone_at(stones[0]).unwrap();
        let capturing_color = stone_color.opp();

        for &pt in stones {
            self.clear_stone(pt);
        }
        self.captures.add(capturing_color, stones.len() as u32);
    }

    // -- Graph algorithms --

    /// Get the 4-connected neighbors that are on the board.
    pub fn neighbors(&self, (col, row): Point) -> ArrayVec<Point, 4> {
        let mut result = ArrayVec::new();
        if col > 0 {
            result.push((col - 1, row));
        }
        if col + 1 < self.size {
            result.push((col + 1, row));
        }
        if row > 0 {
            result.push((col, row - 1));
        }
        if row + 1 < self.size {
            result.push((col, row + 1));
        }
        result
    }

    /// The group containing `point` and its distinct liberties.
    /// `None` when the point is empty or off the board.
    pub fn group(&self, point: Point) -> Option<Group> {
        self.stone_at(point)?;
        let stones = self.chain(point);
        let liberties = self.chain_liberties(&stones);
        Some(Group { stones, liberties })
    }

    /// All groups of a color currently at exactly one liberty.
    pub fn groups_in_atari(&self, stone: Stone) -> Vec<Group> {
        let mut visited = vec![false; self.board.len()];
        let mut result = Vec::new();

        for row in 0..self.size {
            for col in 0..self.size {
                if visited[self.idx(col, row)] || self.stone_at((col, row)) != Some(stone) {
                    continue;
                }
                let stones = self.chain_from((col, row), &mut visited);
                let liberties = self.chain_liberties(&stones);
                if liberties.len() == 1 {
                    result.push(Group { stones, liberties });
                }
            }
        }

        result
    }

    /// Flood-fill connected group of same-colored stones.
    pub fn chain(&self, point: Point) -> Vec<Point> {
        if self.stone_at(point).is_none() {
            return Vec::new();
        }
        let mut visited = vec![false; self.board.len()];
        self.chain_from(point, &mut visited)
    }

    /// Get the liberties of a single stone's connected group.
    pub fn liberties(&self, point: Point) -> Vec<Point> {
        let chain = self.chain(point);
        self.chain_liberties(&chain)
    }

    /// Distinct liberties of a pre-computed chain.
    pub fn chain_liberties(&self, chain: &[Point]) -> Vec<Point> {
        let mut seen = vec![false; self.board.len()];
        let mut libs = Vec::new();
        for &p in chain {
            for n in self.neighbors(p) {
                let ni = self.idx(n.0, n.1);
                if !seen[ni] && self.stone_at(n).is_none() {
                    seen[ni] = true;
                    libs.push(n);
                }
            }
        }
        libs
    }

    /// Find all opponent chains neighboring a given point.
    pub(crate) fn opponent_neighbor_chains(&self, point: Point) -> Vec<Vec<Point>> {
        let stone = match self.stone_at(point) {
            Some(s) => s,
            _ => return Vec::new(),
        };
        let opponent = stone.opp();

        let mut chains = Vec::new();
        let mut visited = vec![false; self.board.len()];

        for n in self.neighbors(point) {
            if self.stone_at(n) != Some(opponent) {
                continue;
            }
            if visited[self.idx(n.0, n.1)] {
                continue;
            }
            let ch = self.chain_from(n, &mut visited);
            if !ch.is_empty() {
                chains.push(ch);
            }
        }

        chains
    }

    /// Chain flood-fill using a shared visited bitset.
    fn chain_from(&self, point: Point, visited: &mut [bool]) -> Vec<Point> {
        let stone = match self.stone_at(point) {
            Some(s) => s,
            None => return Vec::new(),
        };

        let mut result = Vec::new();
        let mut stack = vec![point];

        while let Some(p) = stack.pop() {
            let vi = self.idx(p.0, p.1);
            if visited[vi] {
                continue;
            }
            visited[vi] = true;
            result.push(p);
            for n in self.neighbors(p) {
                if self.stone_at(n) == Some(stone) && !visited[self.idx(n.0, n.1)] {
                    stack.push(n);
                }
            }
        }

        result
    }

    // -- Internal helpers --

    #[inline]
    fn idx(&self, col: u8, row: u8) -> usize {
        row as usize * self.size as usize + col as usize
    }

    pub(crate) fn set_stone(&mut self, (col, row): Point, stone: Stone) {
        if self.on_board((col, row)) {
            let i = self.idx(col, row);
            self.board[i] = stone.to_int();
        }
    }

    fn clear_stone(&mut self, (col, row): Point) {
        if self.on_board((col, row)) {
            let i = self.idx(col, row);
            self.board[i] = 0;
        }
    }
}
