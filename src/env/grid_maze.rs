use thiserror::Error;

use super::{Direction, Environment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Free,
    Wall,
    Trap,
    Goal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MazeError {
    #[error("the maze has no rows")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown cell {cell:?} at row {row}, column {col}")]
    UnknownCell { cell: char, row: usize, col: usize },
    #[error("the maze has no start cell 'S'")]
    MissingStart,
    #[error("the maze has more than one start cell 'S'")]
    DuplicateStart,
    #[error("the maze has no goal cell 'G'")]
    MissingGoal,
}

/// Fixed-layout grid maze.
///
/// `S` start, `G` goal, `#` wall, `T` trap, `.` free. Bumping into a wall or
/// the border leaves the robot in place.
#[derive(Debug, Clone)]
pub struct GridMaze {
    cells: Vec<Vec<Cell>>,
    nrow: usize,
    ncol: usize,
    start: Position,
    robot: Position,
}

impl GridMaze {
    pub const REWARD_WALL: f64 = -10.0;
    pub const REWARD_GOAL: f64 = 50.0;
    pub const REWARD_TRAP: f64 = -30.0;
    pub const REWARD_DEFAULT: f64 = -0.1;

    pub const MAP_SMALL: [&'static str; 4] = [
        "S..#.",
        ".#...",
        "...T.",
        "#..#G",
    ];

    pub const MAP_MEDIUM: [&'static str; 6] = [
        "S...#...",
        ".##.#.#.",
        "...T..#.",
        ".#.##...",
        ".#...#T.",
        "...#...G",
    ];

    pub fn new(map: &[&str]) -> Result<Self, MazeError> {
        let nrow: usize = map.len();
        if nrow == 0 {
            return Err(MazeError::Empty);
        }
        let ncol: usize = map[0].chars().count();
        if ncol == 0 {
            return Err(MazeError::Empty);
        }

        let mut cells: Vec<Vec<Cell>> = Vec::with_capacity(nrow);
        let mut start: Option<Position> = None;
        let mut has_goal: bool = false;
        for (row, line) in map.iter().enumerate() {
            let found: usize = line.chars().count();
            if found != ncol {
                return Err(MazeError::RaggedRow {
                    row,
                    expected: ncol,
                    found,
                });
            }
            let mut cells_row: Vec<Cell> = Vec::with_capacity(ncol);
            for (col, c) in line.chars().enumerate() {
                let cell: Cell = match c {
                    '.' => Cell::Free,
                    '#' => Cell::Wall,
                    'T' => Cell::Trap,
                    'G' => {
                        has_goal = true;
                        Cell::Goal
                    }
                    'S' => {
                        if start.is_some() {
                            return Err(MazeError::DuplicateStart);
                        }
                        start = Some(Position::new(row, col));
                        Cell::Free
                    }
                    cell => return Err(MazeError::UnknownCell { cell, row, col }),
                };
                cells_row.push(cell);
            }
            cells.push(cells_row);
        }

        let start: Position = start.ok_or(MazeError::MissingStart)?;
        if !has_goal {
            return Err(MazeError::MissingGoal);
        }
        Ok(Self {
            cells,
            nrow,
            ncol,
            start,
            robot: start,
        })
    }

    /// Reads a maze written one row per line, blank lines ignored.
    pub fn parse(text: &str) -> Result<Self, MazeError> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        Self::new(&rows)
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nrow, self.ncol)
    }

    pub fn start(&self) -> Position {
        self.start
    }

    /// Cell reached from `pos` moving one step along `direction`, if it lies
    /// inside the grid.
    fn inc(&self, pos: Position, direction: Direction) -> Option<Position> {
        let (drow, dcol) = direction.delta();
        let row: usize = pos.row.checked_add_signed(drow)?;
        let col: usize = pos.col.checked_add_signed(dcol)?;
        if row < self.nrow && col < self.ncol {
            Some(Position::new(row, col))
        } else {
            None
        }
    }

    fn cell(&self, pos: Position) -> Cell {
        self.cells[pos.row][pos.col]
    }
}

impl Environment for GridMaze {
    type State = Position;
    type Action = Direction;

    fn valid_actions(&self) -> Vec<Direction> {
        Direction::ALL.to_vec()
    }

    fn sense_state(&self) -> Position {
        self.robot
    }

    fn move_robot(&mut self, action: Direction) -> f64 {
        let target: Position = match self.inc(self.robot, action) {
            Some(pos) if self.cell(pos) != Cell::Wall => pos,
            _ => return Self::REWARD_WALL,
        };
        self.robot = target;
        match self.cell(target) {
            Cell::Goal => Self::REWARD_GOAL,
            Cell::Trap => Self::REWARD_TRAP,
            _ => Self::REWARD_DEFAULT,
        }
    }

    fn restart(&mut self) {
        self.robot = self.start;
    }

    fn is_terminal(&self) -> bool {
        self.cell(self.robot) == Cell::Goal
    }
}
