use std::collections::VecDeque;

use crate::GridInt;
use Direction::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub fn is_opposite(self, other: Direction) -> bool {
        matches!((self, other), (Up, Down) | (Down, Up) | (Right, Left) | (Left, Right))
    }

    /// Unit vector for one step, with y growing downwards.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn head_char(self) -> char {
        match self {
            Up => '^',
            Down => 'v',
            Left => '<',
            Right => '>',
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: GridInt,
    pub y: GridInt,
}

impl Position {
    pub const fn new(x: GridInt, y: GridInt) -> Self {
        Position { x, y }
    }

    /// One cell in `direction` on a `width` x `height` torus.
    pub fn stepped(self, direction: Direction, width: GridInt, height: GridInt) -> Position {
        let (dx, dy) = direction.delta();
        Position {
            x: wrap(self.x, dx, width),
            y: wrap(self.y, dy, height),
        }
    }
}

fn wrap(value: GridInt, delta: i32, size: GridInt) -> GridInt {
    (value as i32 + delta).rem_euclid(size as i32) as GridInt
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    // Head at the front
    body: VecDeque<Position>,
}

impl Snake {
    /// Lays `size` segments out behind `head`, opposite to `direction`.
    /// The caller guarantees the body fits the grid without wrapping.
    pub fn new(head: Position, size: GridInt, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        let (tail_x, tail_y) = (head.x as i32 - dx * (size as i32 - 1), head.y as i32 - dy * (size as i32 - 1));
        debug_assert!(
            tail_x >= 0 && tail_y >= 0,
            "snake of {} behind {:?} leaves the grid", size, head
        );

        let body = (0..size as i32)
            .map(|i| Position::new((head.x as i32 - dx * i) as GridInt, (head.y as i32 - dy * i) as GridInt))
            .collect();
        Snake { body }
    }

    pub fn head(&self) -> Position {
        self.body[0]
    }

    pub fn body(&self) -> impl Iterator<Item = &Position> + '_ {
        self.body.iter()
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn contains(&self, pos: &Position) -> bool {
        self.body.contains(pos)
    }

    /// Pushes `new_head` and drops the tail unless `grow` is set.
    /// Returns the removed tail, if any.
    pub fn advance(&mut self, new_head: Position, grow: bool) -> Option<Position> {
        self.body.push_front(new_head);

        if grow {
            None
        } else {
            self.body.pop_back()
        }
    }
}
