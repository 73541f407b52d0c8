use crossterm::style::Color;
use rand::Rng;

use crate::engine::{GameEngine, Status};
use crate::snake::Position;
use crate::term::{TermCoords, TermManager};
use crate::TermInt;

// Every grid cell is two columns wide so the board looks square
const CELL_WIDTH: TermInt = 2;
const BODY_CHAR: char = '█';
const FOOD_CHAR: char = '●';
const DEAD_CHAR: char = 'X';
const EMPTY_CHAR: char = '·';

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CellKind {
    Empty,
    Head,
    Body,
    Food,
    Dead,
}

pub fn cell_at<R: Rng>(engine: &GameEngine<R>, pos: Position) -> CellKind {
    let snake = engine.snake();
    if snake.contains(&pos) {
        if engine.status() == Status::GameOver {
            CellKind::Dead
        } else if snake.head() == pos {
            CellKind::Head
        } else {
            CellKind::Body
        }
    } else if engine.food() == pos {
        CellKind::Food
    } else {
        CellKind::Empty
    }
}

pub fn overlay_lines(status: Status, score: u32) -> Option<Vec<String>> {
    let lines: &[&str] = match status {
        Status::Running => return None,
        Status::Ready => &["SNAKE", "", "Arrow keys or WASD to start", "Space to pause, Q to quit"],
        Status::Paused => &["Paused", "", "Press Space to resume"],
        Status::GameOver => {
            return Some(vec![
                "Game over!".to_string(),
                format!("Score: {}", score),
                String::new(),
                "Press R to play again".to_string(),
            ]);
        }
    };
    Some(lines.iter().map(|l| l.to_string()).collect())
}

/// Space the board takes on screen: border, cells, and the header row above.
pub fn board_extent(grid: (TermInt, TermInt)) -> TermCoords {
    (grid.0 * CELL_WIDTH + 2, grid.1 + 3)
}

/// Top-left corner of the header row when the board is centered, or `None`
/// if the terminal is too small.
pub fn board_origin(term_size: TermCoords, grid: (TermInt, TermInt)) -> Option<TermCoords> {
    let (w, h) = board_extent(grid);
    if w > term_size.0 || h > term_size.1 {
        return None;
    }
    Some(((term_size.0 - w) / 2, (term_size.1 - h) / 2))
}

pub fn draw<R: Rng>(term: &mut TermManager, origin: TermCoords, engine: &GameEngine<R>) {
    let (grid_w, grid_h) = engine.grid_size();
    let (extent_w, _) = board_extent((grid_w, grid_h));

    let header = format!(" Score: {:<6} Space: pause  R: restart  Q: quit", engine.score());
    let header: String = header.chars().take(extent_w as usize).collect();
    term.print_str(origin, &format!("{:<width$}", header, width = extent_w as usize), Color::Cyan);

    let board_top = (origin.0, origin.1 + 1);
    term.draw_borders(board_top, extent_w, grid_h + 2);

    for y in 0..grid_h {
        for x in 0..grid_w {
            let pos = Position::new(x, y);
            let (glyph, color) = match cell_at(engine, pos) {
                CellKind::Empty => ([EMPTY_CHAR, ' '], Color::DarkGrey),
                CellKind::Head => {
                    let ch = engine.direction().head_char();
                    ([ch, ch], Color::Yellow)
                }
                CellKind::Body => ([BODY_CHAR, BODY_CHAR], Color::Green),
                CellKind::Food => ([FOOD_CHAR, ' '], Color::Red),
                CellKind::Dead => ([DEAD_CHAR, DEAD_CHAR], Color::DarkGrey),
            };

            let col = board_top.0 + 1 + x * CELL_WIDTH;
            let row = board_top.1 + 1 + y;
            term.print_at((col, row), glyph[0], color);
            term.print_at((col + 1, row), glyph[1], color);
        }
    }

    match overlay_lines(engine.status(), engine.score()) {
        Some(lines) => term.show_message(&lines),
        None => term.hide_message(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::snake::{Direction, Snake};
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn overlay_text_per_status() {
        assert_eq!(overlay_lines(Status::Running, 3), None);
        assert!(overlay_lines(Status::Ready, 0).unwrap().iter().any(|l| l.contains("to start")));
        assert!(overlay_lines(Status::Paused, 0).unwrap().iter().any(|l| l.contains("resume")));

        let over = overlay_lines(Status::GameOver, 17).unwrap();
        assert!(over.contains(&"Score: 17".to_string()));
        assert!(over.iter().any(|l| l.contains("play again")));
    }

    #[test]
    fn classifies_cells() {
        let mut engine = GameEngine::new(&GameConfig::new(24, 18), StdRng::seed_from_u64(5));
        let food = engine.food();

        assert_eq!(cell_at(&engine, Position::new(12, 9)), CellKind::Head);
        assert_eq!(cell_at(&engine, Position::new(10, 9)), CellKind::Body);
        assert_eq!(cell_at(&engine, food), CellKind::Food);

        let empty = (0..24).map(|x| Position::new(x, 0)).find(|p| *p != food).unwrap();
        assert_eq!(cell_at(&engine, empty), CellKind::Empty);

        // Curl a longer snake back into itself
        engine.set_state(Snake::new(Position::new(5, 5), 5, Direction::Right), Direction::Right, Position::new(20, 15));
        for dir in [Direction::Down, Direction::Left, Direction::Up] {
            engine.request_direction(dir);
            engine.tick();
        }
        assert_eq!(engine.status(), Status::GameOver);
        assert_eq!(cell_at(&engine, engine.snake().head()), CellKind::Dead);
    }

    #[test]
    fn board_is_centered_or_rejected() {
        assert_eq!(board_extent((24, 18)), (50, 21));
        assert_eq!(board_origin((80, 25), (24, 18)), Some((15, 2)));
        assert_eq!(board_origin((50, 21), (24, 18)), Some((0, 0)));
        assert_eq!(board_origin((49, 30), (24, 18)), None);
        assert_eq!(board_origin((80, 20), (24, 18)), None);
    }
}
