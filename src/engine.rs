use rand::{seq::SliceRandom, Rng};

use crate::config::{GameConfig, INITIAL_SNAKE_LENGTH};
use crate::snake::{Direction, Position, Snake};
use crate::GridInt;

/// Where food goes when the snake covers every cell.
pub const FALLBACK_FOOD: Position = Position::new(0, 0);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Status {
    Ready,
    Running,
    Paused,
    GameOver,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running, nothing changed
    Idle,
    Moved { new_head: Position, old_tail: Position },
    Ate { new_head: Position, food: Position },
    Crashed { at: Position },
}

/// The whole mutable state of one game. The game loop is its only writer.
pub struct GameEngine<R: Rng> {
    width: GridInt,
    height: GridInt,
    snake: Snake,
    direction: Direction,
    pending: Option<Direction>,
    food: Position,
    score: u32,
    status: Status,
    rng: R,
}

impl<R: Rng> GameEngine<R> {
    pub fn new(config: &GameConfig, rng: R) -> Self {
        let (width, height) = (config.grid_width, config.grid_height);
        let snake = Snake::new(start_head(width, height), INITIAL_SNAKE_LENGTH, Direction::Right);

        let mut engine = GameEngine {
            width,
            height,
            snake,
            direction: Direction::Right,
            pending: None,
            food: FALLBACK_FOOD,
            score: 0,
            status: Status::Ready,
            rng,
        };
        engine.reset();
        engine
    }

    pub fn reset(&mut self) {
        self.snake = Snake::new(start_head(self.width, self.height), INITIAL_SNAKE_LENGTH, Direction::Right);
        self.direction = Direction::Right;
        self.pending = None;
        self.score = 0;
        self.status = Status::Ready;
        self.food = self.spawn_food();
    }

    /// Records `direction` for the next tick. The first accepted request starts the game.
    pub fn request_direction(&mut self, direction: Direction) {
        if direction.is_opposite(self.direction) {
            return;
        }

        self.pending = Some(direction);
        if self.status == Status::Ready {
            self.status = Status::Running;
        }
    }

    pub fn toggle_pause(&mut self) {
        self.status = match self.status {
            Status::Running => Status::Paused,
            Status::Paused => Status::Running,
            other => other,
        };
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.status != Status::Running {
            return TickOutcome::Idle;
        }

        if let Some(dir) = self.pending.take() {
            if !dir.is_opposite(self.direction) {
                self.direction = dir;
            }
        }

        let new_head = self.snake.head().stepped(self.direction, self.width, self.height);

        if self.snake.contains(&new_head) {
            self.status = Status::GameOver;
            return TickOutcome::Crashed { at: new_head };
        }

        let ate = new_head == self.food;
        let old_tail = self.snake.advance(new_head, ate);

        match old_tail {
            Some(old_tail) => TickOutcome::Moved { new_head, old_tail },
            None => {
                let food = self.food;
                self.score += 1;
                self.food = self.spawn_food();
                TickOutcome::Ate { new_head, food }
            }
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn food(&self) -> Position {
        self.food
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn pending_direction(&self) -> Option<Direction> {
        self.pending
    }

    pub fn grid_size(&self) -> (GridInt, GridInt) {
        (self.width, self.height)
    }

    fn spawn_food(&mut self) -> Position {
        let snake = &self.snake;
        let free: Vec<Position> = (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| Position::new(x, y)))
            .filter(|pos| !snake.contains(pos))
            .collect();

        free.choose(&mut self.rng).copied().unwrap_or(FALLBACK_FOOD)
    }

    #[cfg(test)]
    pub(crate) fn set_state(&mut self, snake: Snake, direction: Direction, food: Position) {
        self.snake = snake;
        self.direction = direction;
        self.food = food;
    }
}

fn start_head(width: GridInt, height: GridInt) -> Position {
    // Keeps the tail on the grid for the narrowest allowed width
    let x = (width / 2).max(INITIAL_SNAKE_LENGTH - 1);
    Position::new(x, height / 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;
    use Direction::*;

    fn engine(width: GridInt, height: GridInt, seed: u64) -> GameEngine<StdRng> {
        GameEngine::new(&GameConfig::new(width, height), StdRng::seed_from_u64(seed))
    }

    fn body(engine: &GameEngine<StdRng>) -> Vec<Position> {
        engine.snake().body().copied().collect()
    }

    fn p(x: GridInt, y: GridInt) -> Position {
        Position::new(x, y)
    }

    fn assert_sound(engine: &GameEngine<StdRng>) {
        let (w, h) = engine.grid_size();
        let cells = body(engine);
        let distinct: HashSet<_> = cells.iter().collect();
        assert_eq!(distinct.len(), cells.len(), "snake overlaps itself: {:?}", cells);
        assert!(cells.iter().all(|c| c.x < w && c.y < h));
    }

    #[test]
    fn reset_centres_snake_moving_right() {
        let mut engine = engine(24, 18, 1);
        assert_eq!(engine.status(), Status::Ready);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.direction(), Right);
        assert_eq!(body(&engine), vec![p(12, 9), p(11, 9), p(10, 9)]);
        assert!(!engine.snake().contains(&engine.food()));

        engine.request_direction(Up);
        for _ in 0..5 {
            engine.tick();
        }
        engine.reset();

        assert_eq!(engine.status(), Status::Ready);
        assert_eq!(engine.score(), 0);
        assert_eq!(engine.direction(), Right);
        assert_eq!(engine.pending_direction(), None);
        assert_eq!(body(&engine), vec![p(12, 9), p(11, 9), p(10, 9)]);
        assert!(!engine.snake().contains(&engine.food()));
    }

    #[test]
    fn one_tick_moves_one_cell() {
        let mut engine = engine(24, 18, 2);
        engine.set_state(engine.snake().clone(), Right, p(0, 0));
        engine.request_direction(Right);

        let outcome = engine.tick();

        assert_eq!(outcome, TickOutcome::Moved { new_head: p(13, 9), old_tail: p(10, 9) });
        assert_eq!(body(&engine), vec![p(13, 9), p(12, 9), p(11, 9)]);
        assert_eq!(engine.score(), 0);
    }

    #[test]
    fn first_direction_starts_the_game() {
        let mut engine = engine(24, 18, 3);
        assert_eq!(engine.tick(), TickOutcome::Idle);
        assert_eq!(body(&engine)[0], p(12, 9));

        engine.request_direction(Left);
        assert_eq!(engine.status(), Status::Ready);

        engine.request_direction(Down);
        assert_eq!(engine.status(), Status::Running);
        assert_eq!(engine.pending_direction(), Some(Down));
    }

    #[test]
    fn reversal_is_ignored() {
        let mut engine = engine(24, 18, 4);
        engine.set_state(engine.snake().clone(), Right, p(0, 0));
        engine.request_direction(Up);
        engine.tick();
        assert_eq!(engine.direction(), Up);

        engine.request_direction(Down);
        assert_eq!(engine.pending_direction(), None);
        engine.tick();
        assert_eq!(engine.direction(), Up);
        assert_eq!(body(&engine)[0], p(12, 7));
    }

    #[test]
    fn latest_request_before_a_tick_wins() {
        let mut engine = engine(24, 18, 5);
        engine.set_state(engine.snake().clone(), Right, p(0, 0));
        engine.request_direction(Up);
        engine.request_direction(Down);
        engine.tick();

        assert_eq!(engine.direction(), Down);
        assert_eq!(body(&engine)[0], p(12, 10));
    }

    #[test]
    fn wraps_at_right_and_bottom_edges() {
        let mut engine = engine(24, 18, 6);
        engine.request_direction(Right);

        engine.set_state(Snake::new(p(23, 4), 3, Right), Right, p(0, 0));
        engine.tick();
        assert_eq!(engine.snake().head(), p(0, 4));

        engine.set_state(Snake::new(p(7, 17), 3, Down), Down, p(0, 0));
        engine.tick();
        assert_eq!(engine.snake().head(), p(7, 0));
        assert_sound(&engine);
    }

    #[test]
    fn eating_grows_and_scores() {
        let mut engine = engine(24, 18, 7);
        engine.set_state(engine.snake().clone(), Right, p(13, 9));
        engine.request_direction(Right);

        let outcome = engine.tick();

        assert_eq!(outcome, TickOutcome::Ate { new_head: p(13, 9), food: p(13, 9) });
        assert_eq!(engine.score(), 1);
        assert_eq!(body(&engine), vec![p(13, 9), p(12, 9), p(11, 9), p(10, 9)]);
        assert!(!engine.snake().contains(&engine.food()));
    }

    #[test]
    fn self_collision_freezes_state() {
        let mut engine = engine(10, 10, 8);
        engine.set_state(Snake::new(p(5, 5), 5, Right), Right, p(8, 8));
        engine.request_direction(Down);
        engine.tick();
        engine.request_direction(Left);
        engine.tick();

        let before = body(&engine);
        let (food, score) = (engine.food(), engine.score());

        engine.request_direction(Up);
        let outcome = engine.tick();

        assert_eq!(outcome, TickOutcome::Crashed { at: p(4, 5) });
        assert_eq!(engine.status(), Status::GameOver);
        assert_eq!(body(&engine), before);
        assert_eq!((engine.food(), engine.score()), (food, score));

        engine.request_direction(Left);
        engine.toggle_pause();
        assert_eq!(engine.tick(), TickOutcome::Idle);
        assert_eq!(engine.status(), Status::GameOver);
    }

    #[test]
    fn pause_toggles_only_between_running_and_paused() {
        let mut engine = engine(24, 18, 9);
        engine.toggle_pause();
        assert_eq!(engine.status(), Status::Ready);

        engine.request_direction(Up);
        engine.toggle_pause();
        assert_eq!(engine.status(), Status::Paused);
        assert_eq!(engine.tick(), TickOutcome::Idle);

        engine.toggle_pause();
        assert_eq!(engine.status(), Status::Running);
    }

    #[test]
    fn turn_made_while_paused_applies_after_resume() {
        let mut engine = engine(24, 18, 12);
        engine.set_state(engine.snake().clone(), Right, p(0, 0));
        engine.request_direction(Right);
        engine.toggle_pause();

        engine.request_direction(Up);
        assert_eq!(engine.pending_direction(), Some(Up));
        assert_eq!(engine.tick(), TickOutcome::Idle);

        engine.toggle_pause();
        engine.tick();
        assert_eq!(engine.direction(), Up);
        assert_eq!(engine.snake().head(), p(12, 8));
    }

    #[test]
    fn food_falls_back_when_grid_is_full() {
        // 4x1 grid: snake of 3 plus one free cell
        let mut engine = engine(4, 1, 10);
        assert_eq!(engine.food(), p(3, 0));

        engine.request_direction(Right);
        assert!(matches!(engine.tick(), TickOutcome::Ate { .. }));
        assert_eq!(engine.snake().len(), 4);
        assert_eq!(engine.food(), FALLBACK_FOOD);
    }

    #[test]
    fn same_seed_same_food() {
        let mut a = engine(24, 18, 42);
        let mut b = engine(24, 18, 42);
        for _ in 0..5 {
            assert_eq!(a.food(), b.food());
            a.reset();
            b.reset();
        }
    }

    #[test]
    fn random_walk_keeps_snake_sound() {
        let mut engine = engine(8, 6, 11);
        let mut steer = StdRng::seed_from_u64(99);
        let dirs = [Up, Down, Left, Right];

        for _ in 0..2_000 {
            if engine.status() == Status::GameOver {
                engine.reset();
            }
            let dir = *dirs.choose(&mut steer).unwrap();
            engine.request_direction(dir);

            let len_before = engine.snake().len();
            let score_before = engine.score();
            match engine.tick() {
                TickOutcome::Ate { .. } => {
                    assert_eq!(engine.snake().len(), len_before + 1);
                    assert_eq!(engine.score(), score_before + 1);
                }
                TickOutcome::Moved { .. } => assert_eq!(engine.snake().len(), len_before),
                _ => {}
            }

            assert_sound(&engine);
            if engine.snake().len() < 48 {
                assert!(!engine.snake().contains(&engine.food()));
            }
        }
    }
}
