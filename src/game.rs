use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::Event;
use crossterm::style::Color;
use log::{debug, info};
use rand::Rng;

use crate::config::GameConfig;
use crate::engine::{GameEngine, Status, TickOutcome};
use crate::input::{map_key, Command};
use crate::render;
use crate::term::{TermCoords, TermManager};

/// Runs one engine in the terminal until the player quits.
pub struct SnakeGame<R: Rng> {
    engine: GameEngine<R>,
    term: TermManager,
    clock: TickClock,
    origin: Option<TermCoords>,
    quit: bool,
}

impl<R: Rng> SnakeGame<R> {
    pub fn new(config: &GameConfig, rng: R) -> Result<Self> {
        Ok(SnakeGame {
            engine: GameEngine::new(config, rng),
            term: TermManager::new()?,
            clock: TickClock::new(config.tick_interval()),
            origin: None,
            quit: false,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        self.term.setup()?;
        let result = self.play();
        let restored = self.term.restore();

        // A failed game is the more useful error to report
        result.and(restored)
    }

    fn play(&mut self) -> Result<()> {
        self.layout()?;

        while !self.quit {
            for event in self.term.read_events(self.clock.timeout(Instant::now()))? {
                self.handle_event(event)?;
            }

            self.advance_clock(Instant::now());
            self.render()?;
        }

        info!("Quit with score {}", self.engine.score());
        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Key(key) => self.apply(map_key(&key)),
            Event::Resize(w, h) => {
                debug!("Terminal resized to {}x{}", w, h);
                self.term.resize(w, h)?;
                self.layout()?;
            }
            _ => {}
        }
        Ok(())
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::Turn(dir) => {
                self.engine.request_direction(dir);
                debug!("Turn {:?} requested, pending {:?}", dir, self.engine.pending_direction());
            }
            Command::TogglePause => self.engine.toggle_pause(),
            Command::Reset => {
                info!("Reset with score {}", self.engine.score());
                self.engine.reset();
            }
            Command::Quit => self.quit = true,
            Command::None => {}
        }
    }

    fn advance_clock(&mut self, now: Instant) {
        if !self.clock.due(self.engine.status() == Status::Running, now) {
            return;
        }

        match self.engine.tick() {
            TickOutcome::Ate { new_head, .. } => {
                debug!("Ate at ({}, {}), score {}", new_head.x, new_head.y, self.engine.score())
            }
            TickOutcome::Crashed { at } => {
                info!(
                    "Game over at ({}, {}) with score {}, length {}",
                    at.x, at.y, self.engine.score(), self.engine.snake().len()
                )
            }
            TickOutcome::Moved { .. } | TickOutcome::Idle => {}
        }
    }

    fn layout(&mut self) -> Result<()> {
        self.origin = render::board_origin(self.term.size(), self.engine.grid_size());
        if self.origin.is_none() {
            let (w, h) = render::board_extent(self.engine.grid_size());
            info!("Terminal too small, need {}x{}", w, h);
            self.term.clear()?;
        }
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        match self.origin {
            Some(origin) => render::draw(&mut self.term, origin, &self.engine),
            None => {
                let (w, h) = render::board_extent(self.engine.grid_size());
                self.term.print_str((0, 0), "Terminal too small", Color::Red);
                self.term.print_str((0, 1), &format!("Need {}x{}", w, h), Color::Red);
            }
        }
        self.term.flush()
    }
}

/// Fixed-period tick timer. Fires at most once per interval, and only while
/// the game runs; it restarts each time the game enters the running state.
struct TickClock {
    interval: Duration,
    next: Option<Instant>,
}

impl TickClock {
    fn new(interval: Duration) -> Self {
        TickClock { interval, next: None }
    }

    fn due(&mut self, running: bool, now: Instant) -> bool {
        if !running {
            self.next = None;
            return false;
        }

        let Some(deadline) = self.next else {
            self.next = Some(now + self.interval);
            return false;
        };
        if now < deadline {
            return false;
        }

        // Missed ticks are dropped, not replayed
        let following = deadline + self.interval;
        self.next = Some(if following > now { following } else { now + self.interval });
        true
    }

    /// How long input polling may block before the next tick is due.
    fn timeout(&self, now: Instant) -> Duration {
        match self.next {
            Some(deadline) => deadline.saturating_duration_since(now),
            None => self.interval,
        }
    }
}
