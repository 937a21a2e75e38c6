//! TUI application state and event loop.
//!
//! The main thread owns the terminal: it renders, reads input, and holds
//! the viewport and display modes. The sampler thread only ever touches the
//! store, so no lock covers the display state.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

use strata_core::horizon::{ColorBand, ramp_for_domain};
use strata_core::presenters::presenters_for;
use strata_core::{Error, MetricStore, Presenter, ViewMode};

use super::input::{Intent, intent_for};
use crate::RunConfig;

/// How long the render loop blocks on input before checking for new ticks.
const INPUT_POLL: Duration = Duration::from_millis(100);

pub struct App {
    pub store: Arc<MetricStore>,
    pub presenters: Vec<Box<dyn Presenter>>,
    pub view: ViewMode,
    pub refresh_ms: u64,
    /// Rows scrolled off the top.
    pub rows_off: usize,
    /// Samples scrolled back from the present; > 0 means paused.
    pub cols_off: usize,
    shutdown: Arc<AtomicBool>,
    fatal: Arc<Mutex<Option<Error>>>,
    last_tick: u64,
    settings_changed: bool,
    running: bool,
    bands: Vec<(&'static str, ColorBand)>,
}

impl App {
    pub fn new(
        store: Arc<MetricStore>,
        config: &RunConfig,
        shutdown: Arc<AtomicBool>,
        fatal: Arc<Mutex<Option<Error>>>,
    ) -> Self {
        let presenters = presenters_for(config.display);
        let bands = presenters
            .iter()
            .map(|p| (p.domain(), ColorBand::from_ramp(ramp_for_domain(p.domain()))))
            .collect();
        Self {
            store,
            presenters,
            view: config.view,
            refresh_ms: config.refresh_ms,
            rows_off: 0,
            cols_off: 0,
            shutdown,
            fatal,
            last_tick: 0,
            settings_changed: true,
            running: true,
            bands,
        }
    }

    pub fn band_for(&self, domain: &str) -> &ColorBand {
        self.bands
            .iter()
            .find(|(d, _)| *d == domain)
            .map(|(_, band)| band)
            .unwrap_or(&self.bands[0].1)
    }

    pub fn run(&mut self) -> Result<(), Error> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Restore the terminal before any panic output hits the screen.
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
            original_hook(info);
        }));

        let result = self.run_loop(&mut terminal);

        let _ = std::panic::take_hook();
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            crossterm::cursor::Show
        )?;
        result
    }

    fn run_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<(), Error> {
        while self.running {
            if self.fatal.lock().unwrap_or_else(|p| p.into_inner()).is_some() {
                break;
            }

            let ticks = self.store.ticks();
            if self.cols_off > 0 {
                // Paused: the right edge stays put while sampling continues,
                // so every new tick pushes the offset one further back.
                self.cols_off += (ticks - self.last_tick) as usize;
                self.clamp_cols_off(ticks);
            }
            let dirty = ticks != self.last_tick || self.settings_changed;
            self.last_tick = ticks;

            if dirty {
                terminal.draw(|f| super::ui::draw(f, self))?;
                self.settings_changed = false;
            }

            if event::poll(INPUT_POLL)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if let Some(intent) = intent_for(key) {
                            self.apply(intent);
                        }
                    }
                    Event::Resize(_, _) => self.settings_changed = true,
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn clamp_cols_off(&mut self, ticks: u64) {
        let max = (ticks.saturating_sub(1) as usize).min(self.store.capacity() - 1);
        if self.cols_off > max {
            self.cols_off = max;
        }
    }

    /// Total visible rows under current modes, for vertical clamping.
    fn visible_rows(&self) -> usize {
        self.presenters
            .iter()
            .map(|p| p.rows(&self.store.names_in_domain(p.domain())).len())
            .sum()
    }

    pub fn apply(&mut self, intent: Intent) {
        match intent {
            Intent::Quit => {
                self.running = false;
                self.shutdown.store(true, Ordering::Relaxed);
            }
            Intent::Cycle('v') => {
                self.view = self.view.next();
                self.settings_changed = true;
            }
            Intent::CycleBack('v') => {
                self.view = self.view.prev();
                self.settings_changed = true;
            }
            Intent::Cycle(hotkey) => {
                for presenter in &mut self.presenters {
                    if presenter.hotkey() == Some(hotkey) {
                        presenter.cycle();
                        self.settings_changed = true;
                    }
                }
            }
            Intent::CycleBack(hotkey) => {
                for presenter in &mut self.presenters {
                    if presenter.hotkey() == Some(hotkey) {
                        presenter.cycle_back();
                        self.settings_changed = true;
                    }
                }
            }
            Intent::Scroll { dx, dy } => {
                if dy < 0 && self.rows_off > 0 {
                    self.rows_off -= 1;
                    self.settings_changed = true;
                } else if dy > 0 && self.rows_off + 1 < self.visible_rows() {
                    self.rows_off += 1;
                    self.settings_changed = true;
                }
                if dx < 0 {
                    self.cols_off += 1;
                    self.clamp_cols_off(self.store.ticks());
                    self.settings_changed = true;
                } else if dx > 0 && self.cols_off > 0 {
                    self.cols_off -= 1;
                    self.settings_changed = true;
                }
            }
            Intent::ResetScroll => {
                if self.cols_off > 0 || self.rows_off > 0 {
                    self.cols_off = 0;
                    self.rows_off = 0;
                    self.settings_changed = true;
                }
            }
        }
    }
}
