use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use super::ctx::{GamestateCtx, Request};
use super::entry::{GamestateEntry, GamestateStatus};
use super::module::{Gamestate, GamestateFactory};
use crate::error::{EngineError, EngineResult, GamestateStage};
use crate::events::EngineEvent;

/// Progress display shown while gamestates with `show_loading` load.
pub trait LoadingScreen {
    fn begin(&mut self, _name: &str) {}
    /// `fraction` is in `0.0..=1.0`.
    fn progress(&mut self, name: &str, fraction: f32);
    fn end(&mut self, _name: &str) {}
}

/// Names touched by one [`GamestateManager::apply_pending`] pass, in call order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub stopped: Vec<String>,
    pub unloaded: Vec<String>,
    pub loaded: Vec<String>,
    pub started: Vec<String>,
    pub failed: Vec<String>,
}

impl ApplyReport {
    pub fn is_empty(&self) -> bool {
        self.stopped.is_empty()
            && self.unloaded.is_empty()
            && self.loaded.is_empty()
            && self.started.is_empty()
            && self.failed.is_empty()
    }
}

/// Registry of named gamestates and their deferred transitions.
///
/// Requests only flip pending flags. [`GamestateManager::apply_pending`] turns them into
/// module calls once per tick, stops first, then unloads, loads and starts, so a
/// gamestate can be torn down and another brought up within the same pass.
pub struct GamestateManager {
    entries: Vec<GamestateEntry>,
    factories: HashMap<String, GamestateFactory>,
    loading: Option<Box<dyn LoadingScreen>>,
    freeze_active: bool,
}

fn log_failure(name: &str, stage: GamestateStage, result: EngineResult<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            error!(target: "gamestate", "{}", EngineError::with_stage(name, stage, e));
            false
        }
    }
}

fn unknown(name: &str, op: &str) {
    error!(target: "gamestate", "cannot {op}: {}", EngineError::UnknownGamestate(name.to_string()));
}

impl GamestateManager {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            factories: HashMap::new(),
            loading: None,
            freeze_active: false,
        }
    }

    /// Bind a name to a module factory. The factory runs on every load of that name.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: FnMut() -> Box<dyn Gamestate> + 'static,
    {
        let boxed: GamestateFactory = Box::new(factory);
        if self.factories.insert(name.to_string(), boxed).is_some() {
            warn!(target: "gamestate", "factory for '{name}' replaced");
        } else {
            debug!(target: "gamestate", "factory for '{name}' registered");
        }
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn set_loading_screen(&mut self, screen: Box<dyn LoadingScreen>) {
        self.loading = Some(screen);
    }

    // ------------------------------------------------------------------
    // inspection

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    fn find_mut(&mut self, name: &str) -> Option<&mut GamestateEntry> {
        self.entries.iter_mut().find(|e| e.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&GamestateEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn status(&self, name: &str) -> Option<GamestateStatus> {
        self.get(name).map(|e| e.status())
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.get(name).is_some_and(|e| e.is_loaded())
    }

    pub fn is_started(&self, name: &str) -> bool {
        self.get(name).is_some_and(|e| e.is_started())
    }

    pub fn is_paused(&self, name: &str) -> bool {
        self.get(name).is_some_and(|e| e.is_paused())
    }

    /// Registry order, which is creation order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_pending(&self) -> bool {
        self.entries.iter().any(|e| e.has_pending())
    }

    pub fn is_frozen(&self) -> bool {
        self.freeze_active
    }

    // ------------------------------------------------------------------
    // requests

    /// Schedule a load; unknown names are created with the loading screen enabled.
    pub fn load(&mut self, name: &str) -> bool {
        let idx = match self.position(name) {
            Some(i) => i,
            None => {
                debug!(target: "gamestate", "'{name}' created");
                self.entries.push(GamestateEntry::new(name));
                self.entries.len() - 1
            }
        };

        let s = &mut self.entries[idx].status;
        if s.loaded && !s.pending_unload {
            warn!(target: "gamestate", "'{name}' is already loaded");
            return false;
        }
        if s.pending_load {
            debug!(target: "gamestate", "'{name}' is already scheduled for loading");
            return false;
        }

        s.pending_load = true;
        info!(target: "gamestate", "loading '{name}' scheduled");
        true
    }

    pub fn unload(&mut self, name: &str) -> bool {
        let Some(e) = self.find_mut(name) else {
            unknown(name, "unload");
            return false;
        };
        let s = &mut e.status;

        if s.pending_load {
            s.pending_load = false;
            info!(target: "gamestate", "loading '{name}' canceled");
            return true;
        }
        if !s.loaded {
            warn!(target: "gamestate", "'{name}' is not loaded");
            return false;
        }
        if s.pending_unload {
            return false;
        }

        if s.started {
            s.pending_stop = true;
        }
        s.pending_unload = true;
        info!(target: "gamestate", "unloading '{name}' scheduled");
        true
    }

    pub fn start(&mut self, name: &str) -> bool {
        let Some(e) = self.find_mut(name) else {
            unknown(name, "start");
            return false;
        };
        let s = &mut e.status;

        if s.started && !s.pending_stop {
            warn!(target: "gamestate", "'{name}' is already started");
            return false;
        }
        if s.pending_start {
            return false;
        }

        s.pending_start = true;
        info!(target: "gamestate", "starting '{name}' scheduled");
        true
    }

    pub fn stop(&mut self, name: &str) -> bool {
        let Some(e) = self.find_mut(name) else {
            unknown(name, "stop");
            return false;
        };
        let s = &mut e.status;

        if s.pending_start {
            s.pending_start = false;
            info!(target: "gamestate", "starting '{name}' canceled");
            return true;
        }
        if !s.started {
            warn!(target: "gamestate", "'{name}' is not started");
            return false;
        }
        if s.pending_stop {
            return false;
        }

        s.pending_stop = true;
        info!(target: "gamestate", "stopping '{name}' scheduled");
        true
    }

    /// Pause immediately and notify the module.
    ///
    /// Pausing a gamestate that is only frozen turns the freeze into an explicit pause,
    /// so unfreezing leaves it paused.
    pub fn pause(&mut self, name: &str, ctx: &mut GamestateCtx<'_>) -> bool {
        let Some(e) = self.find_mut(name) else {
            unknown(name, "pause");
            return false;
        };

        if !e.status.started {
            warn!(target: "gamestate", "cannot pause '{name}': not started");
            return false;
        }
        if e.status.frozen {
            e.status.frozen = false;
            info!(target: "gamestate", "'{name}' paused (was frozen)");
            return true;
        }
        if e.status.paused {
            debug!(target: "gamestate", "'{name}' is already paused");
            return false;
        }

        e.status.paused = true;
        info!(target: "gamestate", "'{name}' paused");
        if let Some(module) = e.module.as_mut() {
            log_failure(name, GamestateStage::Pause, module.pause(ctx));
        }
        true
    }

    /// Resume immediately and notify the module.
    ///
    /// While a freeze is active the gamestate is handed over to the freeze instead and
    /// resumes on unfreeze.
    pub fn resume(&mut self, name: &str, ctx: &mut GamestateCtx<'_>) -> bool {
        let freeze_active = self.freeze_active;
        let Some(e) = self.find_mut(name) else {
            unknown(name, "resume");
            return false;
        };

        if !e.status.started || !e.status.paused {
            warn!(target: "gamestate", "cannot resume '{name}': not paused");
            return false;
        }
        if e.status.frozen {
            debug!(target: "gamestate", "'{name}' is frozen, resumes on unfreeze");
            return false;
        }
        if freeze_active {
            e.status.frozen = true;
            info!(target: "gamestate", "'{name}' resumes on unfreeze");
            return true;
        }

        e.status.paused = false;
        info!(target: "gamestate", "'{name}' resumed");
        if let Some(module) = e.module.as_mut() {
            log_failure(name, GamestateStage::Resume, module.resume(ctx));
        }
        true
    }

    /// Tear `current` down and bring `next` up, both deferred to the next apply pass.
    pub fn switch(&mut self, current: &str, next: &str) -> bool {
        info!(target: "gamestate", "switching '{current}' -> '{next}'");
        let mut changed = self.stop(current);
        changed |= self.unload(current);
        changed |= self.load(next);
        changed |= self.start(next);
        changed
    }

    /// Schedule a stop and unload of every loaded gamestate.
    pub fn unload_all(&mut self) -> usize {
        let loaded: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.status.loaded || e.status.pending_load)
            .map(|e| e.name.clone())
            .collect();

        let mut n = 0;
        for name in loaded {
            if self.unload(&name) {
                n += 1;
            }
        }
        n
    }

    pub fn set_show_loading(&mut self, name: &str, show: bool) -> bool {
        let Some(e) = self.find_mut(name) else {
            unknown(name, "configure");
            return false;
        };
        e.status.show_loading = show;
        true
    }

    /// Apply a request queued through a [`GamestateCtx`].
    pub fn apply_request(&mut self, request: Request, ctx: &mut GamestateCtx<'_>) -> bool {
        match request {
            Request::Load(name) => self.load(&name),
            Request::Unload(name) => self.unload(&name),
            Request::Start(name) => self.start(&name),
            Request::Stop(name) => self.stop(&name),
            Request::Pause(name) => self.pause(&name, ctx),
            Request::Resume(name) => self.resume(&name, ctx),
            Request::Switch { current, next } => self.switch(&current, &next),
            Request::UnloadAll => self.unload_all() > 0,
        }
    }

    // ------------------------------------------------------------------
    // freeze

    /// Pause every running gamestate, remembering which ones this call paused.
    pub fn freeze_all(&mut self, ctx: &mut GamestateCtx<'_>) -> usize {
        if self.freeze_active {
            return 0;
        }
        self.freeze_active = true;

        let mut n = 0;
        for e in self.entries.iter_mut() {
            if !e.status.started || e.status.paused {
                continue;
            }
            e.status.frozen = true;
            e.status.paused = true;
            if let Some(module) = e.module.as_mut() {
                log_failure(&e.name, GamestateStage::Pause, module.pause(ctx));
            }
            n += 1;
        }
        info!(target: "gamestate", "froze {n} gamestate(s)");
        n
    }

    /// Resume exactly the gamestates frozen by [`GamestateManager::freeze_all`].
    pub fn unfreeze_all(&mut self, ctx: &mut GamestateCtx<'_>) -> usize {
        self.freeze_active = false;

        let mut n = 0;
        for e in self.entries.iter_mut() {
            if !e.status.frozen {
                continue;
            }
            e.status.frozen = false;
            e.status.paused = false;
            if let Some(module) = e.module.as_mut() {
                log_failure(&e.name, GamestateStage::Resume, module.resume(ctx));
            }
            n += 1;
        }
        if n > 0 {
            info!(target: "gamestate", "unfroze {n} gamestate(s)");
        }
        n
    }

    // ------------------------------------------------------------------
    // batch apply

    /// Turn pending flags into module calls: stops, unloads, loads, then starts.
    pub fn apply_pending(&mut self, ctx: &mut GamestateCtx<'_>) -> ApplyReport {
        let mut report = ApplyReport::default();
        if !self.has_pending() {
            return report;
        }

        self.apply_stops(ctx, &mut report);
        self.apply_unloads(ctx, &mut report);
        self.apply_loads(ctx, &mut report);
        self.apply_starts(ctx, &mut report);

        report
    }

    fn apply_stops(&mut self, ctx: &mut GamestateCtx<'_>, report: &mut ApplyReport) {
        for e in self.entries.iter_mut() {
            if !e.status.pending_stop {
                continue;
            }
            e.status.pending_stop = false;
            if !e.status.started {
                continue;
            }

            if let Some(module) = e.module.as_mut() {
                log_failure(&e.name, GamestateStage::Stop, module.stop(ctx));
            }
            e.status.started = false;
            e.status.paused = false;
            e.status.frozen = false;

            info!(target: "gamestate", "'{}' stopped", e.name);
            report.stopped.push(e.name.clone());
        }
    }

    fn apply_unloads(&mut self, ctx: &mut GamestateCtx<'_>, report: &mut ApplyReport) {
        for e in self.entries.iter_mut() {
            if !e.status.pending_unload {
                continue;
            }
            e.status.pending_unload = false;
            if !e.status.loaded {
                continue;
            }

            if let Some(mut module) = e.module.take() {
                log_failure(&e.name, GamestateStage::Unload, module.unload(ctx));
            }
            e.status.loaded = false;

            info!(target: "gamestate", "'{}' unloaded", e.name);
            report.unloaded.push(e.name.clone());
        }
    }

    fn apply_loads(&mut self, ctx: &mut GamestateCtx<'_>, report: &mut ApplyReport) {
        for e in self.entries.iter_mut() {
            if !e.status.pending_load {
                continue;
            }
            e.status.pending_load = false;

            if e.module.is_none() {
                let Some(factory) = self.factories.get_mut(&e.name) else {
                    error!(target: "gamestate", "{}", EngineError::Resolve(e.name.clone()));
                    e.clear_pending();
                    report.failed.push(e.name.clone());
                    continue;
                };
                e.module = Some(factory());
            }
            let Some(module) = e.module.as_mut() else {
                continue;
            };

            let t0 = Instant::now();
            let name = e.name.as_str();
            let steps = module.progress_count().max(1);
            let mut screen = if e.status.show_loading {
                self.loading.as_deref_mut()
            } else {
                None
            };

            if let Some(s) = screen.as_mut() {
                s.begin(name);
            }

            let mut done = 0usize;
            let result = {
                let mut progress = || {
                    done += 1;
                    if let Some(s) = screen.as_mut() {
                        s.progress(name, (done as f32 / steps as f32).min(1.0));
                    }
                };
                module.load(ctx, &mut progress)
            };

            if let Some(s) = screen.as_mut() {
                s.progress(name, 1.0);
                s.end(name);
            }

            if !log_failure(name, GamestateStage::Load, result) {
                e.module = None;
                e.clear_pending();
                report.failed.push(e.name.clone());
                continue;
            }

            if done != module.progress_count() {
                debug!(
                    target: "gamestate",
                    "'{name}' reported {done} progress step(s), declared {}",
                    module.progress_count()
                );
            }

            e.status.loaded = true;
            info!(target: "gamestate", "'{name}' loaded in {:.3} s", t0.elapsed().as_secs_f32());
            report.loaded.push(e.name.clone());
        }
    }

    fn apply_starts(&mut self, ctx: &mut GamestateCtx<'_>, report: &mut ApplyReport) {
        for e in self.entries.iter_mut() {
            if !e.status.pending_start || !e.status.loaded {
                continue;
            }
            e.status.pending_start = false;

            let Some(module) = e.module.as_mut() else {
                continue;
            };
            if !log_failure(&e.name, GamestateStage::Start, module.start(ctx)) {
                report.failed.push(e.name.clone());
                continue;
            }
            e.status.started = true;

            info!(target: "gamestate", "'{}' started", e.name);
            report.started.push(e.name.clone());
        }
    }

    // ------------------------------------------------------------------
    // dispatch

    fn for_each_module<F>(&mut self, stage: GamestateStage, include_paused: bool, mut call: F)
    where
        F: FnMut(&mut dyn Gamestate) -> EngineResult<()>,
    {
        for e in self.entries.iter_mut() {
            if !e.status.started || (e.status.paused && !include_paused) {
                continue;
            }
            if let Some(module) = e.module.as_mut() {
                log_failure(&e.name, stage, call(module.as_mut()));
            }
        }
    }

    /// Logic for every started, unpaused gamestate.
    pub fn logic_all(&mut self, ctx: &mut GamestateCtx<'_>, delta: Duration) {
        self.for_each_module(GamestateStage::Logic, false, |m| m.logic(ctx, delta));
    }

    /// Draw for every started gamestate, paused ones included.
    pub fn draw_all(&mut self, ctx: &mut GamestateCtx<'_>) {
        self.for_each_module(GamestateStage::Draw, true, |m| m.draw(ctx));
    }

    /// Forward an event to every started, unpaused gamestate.
    pub fn event_all(&mut self, ctx: &mut GamestateCtx<'_>, event: &EngineEvent) {
        self.for_each_module(GamestateStage::Event, false, |m| {
            m.process_event(ctx, event)
        });
    }

    /// Call `reload` on every loaded gamestate.
    pub fn reload_all(&mut self, ctx: &mut GamestateCtx<'_>) {
        for e in self.entries.iter_mut() {
            if !e.status.loaded {
                continue;
            }
            if let Some(module) = e.module.as_mut() {
                log_failure(&e.name, GamestateStage::Reload, module.reload(ctx));
            }
        }
    }

    /// Stop and unload everything immediately, then forget all entries.
    pub fn shutdown(&mut self, ctx: &mut GamestateCtx<'_>) {
        for e in self.entries.iter_mut() {
            if e.status.started {
                if let Some(module) = e.module.as_mut() {
                    log_failure(&e.name, GamestateStage::Stop, module.stop(ctx));
                }
                e.status.started = false;
            }
        }
        for e in self.entries.iter_mut() {
            if e.status.loaded {
                if let Some(mut module) = e.module.take() {
                    log_failure(&e.name, GamestateStage::Unload, module.unload(ctx));
                }
                e.status.loaded = false;
            }
        }
        if !self.entries.is_empty() {
            info!(target: "gamestate", "released {} gamestate(s)", self.entries.len());
        }
        self.entries.clear();
        self.freeze_active = false;
    }
}

impl Default for GamestateManager {
    fn default() -> Self {
        Self::new()
    }
}
