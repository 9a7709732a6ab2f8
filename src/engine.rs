use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use smallvec::SmallVec;
use tracing::{debug, error, trace, warn};

use crate::emitter::Emitter;
use crate::error::{MonitorError, Result};
use crate::group::Members;
use crate::key::Signal;
use crate::options::{MonitorOptions, Settings};
use crate::scheduler::{Scheduler, Task};
use crate::state::{DebounceState, Verdict, normalize};
use crate::traits::ValueSource;
use crate::types::{Diagnostic, Evaluation, Handle, SignalOutcome, TargetId, UnitId};

const DEFAULT_DIAGNOSTICS_CAPACITY: usize = 64;

struct Unit {
    handle: Handle,
    settings: Settings,
    members: Members,
    state: DebounceState,
    emitter: Emitter,
}

/// Registry of monitoring units and the clock that drives their timers.
///
/// All work happens inside `&mut self` calls made by the host: signals via
/// [`handle_signal`](Engine::handle_signal), time via
/// [`advance`](Engine::advance). The host owns the text and lends it through
/// a [`ValueSource`] on every call that may read it.
pub struct Engine {
    units: HashMap<UnitId, Unit>,
    targets: HashMap<TargetId, UnitId>,
    handles: HashMap<Handle, SmallVec<[UnitId; 4]>>,
    scheduler: Scheduler,
    diagnostics: VecDeque<Diagnostic>,
    diagnostics_capacity: usize,
    next_unit: u64,
    next_handle: u64,
}

/// Read-only view of one unit, for hosts and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSnapshot {
    pub unit: UnitId,
    pub grouped: bool,
    pub members: Vec<TargetId>,
    pub dirty: bool,
    pub last_notified: Option<String>,
    pub last_changed: Option<TargetId>,
    /// Due time of the pending debounce timer.
    pub timer_due: Option<Duration>,
    pub evaluations: u64,
    pub notifications: u64,
}

pub struct EngineBuilder {
    start: Duration,
    diagnostics_capacity: usize,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            start: Duration::ZERO,
            diagnostics_capacity: DEFAULT_DIAGNOSTICS_CAPACITY,
        }
    }
}

impl EngineBuilder {
    /// Initial reading of the virtual clock.
    pub fn start_at(mut self, start: Duration) -> Self {
        self.start = start;
        self
    }

    /// Diagnostics kept before the oldest are dropped. Zero keeps none.
    pub fn diagnostics_capacity(mut self, capacity: usize) -> Self {
        self.diagnostics_capacity = capacity;
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            units: HashMap::new(),
            targets: HashMap::new(),
            handles: HashMap::new(),
            scheduler: Scheduler::starting_at(self.start),
            diagnostics: VecDeque::new(),
            diagnostics_capacity: self.diagnostics_capacity,
            next_unit: 0,
            next_handle: 0,
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        EngineBuilder::default().build()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Start monitoring `targets`.
    ///
    /// Creates one shared unit when `monitor_as_group` is set, otherwise one
    /// unit per target, and arms each unit's timer. Initial values are read
    /// from `source` for `trigger_on_init`.
    ///
    /// # Errors
    ///
    /// Nothing is bound when an error is returned.
    /// - [`MonitorError::NoTargets`] for an empty target list.
    /// - [`MonitorError::DuplicateTarget`] when a target is listed twice.
    /// - [`MonitorError::AlreadyMonitored`] when a target already has live
    ///   state; detach it first.
    pub fn attach<S, I>(&mut self, source: &S, targets: I, options: MonitorOptions) -> Result<Handle>
    where
        S: ValueSource + ?Sized,
        I: IntoIterator<Item = TargetId>,
    {
        let targets: Vec<TargetId> = targets.into_iter().collect();
        if targets.is_empty() {
            return Err(MonitorError::NoTargets);
        }
        let mut seen = HashSet::with_capacity(targets.len());
        for &target in &targets {
            if !seen.insert(target) {
                return Err(MonitorError::DuplicateTarget(target));
            }
            if self.targets.contains_key(&target) {
                warn!(%target, "attach refused, target is already monitored");
                return Err(MonitorError::AlreadyMonitored(target));
            }
        }

        let handle = Handle(self.next_handle);
        self.next_handle += 1;

        let MonitorOptions {
            settings,
            on_value_changed,
        } = options;
        let emitter = Emitter::new(on_value_changed);

        let groups: Vec<Members> = if settings.monitor_as_group {
            vec![Members::group(&targets)]
        } else {
            targets.iter().copied().map(Members::single).collect()
        };

        let mut ids = SmallVec::new();
        for members in groups {
            let id = UnitId(self.next_unit);
            self.next_unit += 1;

            let mut unit = Unit {
                handle,
                state: members.initial_state(source, &settings),
                settings: settings.clone(),
                members,
                emitter: emitter.clone(),
            };
            self.scheduler
                .arm(id, &mut unit.state, unit.settings.frequency);

            for target in unit.members.iter() {
                self.targets.insert(target, id);
            }
            debug!(
                unit = %id,
                members = unit.members.iter().count(),
                grouped = unit.members.is_grouped(),
                dirty = unit.state.dirty,
                "unit attached"
            );
            self.units.insert(id, unit);
            ids.push(id);
        }
        self.handles.insert(handle, ids);
        Ok(handle)
    }

    /// Stop monitoring everything created by `handle`.
    ///
    /// Returns whether anything was still attached; detaching twice is a no-op.
    pub fn detach(&mut self, handle: Handle) -> bool {
        let Some(ids) = self.handles.remove(&handle) else {
            return false;
        };
        let mut any = false;
        for id in ids {
            any |= self.remove_unit(id);
        }
        any
    }

    /// Stop monitoring the unit that owns `target`. For a group this
    /// detaches every member.
    pub fn detach_target(&mut self, target: TargetId) -> bool {
        match self.targets.get(&target) {
            Some(&id) => self.remove_unit(id),
            None => false,
        }
    }

    pub fn is_monitored(&self, target: TargetId) -> bool {
        self.targets.contains_key(&target)
    }

    fn remove_unit(&mut self, id: UnitId) -> bool {
        let Some(mut unit) = self.units.remove(&id) else {
            return false;
        };
        self.scheduler.cancel(&mut unit.state);
        self.scheduler.forget(id);
        for target in unit.members.iter() {
            self.targets.remove(&target);
        }
        if let Some(ids) = self.handles.get_mut(&unit.handle) {
            ids.retain(|u| *u != id);
            if ids.is_empty() {
                self.handles.remove(&unit.handle);
            }
        }
        debug!(unit = %id, "unit detached");
        true
    }

    // ---------------------------------------------------------------------
    // Signals
    // ---------------------------------------------------------------------

    /// Deliver a host signal for `target`.
    ///
    /// Every signal marks the unit dirty, records `target` as the latest
    /// sender and restarts the quiet period. Trigger keys and commits then
    /// evaluate immediately; a paste queues an evaluation for the next turn
    /// because the pasted text is not readable yet.
    pub fn handle_signal<S>(&mut self, source: &S, target: TargetId, signal: Signal) -> SignalOutcome
    where
        S: ValueSource + ?Sized,
    {
        let Some(&id) = self.targets.get(&target) else {
            trace!(%target, ?signal, "signal for unmonitored target ignored");
            return SignalOutcome::Ignored;
        };
        let Some(unit) = self.units.get_mut(&id) else {
            return SignalOutcome::Ignored;
        };

        unit.state.mark(target);

        let evaluate_now = match signal {
            Signal::Key(ev) => unit.settings.triggers_on(ev.code),
            Signal::Commit => true,
            Signal::Paste => {
                self.scheduler
                    .arm(id, &mut unit.state, unit.settings.frequency);
                if !unit.settings.paste_triggers {
                    return SignalOutcome::Marked;
                }
                self.scheduler.defer(id, target);
                return SignalOutcome::Deferred;
            }
        };

        if evaluate_now {
            SignalOutcome::Evaluated(self.evaluate(source, id, Some(target)))
        } else {
            self.scheduler
                .arm(id, &mut unit.state, unit.settings.frequency);
            SignalOutcome::Marked
        }
    }

    /// Decide whether the unit settles, notify if so, and re-arm its timer.
    fn evaluate<S>(&mut self, source: &S, id: UnitId, triggering: Option<TargetId>) -> Evaluation
    where
        S: ValueSource + ?Sized,
    {
        let Some(unit) = self.units.get_mut(&id) else {
            return Evaluation::Detached;
        };

        let Some(target) = unit.members.authority(&unit.state, triggering) else {
            trace!(unit = %id, "nothing changed since attach");
            self.scheduler
                .arm(id, &mut unit.state, unit.settings.frequency);
            return Evaluation::NoSource;
        };

        let Some(raw) = source.current_value(target) else {
            warn!(unit = %id, %target, "target vanished, detaching unit");
            self.remove_unit(id);
            self.report(Diagnostic::StaleTarget { unit: id, target });
            return Evaluation::Detached;
        };
        let value = normalize(&raw);

        let verdict = unit.state.settle(value, &unit.settings);
        let fault = match verdict {
            Verdict::Notify => {
                debug!(unit = %id, %target, value, "value settled");
                unit.emitter.emit(value, target).err()
            }
            Verdict::Unchanged | Verdict::Empty => {
                trace!(unit = %id, %target, ?verdict, "evaluation skipped");
                None
            }
        };
        self.scheduler
            .arm(id, &mut unit.state, unit.settings.frequency);

        if let Some(message) = fault {
            error!(unit = %id, %target, error = %message, "value callback failed");
            self.report(Diagnostic::CallbackFailed {
                target,
                value: value.to_string(),
                message,
            });
        }

        match verdict {
            Verdict::Notify => Evaluation::Notified,
            Verdict::Unchanged => Evaluation::Unchanged,
            Verdict::Empty => Evaluation::Empty,
        }
    }

    // ---------------------------------------------------------------------
    // Clock
    // ---------------------------------------------------------------------

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// When the next queued task is due, so a real event loop can sleep
    /// until then.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    /// Run every task due by `now + by`, then leave the clock there.
    /// Returns the number of notifications fired.
    pub fn advance<S>(&mut self, source: &S, by: Duration) -> usize
    where
        S: ValueSource + ?Sized,
    {
        let until = self.now().saturating_add(by);
        self.advance_to(source, until)
    }

    /// Run every task due at or before `until`, in due order.
    pub fn advance_to<S>(&mut self, source: &S, until: Duration) -> usize
    where
        S: ValueSource + ?Sized,
    {
        let mut notified = 0;
        while let Some((timer, task)) = self.scheduler.pop_due(until) {
            let outcome = match task {
                Task::Tick(id) => {
                    let Some(unit) = self.units.get_mut(&id) else {
                        continue;
                    };
                    if unit.state.pending_timer == Some(timer) {
                        unit.state.pending_timer = None;
                    }
                    self.evaluate(source, id, None)
                }
                Task::Deferred(id, target) => self.evaluate(source, id, Some(target)),
            };
            if outcome == Evaluation::Notified {
                notified += 1;
            }
        }
        self.scheduler.settle_clock(until);
        notified
    }

    /// Run the deferred work queued for the current instant.
    pub fn run_pending<S>(&mut self, source: &S) -> usize
    where
        S: ValueSource + ?Sized,
    {
        self.advance_to(source, self.now())
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn snapshot(&self, target: TargetId) -> Option<UnitSnapshot> {
        let id = *self.targets.get(&target)?;
        let unit = self.units.get(&id)?;
        Some(UnitSnapshot {
            unit: id,
            grouped: unit.members.is_grouped(),
            members: unit.members.iter().collect(),
            dirty: unit.state.dirty,
            last_notified: unit.state.last_notified.clone(),
            last_changed: unit.state.last_changed,
            timer_due: unit.state.pending_timer.map(|t| t.at),
            evaluations: unit.state.evaluations,
            notifications: unit.state.notifications,
        })
    }

    /// Number of live units.
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Queued timers and deferred evaluations across all units.
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    /// Queued timers and deferred evaluations of the unit owning `target`.
    pub fn pending_tasks_for(&self, target: TargetId) -> usize {
        self.targets
            .get(&target)
            .map_or(0, |&id| self.scheduler.pending_for(id))
    }

    /// Drain the diagnostics recorded since the last call.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.drain(..).collect()
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        if self.diagnostics_capacity == 0 {
            return;
        }
        if self.diagnostics.len() == self.diagnostics_capacity {
            self.diagnostics.pop_front();
        }
        self.diagnostics.push_back(diagnostic);
    }
}
