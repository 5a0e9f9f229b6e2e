use std::sync::{Condvar, Mutex};

use crate::{Phase, SmResult};

struct Inner {
    phase: Phase,
    /// Non-barrier in-flight count. Zero whenever `phase` is one of
    /// `Created`, `Opening`, `OpenedBarrier`, `Closing`.
    count: u32,
}

/// A lifecycle coordinator for a single resource instance.
///
/// `Sm` arbitrates four begin/end operation pairs — open, close, exec
/// and barrier — across the phases in [`Phase`]. The phase and
/// in-flight count live behind one `Mutex`, and draining waits on a
/// `Condvar`; every `*_begin` call that can grant does so under the
/// same lock that guards the count, so there is no lost-wakeup window
/// between checking the count and waiting on it.
pub struct Sm {
    name: Option<String>,
    state: Mutex<Inner>,
    drained: Condvar,
}

impl Sm {
    /// Creates a new instance in the `Created` phase.
    pub fn new(name: Option<impl Into<String>>) -> Self {
        Self {
            name: name.map(Into::into),
            state: Mutex::new(Inner {
                phase: Phase::Created,
                count: 0,
            }),
            drained: Condvar::new(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the current phase. For diagnostics/tests only — the
    /// phase can change the instant this returns.
    pub fn phase(&self) -> Phase {
        self.state.lock().unwrap().phase
    }

    pub fn open_begin(&self) -> SmResult {
        let mut inner = self.state.lock().unwrap();
        if inner.phase == Phase::Created {
            inner.phase = Phase::Opening;
            log::trace!("sm[{:?}]: open_begin granted, Created -> Opening", self.name);
            SmResult::Granted
        } else {
            log::trace!("sm[{:?}]: open_begin refused in phase {:?}", self.name, inner.phase);
            SmResult::Refused
        }
    }

    pub fn open_end(&self, success: bool) {
        let mut inner = self.state.lock().unwrap();
        debug_assert_eq!(
            inner.phase,
            Phase::Opening,
            "open_end called outside the Opening phase"
        );
        if inner.phase != Phase::Opening {
            log::error!("sm[{:?}]: open_end called outside Opening phase, ignoring", self.name);
            return;
        }
        inner.phase = if success { Phase::Opened } else { Phase::Created };
        inner.count = 0;
    }

    pub fn exec_begin(&self) -> SmResult {
        let mut inner = self.state.lock().unwrap();
        if inner.phase == Phase::Opened {
            inner.count += 1;
            SmResult::Granted
        } else {
            SmResult::Refused
        }
    }

    pub fn exec_end(&self) {
        let mut inner = self.state.lock().unwrap();
        debug_assert!(inner.count > 0, "exec_end called without a matching exec_begin");
        if inner.count == 0 {
            log::error!("sm[{:?}]: exec_end called with no in-flight execs, ignoring", self.name);
            return;
        }
        inner.count -= 1;
        let draining = matches!(
            inner.phase,
            Phase::OpenedDrainingToBarrier | Phase::OpenedDrainingToClose
        );
        if inner.count == 0 && draining {
            drop(inner);
            self.drained.notify_all();
        }
    }

    /// Triggers a drain and blocks until it completes or is preempted.
    ///
    /// A `close_begin` that arrives while a barrier is draining
    /// preempts it: the phase switches to `OpenedDrainingToClose` and
    /// the original barrier caller wakes up, observes the phase is no
    /// longer its own, and returns `Refused`. Close never loses to a
    /// pending barrier.
    pub fn close_begin(&self) -> SmResult {
        let mut inner = self.state.lock().unwrap();
        match inner.phase {
            Phase::Opened => {
                inner.phase = Phase::OpenedDrainingToClose;
            }
            Phase::OpenedDrainingToBarrier => {
                inner.phase = Phase::OpenedDrainingToClose;
                drop(inner);
                self.drained.notify_all();
                inner = self.state.lock().unwrap();
            }
            Phase::OpenedBarrier => {
                // count is already zero by construction of this phase.
                inner.phase = Phase::Closing;
                return SmResult::Granted;
            }
            _ => return SmResult::Refused,
        }

        while inner.count != 0 {
            debug_assert_eq!(inner.phase, Phase::OpenedDrainingToClose);
            inner = self.drained.wait(inner).unwrap();
        }
        inner.phase = Phase::Closing;
        SmResult::Granted
    }

    pub fn close_end(&self) {
        let mut inner = self.state.lock().unwrap();
        debug_assert_eq!(inner.phase, Phase::Closing, "close_end called outside the Closing phase");
        if inner.phase != Phase::Closing {
            log::error!("sm[{:?}]: close_end called outside Closing phase, ignoring", self.name);
            return;
        }
        inner.phase = Phase::Created;
        inner.count = 0;
    }

    /// Triggers a drain and blocks until it completes or is preempted
    /// by a concurrent `close_begin`.
    pub fn barrier_begin(&self) -> SmResult {
        let mut inner = self.state.lock().unwrap();
        if inner.phase != Phase::Opened {
            return SmResult::Refused;
        }
        inner.phase = Phase::OpenedDrainingToBarrier;

        while inner.phase == Phase::OpenedDrainingToBarrier && inner.count != 0 {
            inner = self.drained.wait(inner).unwrap();
        }

        if inner.phase != Phase::OpenedDrainingToBarrier {
            // Preempted by a concurrent close_begin.
            log::debug!("sm[{:?}]: barrier_begin preempted by a pending close", self.name);
            return SmResult::Refused;
        }
        inner.phase = Phase::OpenedBarrier;
        SmResult::Granted
    }

    pub fn barrier_end(&self) {
        let mut inner = self.state.lock().unwrap();
        debug_assert_eq!(
            inner.phase,
            Phase::OpenedBarrier,
            "barrier_end called outside the OpenedBarrier phase"
        );
        if inner.phase != Phase::OpenedBarrier {
            log::error!("sm[{:?}]: barrier_end called outside OpenedBarrier phase, ignoring", self.name);
            return;
        }
        inner.phase = Phase::Opened;
        // Waking here is unnecessary for correctness (only exec_end's
        // count transitions unblock drains) but costs nothing and
        // matches the teacher's "wake broadly, let waiters re-check"
        // discipline in ambiguous spurious-wakeup territory.
        self.drained.notify_all();
    }
}

impl Drop for Sm {
    fn drop(&mut self) {
        let inner = self.state.lock().unwrap();
        debug_assert!(
            matches!(inner.phase, Phase::Created | Phase::Opened),
            "Sm[{:?}] dropped while in phase {:?}",
            self.name,
            inner.phase
        );
    }
}
