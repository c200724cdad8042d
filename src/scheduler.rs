use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    Countdown,
    Snapshot,
}

#[derive(Debug, Clone)]
struct Slot {
    task: Task,
    period: Duration,
    accumulated: Duration,
    armed: bool,
}

/// Periodic tasks advanced by elapsed wall time instead of owning a clock.
///
/// The caller feeds in whatever time has passed since its last call and gets
/// back each task that came due, once per elapsed period and in arming order.
/// Cancelling a task drops its accumulated time, so a disarmed task can never
/// fire late.
#[derive(Debug, Clone)]
pub struct Scheduler {
    slots: Vec<Slot>,
}

impl Scheduler {
    pub fn new(countdown: Duration, snapshot: Duration) -> Self {
        let slot = |task, period| Slot {
            task,
            period,
            accumulated: Duration::ZERO,
            armed: false,
        };
        Self {
            slots: vec![slot(Task::Countdown, countdown), slot(Task::Snapshot, snapshot)],
        }
    }

    pub fn arm(&mut self, task: Task) {
        if let Some(slot) = self.slot_mut(task) {
            if !slot.armed {
                slot.armed = true;
                slot.accumulated = Duration::ZERO;
                tracing::debug!(?task, "task armed");
            }
        }
    }

    pub fn cancel(&mut self, task: Task) {
        if let Some(slot) = self.slot_mut(task) {
            if slot.armed {
                tracing::debug!(?task, "task cancelled");
            }
            slot.armed = false;
            slot.accumulated = Duration::ZERO;
        }
    }

    pub fn cancel_all(&mut self) {
        for task in [Task::Countdown, Task::Snapshot] {
            self.cancel(task);
        }
    }

    pub fn is_armed(&self, task: Task) -> bool {
        self.slots.iter().any(|s| s.task == task && s.armed)
    }

    pub fn advance(&mut self, elapsed: Duration) -> Vec<Task> {
        let mut due = Vec::new();
        for slot in self.slots.iter_mut().filter(|s| s.armed) {
            if slot.period.is_zero() {
                continue;
            }
            slot.accumulated += elapsed;
            while slot.accumulated >= slot.period {
                slot.accumulated -= slot.period;
                due.push(slot.task);
            }
        }
        due
    }

    fn slot_mut(&mut self, task: Task) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|s| s.task == task)
    }
}
