//! Thread-safe record aggregators. \
//! The deciders optionally report notable values of their detections (the S and P values of a
//! translated cycler, the increment size of a bouncer, the deepest closed backward search).
//! The aggregators are shared between the workers of a run and only updated on strict
//! improvement, so the lock is rarely contended.

use std::sync::Mutex;

use crate::config::{IdBig, StepTypeSmall};

/// Maxima of the S and P values of translated-cycler detections. \
/// S is the pre-period (steps until the first of the two equivalent records, plus one),
/// P the period between them.
#[derive(Debug, Default)]
pub struct TranslatedCyclerRecords {
    inner: Mutex<TranslatedCyclerRecordsInner>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TranslatedCyclerRecordsInner {
    pub max_value_s: StepTypeSmall,
    pub champion_s_id: IdBig,
    pub max_value_p: StepTypeSmall,
    pub champion_p_id: IdBig,
}

impl TranslatedCyclerRecords {
    /// Offers a detection, keeps it only on strict improvement.
    pub fn note(&self, value_s: StepTypeSmall, value_p: StepTypeSmall, machine_id: IdBig) {
        let mut inner = self.inner.lock().unwrap();
        if value_s > inner.max_value_s {
            inner.max_value_s = value_s;
            inner.champion_s_id = machine_id;
        }
        if value_p > inner.max_value_p {
            inner.max_value_p = value_p;
            inner.champion_p_id = machine_id;
        }
    }

    pub fn snapshot(&self) -> TranslatedCyclerRecordsInner {
        *self.inner.lock().unwrap()
    }
}

/// Maxima of the bouncer detections: increment size, detection time and detection space.
#[derive(Debug, Default)]
pub struct BouncerRecords {
    inner: Mutex<BouncerRecordsInner>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BouncerRecordsInner {
    pub max_increment_size: usize,
    pub champion_increment_id: IdBig,
    pub max_detection_time: StepTypeSmall,
    pub champion_time_id: IdBig,
    pub max_detection_space: usize,
    pub champion_space_id: IdBig,
}

impl BouncerRecords {
    pub fn note(
        &self,
        increment_size: usize,
        detection_time: StepTypeSmall,
        detection_space: usize,
        machine_id: IdBig,
    ) {
        let mut inner = self.inner.lock().unwrap();
        if increment_size > inner.max_increment_size {
            inner.max_increment_size = increment_size;
            inner.champion_increment_id = machine_id;
        }
        if detection_time > inner.max_detection_time {
            inner.max_detection_time = detection_time;
            inner.champion_time_id = machine_id;
        }
        if detection_space > inner.max_detection_space {
            inner.max_detection_space = detection_space;
            inner.champion_space_id = machine_id;
        }
    }

    pub fn snapshot(&self) -> BouncerRecordsInner {
        *self.inner.lock().unwrap()
    }
}

/// Deepest closed backward-reasoning search.
#[derive(Debug, Default)]
pub struct BackwardRecords {
    inner: Mutex<BackwardRecordsInner>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct BackwardRecordsInner {
    pub max_closed_depth: usize,
    pub champion_id: IdBig,
}

impl BackwardRecords {
    pub fn note(&self, closed_depth: usize, machine_id: IdBig) {
        let mut inner = self.inner.lock().unwrap();
        if closed_depth > inner.max_closed_depth {
            inner.max_closed_depth = closed_depth;
            inner.champion_id = machine_id;
        }
    }

    pub fn snapshot(&self) -> BackwardRecordsInner {
        *self.inner.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn records_update_on_strict_improvement_only() {
        let records = TranslatedCyclerRecords::default();
        records.note(10, 5, 1);
        records.note(10, 8, 2);
        let snap = records.snapshot();
        // S did not improve, P did
        assert_eq!(10, snap.max_value_s);
        assert_eq!(1, snap.champion_s_id);
        assert_eq!(8, snap.max_value_p);
        assert_eq!(2, snap.champion_p_id);
    }
}
