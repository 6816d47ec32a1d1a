use bevy_math::Vec3;
use bevy_time::{Timer, TimerMode};
use std::time::Duration;

use crate::pool::{Pool, PoolStats, Recycle};

// ============================================================================
// Trail Visuals
// ============================================================================

// Polyline of committed positions; presentation layers draw it and fade it out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrailVisual {
    pub points: Vec<Vec3>,
}

impl TrailVisual {
    pub fn push(&mut self, point: Vec3) {
        self.points.push(point);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Recycle for TrailVisual {
    fn recycle(&mut self) {
        self.points.clear();
    }
}

// ============================================================================
// Deferred Return
// ============================================================================

struct PendingReturn {
    trail: TrailVisual,
    timer: Timer,
}

/// Trail pool plus the queue of trails still on display after their projectile died.
pub struct TrailPool {
    pool: Pool<TrailVisual>,
    pending: Vec<PendingReturn>,
    display_seconds: f32,
    returned: u64,
}

impl TrailPool {
    #[must_use]
    pub fn new(capacity: usize, display_seconds: f32) -> Self {
        Self {
            pool: Pool::new(capacity),
            pending: Vec::new(),
            display_seconds,
            returned: 0,
        }
    }

    pub fn acquire(&mut self, start: Vec3) -> TrailVisual {
        let mut trail = self.pool.acquire();
        trail.push(start);
        trail
    }

    // The trail keeps displaying until its timer runs out.
    pub fn schedule_return(&mut self, trail: TrailVisual) {
        self.pending.push(PendingReturn {
            trail,
            timer: Timer::from_seconds(self.display_seconds, TimerMode::Once),
        });
    }

    /// Advance every pending timer by `delta` and return finished trails to the pool.
    /// Returns how many trails went back this call.
    pub fn process_returns(&mut self, delta: Duration) -> usize {
        for pending in &mut self.pending {
            pending.timer.tick(delta);
        }

        // One pass; both halves keep scheduling order
        let (done, waiting): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.pending).into_iter().partition(|pending| pending.timer.is_finished());
        self.pending = waiting;

        let finished = done.len();
        for pending in done {
            self.pool.release(pending.trail);
        }

        self.returned += finished as u64;
        finished
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    // Trails still on display, oldest first.
    pub fn displayed(&self) -> impl Iterator<Item = &TrailVisual> {
        self.pending.iter().map(|pending| &pending.trail)
    }

    #[must_use]
    pub fn available(&self) -> usize {
        self.pool.available()
    }

    #[must_use]
    pub const fn returned(&self) -> u64 {
        self.returned
    }

    #[must_use]
    pub const fn stats(&self) -> PoolStats {
        self.pool.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trail_returns_after_display_time() {
        let mut trails = TrailPool::new(4, 0.09);
        let mut trail = trails.acquire(Vec3::ZERO);
        trail.push(Vec3::Z);
        trails.schedule_return(trail);

        let tick = Duration::from_millis(20);
        for _ in 0..4 {
            assert_eq!(trails.process_returns(tick), 0);
        }
        assert_eq!(trails.process_returns(tick), 1);
        assert_eq!(trails.pending(), 0);
        assert_eq!(trails.available(), 1);
    }

    #[test]
    fn returned_trails_are_cleared() {
        let mut trails = TrailPool::new(4, 0.0);
        let mut trail = trails.acquire(Vec3::ZERO);
        trail.push(Vec3::X);
        trails.schedule_return(trail);
        trails.process_returns(Duration::from_millis(20));

        let reused = trails.acquire(Vec3::Y);
        assert_eq!(reused.points, vec![Vec3::Y]);
        assert_eq!(trails.stats().reused, 1);
    }

    #[test]
    fn staggered_returns_keep_the_rest_in_order() {
        let mut trails = TrailPool::new(64, 0.09);
        let tick = Duration::from_millis(20);

        // Two trails per tick for three ticks, each marked by its start point
        for step in 0..3 {
            for lane in 0..2 {
                let marker = Vec3::new(step as f32, lane as f32, 0.0);
                let trail = trails.acquire(marker);
                trails.schedule_return(trail);
            }
            trails.process_returns(tick);
        }
        assert_eq!(trails.pending(), 6);

        // The first pair has now ticked five times
        trails.process_returns(tick);
        assert_eq!(trails.process_returns(tick), 2);

        let starts: Vec<Vec3> = trails.displayed().map(|trail| trail.points[0]).collect();
        assert_eq!(
            starts,
            vec![
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(2.0, 0.0, 0.0),
                Vec3::new(2.0, 1.0, 0.0),
            ]
        );
        assert_eq!(trails.returned(), 2);
        assert_eq!(trails.available(), 2);
    }
}
