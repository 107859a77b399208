//! Frame-driven motion: projection transitions and time-lapse autoplay.
//!
//! Nothing here reads a real clock. Callers supply a [`FrameClock`]; the
//! browser bridge backs it with `requestAnimationFrame`, tests with a
//! [`SteppedClock`].

use crate::projection::Mercator;
use std::future::{ready, Future};

/// Duration of a projection transition.
pub const TRANSITION_MS: f64 = 600.0;

/// Below this difference a transition is considered a no-op.
pub const EPSILON: f64 = 1e-6;

/// Time-lapse speed in dates per second.
pub const STEPS_PER_SECOND: f64 = 1.0;

pub fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

/// Source of animation frame timestamps in milliseconds.
pub trait FrameClock {
    fn next_frame(&mut self) -> impl Future<Output = f64>;
}

/// Advances a fixed step per frame.
#[derive(Debug, Clone)]
pub struct SteppedClock {
    now: f64,
    step: f64,
    frames: usize,
}

impl SteppedClock {
    pub fn new(start: f64, step: f64) -> Self {
        SteppedClock {
            now: start,
            step,
            frames: 0,
        }
    }

    /// Frames handed out so far.
    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl FrameClock for SteppedClock {
    fn next_frame(&mut self) -> impl Future<Output = f64> {
        let now = self.now;
        self.now += self.step;
        self.frames += 1;
        ready(now)
    }
}

/// A move between two projections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// Target is numerically the current projection; apply it directly.
    Immediate(Mercator),
    Animated { from: Mercator, to: Mercator },
}

impl Transition {
    pub fn between(from: Mercator, to: Mercator) -> Transition {
        let same = (from.scale - to.scale).abs() < EPSILON
            && (from.translate.x - to.translate.x).abs() < EPSILON
            && (from.translate.y - to.translate.y).abs() < EPSILON;
        if same {
            Transition::Immediate(to)
        } else {
            Transition::Animated { from, to }
        }
    }

    pub fn target(&self) -> Mercator {
        match self {
            Transition::Immediate(to) | Transition::Animated { to, .. } => *to,
        }
    }

    /// Projection `elapsed` ms into the transition.
    pub fn at(&self, elapsed: f64) -> Mercator {
        match self {
            Transition::Immediate(to) => *to,
            Transition::Animated { from, to } => {
                let t = (elapsed / TRANSITION_MS).clamp(0.0, 1.0);
                if t >= 1.0 {
                    *to
                } else {
                    from.lerp(to, ease_out_cubic(t))
                }
            }
        }
    }
}

/// Drive `transition` frame by frame, handing each intermediate projection
/// to `apply`. An immediate transition applies once without waiting for a
/// frame. `apply` returns `false` to abandon the transition, in which case
/// `None` is returned.
pub async fn animate<C, F>(transition: Transition, clock: &mut C, mut apply: F) -> Option<Mercator>
where
    C: FrameClock,
    F: FnMut(Mercator) -> bool,
{
    let Transition::Animated { .. } = transition else {
        let target = transition.target();
        return apply(target).then_some(target);
    };
    let start = clock.next_frame().await;
    let mut now = start;
    loop {
        let elapsed = now - start;
        if !apply(transition.at(elapsed)) {
            return None;
        }
        if elapsed >= TRANSITION_MS {
            return Some(transition.target());
        }
        now = clock.next_frame().await;
    }
}

/// Fractional playback position over a list of dates.
///
/// Playback advances [`STEPS_PER_SECOND`] and wraps to the start once past
/// the last date. Any user interaction calls [`Autoplay::stop`].
#[derive(Debug, Clone, PartialEq)]
pub struct Autoplay {
    position: f64,
    len: usize,
    playing: bool,
    last_frame: Option<f64>,
}

impl Autoplay {
    /// Start playing from `index`; a list of one date or less never plays.
    pub fn new(len: usize, index: usize) -> Self {
        Autoplay {
            position: index.min(len.saturating_sub(1)) as f64,
            len,
            playing: len > 1,
            last_frame: None,
        }
    }

    /// Advance to frame time `now`; returns the discrete index while playing.
    pub fn tick(&mut self, now: f64) -> Option<usize> {
        if !self.playing || self.len <= 1 {
            return None;
        }
        let dt = self.last_frame.map_or(0.0, |last| (now - last).max(0.0));
        self.last_frame = Some(now);
        self.position += dt / 1000.0 * STEPS_PER_SECOND;
        if self.position > (self.len - 1) as f64 {
            self.position = 0.0;
        }
        Some(self.index())
    }

    /// Stop and snap to the nearest date.
    pub fn stop(&mut self) -> usize {
        self.playing = false;
        self.last_frame = None;
        self.position = self.position.round();
        self.index()
    }

    /// Jump to a slider position; stops playback.
    pub fn seek(&mut self, position: f64) -> usize {
        self.playing = false;
        self.last_frame = None;
        self.position = position.clamp(0.0, self.len.saturating_sub(1) as f64);
        self.index()
    }

    pub fn index(&self) -> usize {
        self.position.round() as usize
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

/// Hand every frame time to `tick` until it returns `None`, which it does
/// once playback stops or the loop is superseded. Returns the frames ticked.
pub async fn play<C, F>(clock: &mut C, mut tick: F) -> usize
where
    C: FrameClock,
    F: FnMut(f64) -> Option<usize>,
{
    let mut frames = 0;
    loop {
        let now = clock.next_frame().await;
        if tick(now).is_none() {
            return frames;
        }
        frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use geo::coord;

    fn view(scale: f64, x: f64) -> Mercator {
        Mercator {
            scale,
            translate: coord! { x: x, y: 0.0 },
        }
    }

    #[test]
    fn test_easing_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-12);
    }

    #[test]
    fn test_unchanged_target_is_immediate() {
        let mut clock = SteppedClock::new(0.0, 16.0);
        let t = Transition::between(view(1000.0, 5.0), view(1000.0 + 1e-9, 5.0));
        assert!(matches!(t, Transition::Immediate(_)));
        let mut applied = 0;
        let done = block_on(animate(t, &mut clock, |_| {
            applied += 1;
            true
        }));
        assert!(done.is_some());
        assert_eq!(applied, 1);
        assert_eq!(clock.frames(), 0);
    }

    #[test]
    fn test_animation_reaches_target() {
        let mut clock = SteppedClock::new(1000.0, 100.0);
        let from = view(1000.0, 0.0);
        let to = view(2000.0, 300.0);
        let mut seen = Vec::new();
        let done = block_on(animate(Transition::between(from, to), &mut clock, |m| {
            seen.push(m.scale);
            true
        }));
        assert_eq!(done, Some(to));
        // frames at 0, 100, ..., 600 ms
        assert_eq!(seen.len(), 7);
        assert_eq!(seen[0], 1000.0);
        assert_eq!(*seen.last().unwrap(), 2000.0);
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_animation_can_be_abandoned() {
        let mut clock = SteppedClock::new(0.0, 100.0);
        let mut frames = 0;
        let done = block_on(animate(
            Transition::between(view(1.0, 0.0), view(2.0, 0.0)),
            &mut clock,
            |_| {
                frames += 1;
                frames < 3
            },
        ));
        assert_eq!(done, None);
        assert_eq!(frames, 3);
    }

    #[test]
    fn test_autoplay_wraps_and_stops() {
        let mut play = Autoplay::new(3, 2);
        assert_eq!(play.tick(0.0), Some(2));
        // past the last date wraps to the start
        assert_eq!(play.tick(500.0), Some(0));
        assert_eq!(play.tick(1100.0), Some(1));
        assert_eq!(play.tick(1400.0), Some(1));
        assert!((play.position() - 0.9).abs() < 1e-9);
        assert_eq!(play.stop(), 1);
        assert_eq!(play.position(), 1.0);
        assert_eq!(play.tick(5000.0), None);
        assert!(!Autoplay::new(1, 0).is_playing());
    }

    #[test]
    fn test_play_runs_until_stopped() {
        let mut clock = SteppedClock::new(0.0, 250.0);
        let mut autoplay = Autoplay::new(5, 0);
        let ticked = block_on(play(&mut clock, |now| {
            if now >= 1000.0 {
                autoplay.stop();
            }
            autoplay.tick(now)
        }));
        assert_eq!(ticked, 4);
        assert_eq!(autoplay.index(), 1);
    }

    #[test]
    fn test_superseded_loop_stops_ticking() {
        use std::cell::{Cell, RefCell};

        let generation = Cell::new(1u64);
        let autoplay = RefCell::new(Autoplay::new(10, 0));
        let mut clock = SteppedClock::new(0.0, 500.0);
        // a restart bumps the generation while the first loop is mid-flight
        let first = block_on(play(&mut clock, |now| {
            if generation.get() != 1 {
                return None;
            }
            if now >= 1000.0 {
                generation.set(2);
            }
            autoplay.borrow_mut().tick(now)
        }));
        assert_eq!(first, 3);
        let position = autoplay.borrow().position();
        assert!((position - 1.0).abs() < 1e-9);

        let second = block_on(play(&mut clock, |now| {
            if generation.get() != 2 || now > 2500.0 {
                return None;
            }
            autoplay.borrow_mut().tick(now)
        }));
        // the newer loop alone advances playback
        assert_eq!(second, 2);
        assert!((autoplay.borrow().position() - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_seek_clamps() {
        let mut play = Autoplay::new(10, 0);
        assert_eq!(play.seek(12.4), 9);
        assert!(!play.is_playing());
        assert_eq!(play.seek(3.6), 4);
    }
}
