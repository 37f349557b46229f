//! Color-cycling state for the hue triangle.

use glam::Vec3;

/// Seconds between hue switches.
pub const HUE_PERIOD: f64 = 0.25;

/// One of the three colors the triangle cycles through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hue {
    /// Pure red, the starting hue.
    Red,
    /// Pure green.
    Green,
    /// Pure blue.
    Blue,
}

impl Hue {
    /// The next hue in R → G → B → R order.
    pub fn next(self) -> Self {
        match self {
            Hue::Red => Hue::Green,
            Hue::Green => Hue::Blue,
            Hue::Blue => Hue::Red,
        }
    }

    /// The hue `steps` switches ahead of this one.
    pub fn advance(self, steps: u64) -> Self {
        match steps % 3 {
            0 => self,
            1 => self.next(),
            _ => self.next().next(),
        }
    }

    /// RGB color in `0..=1`, ready for a `vec3<f32>` uniform.
    pub fn color(self) -> Vec3 {
        match self {
            Hue::Red => Vec3::X,
            Hue::Green => Vec3::Y,
            Hue::Blue => Vec3::Z,
        }
    }
}

/// Switches hue every [`HUE_PERIOD`] seconds of elapsed time.
///
/// The switch clock advances by whole periods rather than snapping to the
/// sample time, so the number of switches after `T` seconds is always
/// `floor(T / HUE_PERIOD)` no matter how the samples are spaced.
#[derive(Debug, Clone)]
pub struct HueCycle {
    hue: Hue,
    last_switch: f64,
    period: f64,
    switches: u64,
}

impl HueCycle {
    /// Starts at red with the switch clock at `start` seconds.
    pub fn new(start: f64) -> Self {
        Self {
            hue: Hue::Red,
            last_switch: start,
            period: HUE_PERIOD,
            switches: 0,
        }
    }

    /// Like [`HueCycle::new`] with a custom period in seconds.
    ///
    /// Returns `None` unless `period` is finite and greater than zero.
    pub fn with_period(start: f64, period: f64) -> Option<Self> {
        if !(period.is_finite() && period > 0.0) {
            return None;
        }
        Some(Self {
            hue: Hue::Red,
            last_switch: start,
            period,
            switches: 0,
        })
    }

    /// The hue as of the last [`HueCycle::update`].
    pub fn hue(&self) -> Hue {
        self.hue
    }

    /// Total switches since creation.
    pub fn switches(&self) -> u64 {
        self.switches
    }

    /// Advances to time `now` (seconds, same clock as `start`) and returns
    /// the current hue.
    ///
    /// All whole periods since the last switch are applied at once. A
    /// non-finite `now` leaves the cycle untouched.
    pub fn update(&mut self, now: f64) -> Hue {
        let periods = (now - self.last_switch) / self.period;
        if !periods.is_finite() || periods < 1.0 {
            return self.hue;
        }

        let whole = periods.floor();
        self.last_switch += whole * self.period;
        // Float-to-int casts saturate, so absurd times cannot wrap the count.
        self.switches = self.switches.saturating_add(whole as u64);
        self.hue = self.hue.advance(whole.rem_euclid(3.0) as u64);
        self.hue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_in_fixed_order() {
        let mut cycle = HueCycle::new(0.0);
        assert_eq!(cycle.update(0.1), Hue::Red);
        assert_eq!(cycle.update(0.25), Hue::Green);
        assert_eq!(cycle.update(0.5), Hue::Blue);
        assert_eq!(cycle.update(0.75), Hue::Red);
        assert_eq!(cycle.update(1.0), Hue::Green);
    }

    #[test]
    fn switch_count_is_floor_of_elapsed_over_period() {
        for &(total, step) in &[(0.0, 0.01), (0.24, 0.01), (1.0, 0.016), (3.7, 0.033), (10.0, 0.1)] {
            let mut cycle = HueCycle::new(0.0);
            let mut t: f64 = 0.0;
            while t < total {
                t = (t + step).min(total);
                cycle.update(t);
            }
            let expected = (total / HUE_PERIOD).floor() as u64;
            assert_eq!(cycle.switches(), expected, "T = {total}");

            let mut hue = Hue::Red;
            for _ in 0..expected {
                hue = hue.next();
            }
            assert_eq!(cycle.hue(), hue, "T = {total}");
        }
    }

    #[test]
    fn one_long_frame_applies_every_missed_switch() {
        let mut cycle = HueCycle::new(2.0);
        assert_eq!(cycle.update(2.8), Hue::Red.next().next().next());
        assert_eq!(cycle.switches(), 3);
    }

    #[test]
    fn periods_that_never_elapse_are_rejected() {
        for period in [0.0, -0.25, f64::NAN, f64::INFINITY] {
            assert!(HueCycle::with_period(0.0, period).is_none(), "period = {period}");
        }
        assert!(HueCycle::with_period(0.0, 0.5).is_some());
    }

    #[test]
    fn non_finite_time_is_ignored() {
        let mut cycle = HueCycle::new(0.0);
        assert_eq!(cycle.update(f64::INFINITY), Hue::Red);
        assert_eq!(cycle.update(f64::NAN), Hue::Red);
        assert_eq!(cycle.switches(), 0);

        assert_eq!(cycle.update(0.25), Hue::Green);
        assert_eq!(cycle.switches(), 1);
    }

    #[test]
    fn distant_time_is_one_step() {
        let mut cycle = HueCycle::new(0.0);
        // 4e12 switches; 4e12 % 3 == 1
        assert_eq!(cycle.update(1.0e12), Hue::Green);
        assert_eq!(cycle.switches(), 4_000_000_000_000);
    }

    #[test]
    fn custom_period_counts_whole_periods() {
        let mut cycle = HueCycle::with_period(1.0, 0.5).unwrap();
        assert_eq!(cycle.update(1.49), Hue::Red);
        assert_eq!(cycle.update(2.0), Hue::Blue);
        assert_eq!(cycle.switches(), 2);
    }

    #[test]
    fn advance_wraps_every_three_steps() {
        assert_eq!(Hue::Green.advance(0), Hue::Green);
        assert_eq!(Hue::Green.advance(2), Hue::Red);
        assert_eq!(Hue::Blue.advance(3 * 1000 + 1), Hue::Red);
    }

    #[test]
    fn colors_are_pure_primaries() {
        assert_eq!(Hue::Red.color(), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(Hue::Green.color(), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(Hue::Blue.color(), Vec3::new(0.0, 0.0, 1.0));
    }
}
