/// Camera distance with a clamped target the current value eases toward.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Zoom {
    current: f64,
    target: f64,
    min: f64,
    max: f64,
}

impl Zoom {
    pub fn new(initial: f64, min: f64, max: f64) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            current: initial,
            target: initial.clamp(min, max),
            min,
            max,
        }
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Move the target by `delta`, staying inside the bounds.
    pub fn adjust_target(&mut self, delta: f64) {
        if !delta.is_finite() {
            return;
        }
        self.target = (self.target + delta).clamp(self.min, self.max);
    }

    /// Close `smoothing` of the gap per reference frame, scaled to `steps`
    /// reference frames.
    pub fn ease(&mut self, smoothing: f64, steps: f64) {
        let keep = (1.0 - smoothing.clamp(0.0, 1.0)).powf(steps.max(0.0));
        self.current = self.target + (self.current - self.target) * keep;
    }
}

#[cfg(test)]
mod tests {
    use super::Zoom;

    #[test]
    fn target_stays_within_bounds() {
        let mut zoom = Zoom::new(15.0, 6.0, 30.0);
        zoom.adjust_target(1.0e12);
        assert_eq!(zoom.target(), 30.0);
        zoom.adjust_target(-1.0e12);
        assert_eq!(zoom.target(), 6.0);
        zoom.adjust_target(f64::NAN);
        assert_eq!(zoom.target(), 6.0);
    }

    #[test]
    fn one_reference_frame_closes_ten_percent() {
        let mut zoom = Zoom::new(15.0, 6.0, 30.0);
        zoom.adjust_target(5.0);
        zoom.ease(0.1, 1.0);
        assert!((zoom.current() - 15.5).abs() < 1e-12);
    }

    #[test]
    fn two_half_steps_match_one_full_step() {
        let mut a = Zoom::new(10.0, 6.0, 30.0);
        let mut b = a;
        a.adjust_target(10.0);
        b.adjust_target(10.0);
        a.ease(0.1, 1.0);
        b.ease(0.1, 0.5);
        b.ease(0.1, 0.5);
        assert!((a.current() - b.current()).abs() < 1e-12);
    }

    #[test]
    fn easing_converges_on_target() {
        let mut zoom = Zoom::new(15.0, 6.0, 30.0);
        zoom.adjust_target(-100.0);
        for _ in 0..500 {
            zoom.ease(0.1, 1.0);
        }
        assert!((zoom.current() - 6.0).abs() < 1e-9);
    }
}
