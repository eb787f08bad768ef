//! Peak-hold smoothing with exponential fall-off.

/// One smoothing step: rises instantly, falls by `decay` per frame
#[inline]
pub fn peak_hold(previous: f32, target: f32, decay: f32) -> f32 {
    target.max(previous * decay)
}

/// Frames for a unit peak to fall below `epsilon`: `ceil(ln ε / ln decay)`
pub fn frames_to_converge(epsilon: f32, decay: f32) -> usize {
    (epsilon.ln() / decay.ln()).ceil().max(0.0) as usize
}

/// Per-vertex smoothed values, zero-initialised
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecayState {
    values: Vec<f32>,
}

impl DecayState {
    pub fn new(vertex_count: usize) -> Self {
        Self {
            values: vec![0.0; vertex_count],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Smooth `target` into the stored value for `vertex` and return it
    #[inline]
    pub fn update(&mut self, vertex: usize, target: f32, decay: f32) -> f32 {
        let slot = &mut self.values[vertex];
        *slot = peak_hold(*slot, target, decay);
        *slot
    }

    pub fn get(&self, vertex: usize) -> f32 {
        self.values[vertex]
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Re-allocate for a new vertex count, zeroing every value
    pub fn reset(&mut self, vertex_count: usize) {
        self.values.clear();
        self.values.resize(vertex_count, 0.0);
    }

    /// Largest smoothed value across all vertices
    pub fn peak(&self) -> f32 {
        self.values.iter().copied().fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rises_instantly() {
        let mut state = DecayState::new(1);
        assert_eq!(state.update(0, 0.7, 0.95), 0.7);
    }

    #[test]
    fn test_falls_exponentially() {
        let mut state = DecayState::new(1);
        state.update(0, 1.0, 0.5);
        assert_eq!(state.update(0, 0.0, 0.5), 0.5);
        assert_eq!(state.update(0, 0.0, 0.5), 0.25);
        // A target above the decay floor wins
        assert_eq!(state.update(0, 0.2, 0.5), 0.2);
    }

    #[test]
    fn test_converges_within_bound() {
        let decay = 0.95;
        let epsilon = 1e-3;
        let frames = frames_to_converge(epsilon, decay);
        assert_eq!(frames, 135);

        let mut value = 1.0;
        for _ in 0..frames {
            value = peak_hold(value, 0.0, decay);
        }
        assert!(value <= epsilon);
        assert!(value >= 0.0);
    }

    #[test]
    fn test_reset_resizes_and_zeroes() {
        let mut state = DecayState::new(4);
        state.update(2, 1.0, 0.9);
        state.reset(6);
        assert_eq!(state.len(), 6);
        assert!(state.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_peak() {
        let mut state = DecayState::new(3);
        state.update(1, 0.4, 0.9);
        state.update(2, 0.8, 0.9);
        assert_eq!(state.peak(), 0.8);
    }
}
