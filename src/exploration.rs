use rand::Rng;

use crate::{decay::Decay, ensure_interval, error::Result};

/// Exploration policy result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Explore,
    Exploit,
}

/// Epsilon greedy exploration policy with a decaying epsilon threshold
#[derive(Debug, Clone)]
pub struct EpsilonGreedy<D: Decay> {
    epsilon: f32,
    decay: D,
}

impl<D: Decay> EpsilonGreedy<D> {
    /// Initialize epsilon greedy policy from a starting epsilon and a decay strategy
    pub fn new(epsilon: f32, decay: D) -> Result<Self> {
        ensure_interval!(epsilon, 0.0, 1.0);
        Ok(Self { epsilon, decay })
    }

    /// Current probability of exploring
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Explore with probability epsilon, otherwise exploit
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Choice {
        if rng.gen::<f32>() < self.epsilon {
            Choice::Explore
        } else {
            Choice::Exploit
        }
    }

    /// Advance epsilon by one decay step
    ///
    /// **Returns** the new epsilon
    pub fn decay(&mut self) -> f32 {
        self.epsilon = self.decay.step(self.epsilon);
        self.epsilon
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::decay::Multiplicative;

    fn constant() -> Multiplicative {
        Multiplicative::new(1.0, 0.0).unwrap()
    }

    #[test]
    fn extremes() {
        let mut rng = StdRng::seed_from_u64(3);
        let always = EpsilonGreedy::new(1.0, constant()).unwrap();
        let never = EpsilonGreedy::new(0.0, constant()).unwrap();
        for _ in 0..1000 {
            assert_eq!(always.choose(&mut rng), Choice::Explore);
            assert_eq!(never.choose(&mut rng), Choice::Exploit);
        }
    }

    #[test]
    fn explore_rate_tracks_epsilon() {
        let mut rng = StdRng::seed_from_u64(11);
        let policy = EpsilonGreedy::new(0.3, constant()).unwrap();
        let explored = (0..10_000)
            .filter(|_| policy.choose(&mut rng) == Choice::Explore)
            .count();
        assert!((2_700..3_300).contains(&explored), "Explored {explored} of 10000");
    }

    #[test]
    fn decay_steps_epsilon() {
        let mut policy = EpsilonGreedy::new(1.0, Multiplicative::new(0.5, 0.2).unwrap()).unwrap();
        assert_eq!(policy.decay(), 0.5);
        assert_eq!(policy.decay(), 0.25);
        assert_eq!(policy.decay(), 0.2);
        assert_eq!(policy.epsilon(), 0.2);
    }

    #[test]
    fn invalid_epsilon_rejected() {
        assert!(EpsilonGreedy::new(1.1, constant()).is_err());
    }
}
