use rand::seq::IndexedRandom;

/// Picks the substitute value when a turn times out
pub trait ItemChooser: Send + Sync + 'static {
    fn choose<'a>(&self, candidates: &'a [String]) -> Option<&'a String>;
}

/// Uniform choice from the thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomChooser;

impl ItemChooser for RandomChooser {
    fn choose<'a>(&self, candidates: &'a [String]) -> Option<&'a String> {
        candidates.choose(&mut rand::rng())
    }
}
