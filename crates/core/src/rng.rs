//! RNG module - piece selection strategies
//!
//! Three interchangeable strategies decide which shape spawns next:
//!
//! - **Uniform**: every draw is independent
//! - **Bag**: a shuffled bag of all seven shapes is emptied before refilling
//! - **History**: TGM-style, rerolls shapes seen in the last four draws
//!
//! A fourth source, **Recorded**, hands back the piece log of a demo so that
//! replays spawn exactly what was recorded.
//!
//! All randomness comes from a seeded LCG, so a seed fully determines the
//! piece sequence.

use tracing::warn;

use crate::types::{RandomizerKind, Shape, SHAPE_COUNT};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        self.next_u32() % max
    }

    /// Current internal state
    pub fn state(&self) -> u32 {
        self.state
    }

    fn next_shape(&mut self) -> Shape {
        Shape::ALL[self.next_range(SHAPE_COUNT as u32) as usize]
    }
}

/// State of the 7-bag strategy
#[derive(Debug, Clone)]
pub struct BagState {
    bag: [Shape; SHAPE_COUNT],
    cursor: usize,
    rng: SimpleRng,
}

impl BagState {
    fn refill(&mut self) {
        self.bag = Shape::ALL;
        // Swap each slot with a random slot, in index order
        for i in 0..SHAPE_COUNT {
            let other = self.rng.next_range(SHAPE_COUNT as u32) as usize;
            self.bag.swap(i, other);
        }
        self.cursor = 0;
    }

    /// Shapes not yet handed out from the current bag
    pub fn remaining(&self) -> &[Shape] {
        &self.bag[self.cursor + 1..]
    }
}

/// State of the history-avoidance strategy
#[derive(Debug, Clone)]
pub struct HistoryState {
    history: [Shape; 4],
    /// Nominal reroll budget. Draws retry until they succeed regardless.
    max_tries: u32,
    rng: SimpleRng,
}

impl HistoryState {
    const SEED_HISTORY: [Shape; 4] = [Shape::O, Shape::Z, Shape::S, Shape::Z];

    pub fn history(&self) -> &[Shape; 4] {
        &self.history
    }

    pub fn max_tries(&self) -> u32 {
        self.max_tries
    }

    fn draw(&mut self) -> Shape {
        let shape = loop {
            let candidate = self.rng.next_shape();
            if !self.history.contains(&candidate) {
                break candidate;
            }
        };
        self.history.rotate_left(1);
        self.history[3] = shape;
        shape
    }
}

/// State of the recorded strategy
#[derive(Debug, Clone)]
pub struct RecordedState {
    shapes: Vec<Shape>,
    cursor: usize,
}

/// Next-piece source
#[derive(Debug, Clone)]
pub enum Randomizer {
    Uniform(SimpleRng),
    Bag(BagState),
    History(HistoryState),
    Recorded(RecordedState),
}

impl Randomizer {
    /// Default reroll budget for the history strategy
    pub const DEFAULT_MAX_TRIES: u32 = 6;

    /// Create a seeded randomizer of the given kind
    pub fn new(kind: RandomizerKind, seed: u32) -> Self {
        let rng = SimpleRng::new(seed);
        match kind {
            RandomizerKind::Uniform => Randomizer::Uniform(rng),
            RandomizerKind::Bag => Randomizer::Bag(BagState {
                bag: Shape::ALL,
                cursor: 0,
                rng,
            }),
            RandomizerKind::History => Randomizer::History(HistoryState {
                history: HistoryState::SEED_HISTORY,
                max_tries: Self::DEFAULT_MAX_TRIES,
                rng,
            }),
        }
    }

    /// History strategy with an explicit reroll budget
    pub fn history(seed: u32, max_tries: u32) -> Self {
        Randomizer::History(HistoryState {
            history: HistoryState::SEED_HISTORY,
            max_tries,
            rng: SimpleRng::new(seed),
        })
    }

    /// Source that replays a recorded piece sequence
    pub fn recorded(shapes: Vec<Shape>) -> Self {
        Randomizer::Recorded(RecordedState { shapes, cursor: 0 })
    }

    /// Strategy kind, `None` for recorded sequences
    pub fn kind(&self) -> Option<RandomizerKind> {
        match self {
            Randomizer::Uniform(_) => Some(RandomizerKind::Uniform),
            Randomizer::Bag(_) => Some(RandomizerKind::Bag),
            Randomizer::History(_) => Some(RandomizerKind::History),
            Randomizer::Recorded(_) => None,
        }
    }

    /// Reset strategy state and return the first shape
    pub fn init(&mut self) -> Shape {
        match self {
            Randomizer::Uniform(rng) => rng.next_shape(),
            Randomizer::Bag(bag) => {
                bag.refill();
                bag.bag[bag.cursor]
            }
            Randomizer::History(state) => {
                state.history = HistoryState::SEED_HISTORY;
                state.draw()
            }
            Randomizer::Recorded(rec) => {
                rec.cursor = 0;
                rec.current()
            }
        }
    }

    /// Draw the next shape
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Shape {
        match self {
            Randomizer::Uniform(rng) => rng.next_shape(),
            Randomizer::Bag(bag) => {
                bag.cursor += 1;
                if bag.cursor >= SHAPE_COUNT {
                    bag.refill();
                }
                bag.bag[bag.cursor]
            }
            Randomizer::History(state) => state.draw(),
            Randomizer::Recorded(rec) => {
                rec.cursor += 1;
                rec.current()
            }
        }
    }
}

impl RecordedState {
    fn current(&self) -> Shape {
        match self.shapes.get(self.cursor) {
            Some(&shape) => shape,
            None => {
                warn!(
                    cursor = self.cursor,
                    recorded = self.shapes.len(),
                    "piece log exhausted, repeating last shape"
                );
                self.shapes.last().copied().unwrap_or(Shape::O)
            }
        }
    }
}
