//! The quote dataset: three constant records, nothing else.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Quote {
    pub id: u32,
    pub text: &'static str,
    pub author: &'static str,
}

pub static QUOTES: [Quote; 3] = [
    Quote { id: 1, text: "Ship small, learn fast.", author: "DevOps proverb" },
    Quote { id: 2, text: "Make it work, make it right, make it fast.", author: "Kent Beck" },
    Quote {
        id: 3,
        text: "Automation is good, so long as you know exactly where to put the machine.",
        author: "Eliyahu Goldratt",
    },
];

/// Uniform pick over [`QUOTES`]. Not seeded; callers pass `rand::thread_rng()`.
pub fn pick<R: Rng + ?Sized>(rng: &mut R) -> &'static Quote {
    // QUOTES is never empty.
    QUOTES.choose(rng).unwrap_or(&QUOTES[0])
}
