//! Arithmetic problem generation
//!
//! Problems are always well formed: integer answers, operands inside the
//! requested ranges, no negative differences unless asked for, and division
//! built from divisor and quotient so it is exact.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::rng::RandomSource;
use crate::error::Error;
use crate::settings::GameSettings;

/// Attempts the settings path makes to find an exact division pair
const DIVISION_ATTEMPTS: usize = 100;

/// The four quiz operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "×")]
    Mul,
    #[serde(rename = "÷")]
    Div,
}

impl Operator {
    pub const ALL: [Operator; 4] = [Operator::Add, Operator::Sub, Operator::Mul, Operator::Div];

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "×",
            Operator::Div => "÷",
        }
    }

    /// Bubble fill colour (0xRRGGBB)
    pub fn color(&self) -> u32 {
        match self {
            Operator::Add => 0x4ade80,
            Operator::Sub => 0xf87171,
            Operator::Mul => 0x60a5fa,
            Operator::Div => 0xfbbf24,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = Error;

    /// Accepts the display symbols and their ASCII stand-ins
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "+" => Ok(Operator::Add),
            "-" | "−" => Ok(Operator::Sub),
            "×" | "*" | "x" => Ok(Operator::Mul),
            "÷" | "/" => Ok(Operator::Div),
            other => Err(Error::UnknownOperator(other.to_string())),
        }
    }
}

/// Inclusive operand range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperandRange {
    pub min: i32,
    pub max: i32,
}

impl OperandRange {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, v: i32) -> bool {
        (self.min..=self.max).contains(&v)
    }

    fn draw(&self, rng: &mut impl RandomSource) -> i32 {
        rng.range_i32(self.min, self.max)
    }
}

/// A single practice problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub a: i32,
    pub b: i32,
    pub operator: Operator,
    pub answer: i32,
}

impl Problem {
    pub fn check_answer(&self, value: i32) -> bool {
        value == self.answer
    }

    /// Question text, e.g. "7 × 8"
    pub fn prompt(&self) -> String {
        format!("{} {} {}", self.a, self.operator, self.b)
    }
}

/// Generate one problem from explicit ranges.
///
/// For division `range_a` bounds the divisor and `range_b` the quotient, so
/// the dividend is their product. Divisors are never below 1.
pub fn generate(
    rng: &mut impl RandomSource,
    operator: Operator,
    range_a: OperandRange,
    range_b: OperandRange,
    allow_negative: bool,
) -> Problem {
    match operator {
        Operator::Add => {
            let (a, b) = (range_a.draw(rng), range_b.draw(rng));
            Problem { a, b, operator, answer: a + b }
        }
        Operator::Sub => {
            let (mut a, mut b) = (range_a.draw(rng), range_b.draw(rng));
            if !allow_negative && a < b {
                std::mem::swap(&mut a, &mut b);
            }
            Problem { a, b, operator, answer: a - b }
        }
        Operator::Mul => {
            let (a, b) = (range_a.draw(rng), range_b.draw(rng));
            Problem { a, b, operator, answer: a * b }
        }
        Operator::Div => {
            let divisor = rng.range_i32(range_a.min.max(1), range_a.max.max(1));
            let quotient = range_b.draw(rng);
            Problem {
                a: divisor * quotient,
                b: divisor,
                operator,
                answer: quotient,
            }
        }
    }
}

/// Generate `n` problems for one operator
pub fn generate_set(
    rng: &mut impl RandomSource,
    n: usize,
    operator: Operator,
    range_a: OperandRange,
    range_b: OperandRange,
    allow_negative: bool,
) -> Vec<Problem> {
    (0..n)
        .map(|_| generate(rng, operator, range_a, range_b, allow_negative))
        .collect()
}

/// Pick a random enabled operator and generate a problem for it
pub fn generate_from_settings(
    rng: &mut impl RandomSource,
    settings: &GameSettings,
) -> Option<Problem> {
    let enabled = settings.operators.enabled();
    let idx = rng.index(enabled.len())?;
    generate_for_operator(rng, settings, enabled[idx])
}

/// Generate a problem for `operator` using its configured ranges.
///
/// Returns `None` when the operator is disabled or when no exact division
/// pair fits the ranges.
pub fn generate_for_operator(
    rng: &mut impl RandomSource,
    settings: &GameSettings,
    operator: Operator,
) -> Option<Problem> {
    let cfg = settings.operators.get(operator);
    if !cfg.enabled {
        return None;
    }
    match operator {
        Operator::Div => find_exact_division(rng, cfg.range_a(), cfg.range_b()),
        _ => Some(generate(
            rng,
            operator,
            cfg.range_a(),
            cfg.range_b(),
            cfg.allow_negative,
        )),
    }
}

/// Up to `n` problems, each for a randomly chosen enabled operator
pub fn generate_set_from_settings(
    rng: &mut impl RandomSource,
    n: usize,
    settings: &GameSettings,
) -> Vec<Problem> {
    (0..n)
        .filter_map(|_| generate_from_settings(rng, settings))
        .collect()
}

/// Up to `n` problems for one operator
pub fn generate_set_for_operator(
    rng: &mut impl RandomSource,
    n: usize,
    settings: &GameSettings,
    operator: Operator,
) -> Vec<Problem> {
    (0..n)
        .filter_map(|_| generate_for_operator(rng, settings, operator))
        .collect()
}

/// Search for a divisor in `divisors` with a multiple in `dividends`.
///
/// Both operands stay inside their configured ranges, unlike [`generate`].
fn find_exact_division(
    rng: &mut impl RandomSource,
    dividends: OperandRange,
    divisors: OperandRange,
) -> Option<Problem> {
    let min_divisor = divisors.min.max(1);
    if divisors.max < min_divisor {
        return None;
    }
    for _ in 0..DIVISION_ATTEMPTS {
        let b = rng.range_i32(min_divisor, divisors.max);
        // Smallest multiple of b not below the dividend floor
        let first = (dividends.min + b - 1).div_euclid(b) * b;
        if first > dividends.max {
            continue;
        }
        let count = (dividends.max - first) / b + 1;
        let a = first + rng.range_i32(0, count - 1) * b;
        return Some(Problem {
            a,
            b,
            operator: Operator::Div,
            answer: a / b,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::OperatorSettings;
    use crate::sim::rng::{ScriptedRng, seeded};
    use proptest::prelude::*;

    fn ordered_range(lo: i32, hi: i32) -> impl Strategy<Value = OperandRange> {
        (lo..=hi, lo..=hi).prop_map(|(x, y)| OperandRange::new(x.min(y), x.max(y)))
    }

    fn only(op: Operator, cfg: OperatorSettings) -> GameSettings {
        let mut settings = GameSettings::default();
        for other in Operator::ALL {
            settings.operators.get_mut(other).enabled = false;
        }
        *settings.operators.get_mut(op) = cfg;
        settings
    }

    proptest! {
        #[test]
        fn prop_division_is_exact(
            seed in any::<u64>(),
            ra in ordered_range(0, 20),
            rb in ordered_range(0, 20),
        ) {
            let mut rng = seeded(seed);
            let p = generate(&mut rng, Operator::Div, ra, rb, false);
            prop_assert!(p.b >= 1);
            prop_assert_eq!(p.a % p.b, 0);
            prop_assert_eq!(p.a / p.b, p.answer);
        }

        #[test]
        fn prop_subtraction_not_negative(
            seed in any::<u64>(),
            ra in ordered_range(0, 100),
            rb in ordered_range(0, 100),
        ) {
            let mut rng = seeded(seed);
            let p = generate(&mut rng, Operator::Sub, ra, rb, false);
            prop_assert!(p.answer >= 0);
            prop_assert_eq!(p.a - p.b, p.answer);
        }

        #[test]
        fn prop_operands_within_ranges(
            seed in any::<u64>(),
            op in prop_oneof![Just(Operator::Add), Just(Operator::Mul)],
            ra in ordered_range(-50, 50),
            rb in ordered_range(-50, 50),
        ) {
            let mut rng = seeded(seed);
            let p = generate(&mut rng, op, ra, rb, false);
            prop_assert!(ra.contains(p.a));
            prop_assert!(rb.contains(p.b));
        }

        #[test]
        fn prop_settings_division_stays_in_range(
            seed in any::<u64>(),
            ra in ordered_range(1, 100),
            rb in ordered_range(1, 20),
        ) {
            let settings = only(
                Operator::Div,
                OperatorSettings::with_ranges(ra.min, ra.max, rb.min, rb.max),
            );
            let mut rng = seeded(seed);
            if let Some(p) = generate_from_settings(&mut rng, &settings) {
                prop_assert!(ra.contains(p.a));
                prop_assert!(rb.contains(p.b));
                prop_assert_eq!(p.a % p.b, 0);
                prop_assert_eq!(p.a / p.b, p.answer);
            }
        }
    }

    #[test]
    fn test_multiplication_only_settings() {
        let settings = only(Operator::Mul, OperatorSettings::with_ranges(6, 9, 2, 12));
        let mut rng = seeded(1234);
        for _ in 0..1000 {
            let p = generate_from_settings(&mut rng, &settings).unwrap();
            assert_eq!(p.operator, Operator::Mul);
            assert!((6..=9).contains(&p.a), "a out of range: {:?}", p);
            assert!((2..=12).contains(&p.b), "b out of range: {:?}", p);
            assert_eq!(p.answer, p.a * p.b);
        }
    }

    #[test]
    fn test_subtraction_swaps_operands() {
        // a draws 3, b draws 9
        let mut rng = ScriptedRng::new(&[0.2, 0.85]);
        let p = generate(
            &mut rng,
            Operator::Sub,
            OperandRange::new(1, 10),
            OperandRange::new(1, 10),
            false,
        );
        assert_eq!((p.a, p.b, p.answer), (9, 3, 6));

        let mut rng = ScriptedRng::new(&[0.2, 0.85]);
        let p = generate(
            &mut rng,
            Operator::Sub,
            OperandRange::new(1, 10),
            OperandRange::new(1, 10),
            true,
        );
        assert_eq!((p.a, p.b, p.answer), (3, 9, -6));
    }

    #[test]
    fn test_division_zero_divisor_excluded() {
        let mut rng = ScriptedRng::new(&[0.0]);
        let p = generate(
            &mut rng,
            Operator::Div,
            OperandRange::new(0, 0),
            OperandRange::new(5, 5),
            false,
        );
        assert_eq!((p.a, p.b, p.answer), (5, 1, 5));
    }

    #[test]
    fn test_no_enabled_operator_yields_none() {
        let mut settings = GameSettings::default();
        for op in Operator::ALL {
            settings.operators.get_mut(op).enabled = false;
        }
        let mut rng = seeded(9);
        assert!(generate_from_settings(&mut rng, &settings).is_none());
        assert!(generate_set_from_settings(&mut rng, 3, &settings).is_empty());
        assert!(generate_for_operator(&mut rng, &settings, Operator::Add).is_none());
    }

    #[test]
    fn test_incompatible_division_ranges_yield_none() {
        // No multiple of 7..=9 lies in 10..=13
        let settings = only(Operator::Div, OperatorSettings::with_ranges(10, 13, 7, 9));
        let mut rng = seeded(5);
        assert!(generate_from_settings(&mut rng, &settings).is_none());
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let settings = GameSettings::default();
        let first = generate_set_from_settings(&mut seeded(77), 20, &settings);
        let second = generate_set_from_settings(&mut seeded(77), 20, &settings);
        assert_eq!(first.len(), 20);
        assert_eq!(first, second);
    }

    #[test]
    fn test_check_answer_and_prompt() {
        let p = Problem { a: 7, b: 8, operator: Operator::Mul, answer: 56 };
        assert!(p.check_answer(56));
        assert!(!p.check_answer(55));
        assert_eq!(p.prompt(), "7 × 8");
    }

    #[test]
    fn test_operator_parsing() {
        assert_eq!("÷".parse::<Operator>().unwrap(), Operator::Div);
        assert_eq!("*".parse::<Operator>().unwrap(), Operator::Mul);
        assert!(matches!("%".parse::<Operator>(), Err(Error::UnknownOperator(s)) if s == "%"));
    }
}
