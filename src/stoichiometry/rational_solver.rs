//! Exact rational solver for element-conservation systems.
//!
//! Stoichiometric systems are sparse: most equations involve one or two
//! molecules per side. Instead of general elimination the solver fixes one
//! coefficient of a two-term "seed" equation to 1 and propagates values by
//! simple substitution, falling back to eliminating a pair of equations that
//! share the same two unknowns. Every two-term equation is tried as a seed
//! before giving up.
use super::linear_equation::{LinearEquation, RationalAssignment};
use super::variables::VarId;
use log::{debug, warn};
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

/// Result of solving from one seed.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    /// every variable has a value and every equation holds
    Solved(Vec<BigRational>),
    /// an elimination pairing turned out to be linearly dependent
    Degenerate,
    /// a full pass made no progress and no elimination pairing exists
    Unsolved,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Elimination {
    Solved {
        x: (VarId, BigRational),
        y: (VarId, BigRational),
    },
    Degenerate,
}

fn rational(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

/// Solves an equation with exactly one unknown for that unknown.
pub fn substitute(equation: &LinearEquation, assignment: &RationalAssignment) -> Option<(VarId, BigRational)> {
    let unknowns = equation.unknowns(assignment);
    if unknowns.len() != 1 {
        return None;
    }
    let unknown = unknowns[0];
    let coefficient = rational(equation.net_coefficient(unknown));
    let value = -equation.known_sum(assignment) / coefficient;
    Some((unknown, value))
}

/// Solves two equations that have exactly the same two unknowns.
///
/// Each equation is written as `a·x + b·y = c`, divided through by `a`, and
/// the second is subtracted from the first to isolate `y`. `None` if the
/// equations do not share exactly two unknowns.
pub fn eliminate(
    first: &LinearEquation,
    second: &LinearEquation,
    assignment: &RationalAssignment,
) -> Option<Elimination> {
    let unknowns = first.unknowns(assignment);
    let mut other = second.unknowns(assignment);
    if unknowns.len() != 2 || other.len() != 2 {
        return None;
    }
    other.sort();
    let mut sorted = unknowns.clone();
    sorted.sort();
    if sorted != other {
        return None;
    }
    let (x, y) = (unknowns[0], unknowns[1]);

    let normalized = |equation: &LinearEquation| {
        let a = rational(equation.net_coefficient(x));
        let b = rational(equation.net_coefficient(y));
        let c = -equation.known_sum(assignment);
        (&b / &a, &c / &a)
    };
    let (b1, c1) = normalized(first);
    let (b2, c2) = normalized(second);

    let y_coefficient = &b1 - &b2;
    if y_coefficient.is_zero() {
        return Some(Elimination::Degenerate);
    }
    let y_value = (&c1 - &c2) / y_coefficient;
    let x_value = &c1 - &b1 * &y_value;
    Some(Elimination::Solved {
        x: (x, x_value),
        y: (y, y_value),
    })
}

/// Scales rational values to the smallest integers with the same ratios.
/// `None` if every value is zero, any value is negative, or a result does
/// not fit in `u64`.
pub fn normalize_coefficients(values: &[BigRational]) -> Option<Vec<u64>> {
    if values.is_empty() || values.iter().any(|v| v.is_negative()) {
        return None;
    }
    let multiplier = values
        .iter()
        .fold(BigInt::one(), |acc, v| acc.lcm(v.denom()));
    let integers: Vec<BigInt> = values
        .iter()
        .map(|v| v.numer() * (&multiplier / v.denom()))
        .collect();
    let divisor = integers.iter().fold(BigInt::zero(), |acc, n| acc.gcd(n));
    if divisor.is_zero() {
        return None;
    }
    integers.iter().map(|n| (n / &divisor).to_u64()).collect()
}

/// Substitution/elimination solver; stateless between attempts.
#[derive(Debug, Clone, Default)]
pub struct RationalSolver;

impl RationalSolver {
    pub fn new() -> Self {
        Self
    }

    /// Indices of equations usable as seeds: exactly two terms over two
    /// distinct variables.
    pub fn seed_candidates(&self, equations: &[LinearEquation]) -> Vec<usize> {
        equations
            .iter()
            .enumerate()
            .filter(|(_, eq)| eq.term_count() == 2 && eq.variables().len() == 2)
            .map(|(i, _)| i)
            .collect()
    }

    /// Tries every seed in turn; returns the first solution with no negative value.
    pub fn solve(&self, equations: &[LinearEquation], variable_count: usize) -> Option<Vec<BigRational>> {
        let seeds = self.seed_candidates(equations);
        if seeds.is_empty() {
            debug!("no two-term equation to seed the rational solver");
        }
        for seed in seeds {
            match self.solve_from_seed(equations, variable_count, seed) {
                SolveOutcome::Solved(values) => {
                    if values.iter().any(|v| v.is_negative()) {
                        warn!("seed {} gave a negative coefficient, trying the next seed", seed);
                        continue;
                    }
                    debug!("seed {} solved the system", seed);
                    return Some(values);
                }
                SolveOutcome::Degenerate => {
                    warn!("seed {} hit a dependent elimination pair, trying the next seed", seed)
                }
                SolveOutcome::Unsolved => debug!("seed {} made no further progress", seed),
            }
        }
        None
    }

    /// One attempt: fix the first variable of `equations[seed]` to 1 and propagate.
    pub fn solve_from_seed(&self, equations: &[LinearEquation], variable_count: usize, seed: usize) -> SolveOutcome {
        let Some(seed_equation) = equations.get(seed) else {
            return SolveOutcome::Unsolved;
        };
        let seed_vars = seed_equation.variables();
        if seed_equation.term_count() != 2 || seed_vars.len() != 2 {
            return SolveOutcome::Unsolved;
        }

        let mut assignment = RationalAssignment::new(variable_count);
        if !assignment.assign(seed_vars[0], BigRational::one()) {
            return SolveOutcome::Unsolved;
        }
        match substitute(seed_equation, &assignment) {
            Some((var, value)) => {
                debug!("seed {}: {} = 1, {} = {}", seed_equation, seed_vars[0], var, value);
                assignment.assign(var, value);
            }
            None => return SolveOutcome::Unsolved,
        }

        loop {
            if assignment.is_complete() {
                if !equations.iter().all(|eq| eq.is_satisfied(&assignment)) {
                    debug!("all coefficients known but some equation does not hold");
                    return SolveOutcome::Unsolved;
                }
                return match assignment.into_values() {
                    Some(values) => SolveOutcome::Solved(values),
                    None => SolveOutcome::Unsolved,
                };
            }

            let mut progress = false;
            let mut pairs: Vec<(usize, (VarId, VarId))> = Vec::new();
            for (i, equation) in equations.iter().enumerate() {
                let unknowns = equation.unknowns(&assignment);
                match unknowns.len() {
                    1 => {
                        if let Some((var, value)) = substitute(equation, &assignment) {
                            debug!("{} gives {} = {}", equation, var, value);
                            progress |= assignment.assign(var, value);
                        }
                    }
                    2 => {
                        let pair = (unknowns[0].min(unknowns[1]), unknowns[0].max(unknowns[1]));
                        pairs.push((i, pair));
                    }
                    _ => {}
                }
            }
            if progress {
                continue;
            }

            let Some((i, j)) = find_shared_pair(&pairs) else {
                return SolveOutcome::Unsolved;
            };
            match eliminate(&equations[i], &equations[j], &assignment) {
                Some(Elimination::Solved { x, y }) => {
                    debug!(
                        "eliminated {} and {}: {} = {}, {} = {}",
                        equations[i], equations[j], x.0, x.1, y.0, y.1
                    );
                    assignment.assign(x.0, x.1);
                    assignment.assign(y.0, y.1);
                }
                Some(Elimination::Degenerate) => return SolveOutcome::Degenerate,
                None => return SolveOutcome::Unsolved,
            }
        }
    }
}

// first two candidate equations with the same unknown pair
fn find_shared_pair(pairs: &[(usize, (VarId, VarId))]) -> Option<(usize, usize)> {
    for (k, (i, pair)) in pairs.iter().enumerate() {
        if let Some((j, _)) = pairs[k + 1..].iter().find(|(_, other)| other == pair) {
            return Some((*i, *j));
        }
    }
    None
}
