//! Homogeneous linear equations over coefficient variables.
//!
//! An equation `2A + B = 3C` reads "twice A plus B equals three times C".
//! Internally every operation works on the one-sided form
//! `Σ net(v)·v = 0`, where `net(v)` is the left coefficient minus the right one.
use super::variables::VarId;
use crate::error::{ChemError, ChemResult};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// `coefficient × var`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Term {
    pub var: VarId,
    pub coefficient: i64,
}

impl Term {
    pub fn new(var: VarId, coefficient: i64) -> Self {
        Self { var, coefficient }
    }
}

/// Values found so far in one solving attempt, indexed by `VarId`.
/// Entries are only ever added.
#[derive(Debug, Clone, PartialEq)]
pub struct RationalAssignment {
    values: Vec<Option<BigRational>>,
}

impl RationalAssignment {
    pub fn new(variable_count: usize) -> Self {
        Self {
            values: vec![None; variable_count],
        }
    }

    pub fn get(&self, var: VarId) -> Option<&BigRational> {
        self.values.get(var.index()).and_then(|v| v.as_ref())
    }

    pub fn is_known(&self, var: VarId) -> bool {
        self.get(var).is_some()
    }

    /// Records a value; returns false (and keeps the old value) if the
    /// variable was already known or is out of range.
    pub fn assign(&mut self, var: VarId, value: BigRational) -> bool {
        match self.values.get_mut(var.index()) {
            Some(slot) if slot.is_none() => {
                *slot = Some(value);
                true
            }
            _ => false,
        }
    }

    pub fn known_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.values.iter().all(|v| v.is_some())
    }

    /// all values, if every variable is known
    pub fn into_values(self) -> Option<Vec<BigRational>> {
        self.values.into_iter().collect()
    }
}

/// Two sides of `(coefficient, variable)` terms. A variable appears at most
/// once per side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearEquation {
    left: Vec<Term>,
    right: Vec<Term>,
}

impl LinearEquation {
    pub fn new(left: Vec<Term>, right: Vec<Term>) -> ChemResult<Self> {
        check_side(&left)?;
        check_side(&right)?;
        Ok(Self { left, right })
    }

    pub fn left(&self) -> &[Term] {
        &self.left
    }

    pub fn right(&self) -> &[Term] {
        &self.right
    }

    pub fn term_count(&self) -> usize {
        self.left.len() + self.right.len()
    }

    /// distinct variables in order of appearance, left side first
    pub fn variables(&self) -> Vec<VarId> {
        let mut vars: Vec<VarId> = Vec::with_capacity(self.term_count());
        for term in self.left.iter().chain(self.right.iter()) {
            if !vars.contains(&term.var) {
                vars.push(term.var);
            }
        }
        vars
    }

    /// left coefficient minus right coefficient of `var`
    pub fn net_coefficient(&self, var: VarId) -> i64 {
        let left: i64 = self.left.iter().filter(|t| t.var == var).map(|t| t.coefficient).sum();
        let right: i64 = self.right.iter().filter(|t| t.var == var).map(|t| t.coefficient).sum();
        left - right
    }

    /// Unknown variables that actually constrain the equation (non-zero net coefficient).
    pub fn unknowns(&self, assignment: &RationalAssignment) -> Vec<VarId> {
        self.variables()
            .into_iter()
            .filter(|&v| !assignment.is_known(v) && self.net_coefficient(v) != 0)
            .collect()
    }

    /// `Σ net(v)·value(v)` over the known variables
    pub fn known_sum(&self, assignment: &RationalAssignment) -> BigRational {
        self.variables()
            .into_iter()
            .filter_map(|v| {
                assignment
                    .get(v)
                    .map(|value| value * BigRational::from_integer(BigInt::from(self.net_coefficient(v))))
            })
            .fold(BigRational::zero(), |acc, x| acc + x)
    }

    /// true when every variable is known and the two sides agree
    pub fn is_satisfied(&self, assignment: &RationalAssignment) -> bool {
        self.variables().iter().all(|&v| assignment.is_known(v)) && self.known_sum(assignment).is_zero()
    }
}

fn check_side(side: &[Term]) -> ChemResult<()> {
    for (i, term) in side.iter().enumerate() {
        if side[..i].iter().any(|t| t.var == term.var) {
            return Err(ChemError::DuplicateTerm(term.var.label()));
        }
    }
    Ok(())
}

fn linear_term_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d*)([A-Z]+)$").expect("linear term pattern is a valid regex"))
}

fn parse_linear_side(side: &str) -> ChemResult<Vec<Term>> {
    if side.is_empty() {
        return Err(ChemError::syntax("empty side in linear equation"));
    }
    side.split('+')
        .map(|term| {
            let captures = linear_term_pattern()
                .captures(term)
                .ok_or_else(|| ChemError::syntax(format!("cannot read linear term '{}'", term)))?;
            let digits = &captures[1];
            let coefficient = if digits.is_empty() {
                1
            } else {
                digits
                    .parse::<i64>()
                    .map_err(|_| ChemError::syntax(format!("coefficient '{}' is too large", digits)))?
            };
            if coefficient == 0 {
                return Err(ChemError::syntax(format!("zero coefficient in '{}'", term)));
            }
            let var = VarId::from_label(&captures[2])
                .ok_or_else(|| ChemError::syntax(format!("bad variable name '{}'", &captures[2])))?;
            Ok(Term::new(var, coefficient))
        })
        .collect()
}

impl FromStr for LinearEquation {
    type Err = ChemError;

    /// Reads `2A + B = 3C`; whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let sides: Vec<&str> = compact.split('=').collect();
        if sides.len() != 2 {
            return Err(ChemError::syntax(format!(
                "linear equation '{}' needs exactly one '='",
                s
            )));
        }
        LinearEquation::new(parse_linear_side(sides[0])?, parse_linear_side(sides[1])?)
    }
}

fn fmt_side(side: &[Term]) -> String {
    side.iter()
        .map(|t| {
            if t.coefficient == 1 {
                t.var.label()
            } else {
                format!("{}{}", t.coefficient, t.var.label())
            }
        })
        .collect::<Vec<_>>()
        .join(" + ")
}

impl fmt::Display for LinearEquation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", fmt_side(&self.left), fmt_side(&self.right))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::One;

    fn ratio(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn test_parse_and_display() {
        let eq: LinearEquation = "2A + B = 3C".parse().unwrap();
        assert_eq!(eq.left(), &[Term::new(VarId(0), 2), Term::new(VarId(1), 1)]);
        assert_eq!(eq.right(), &[Term::new(VarId(2), 3)]);
        assert_eq!(eq.to_string(), "2A + B = 3C");
        assert_eq!(eq.term_count(), 3);

        let eq: LinearEquation = "AA=2Z".parse().unwrap();
        assert_eq!(eq.variables(), vec![VarId(26), VarId(25)]);
    }

    #[test]
    fn test_duplicate_variable_rejected() {
        match "A + 2A = B".parse::<LinearEquation>() {
            Err(ChemError::DuplicateTerm(label)) => assert_eq!(label, "A"),
            other => panic!("expected duplicate term, got {:?}", other),
        }
        // once per side is fine
        assert!("A + B = A + C".parse::<LinearEquation>().is_ok());
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["A + B", "A = B = C", "= B", "a = B", "0A = B", "2 = B", "A + = B"] {
            assert!(
                matches!(bad.parse::<LinearEquation>(), Err(ChemError::Syntax(_))),
                "{:?} should not parse",
                bad
            );
        }
    }

    #[test]
    fn test_unknowns_and_known_sum() {
        let eq: LinearEquation = "2A + B = 3C".parse().unwrap();
        let mut assignment = RationalAssignment::new(3);
        assert_eq!(eq.unknowns(&assignment), vec![VarId(0), VarId(1), VarId(2)]);

        assert!(assignment.assign(VarId(0), BigRational::one()));
        assert!(assignment.assign(VarId(2), ratio(1, 3)));
        assert_eq!(eq.unknowns(&assignment), vec![VarId(1)]);
        // 2*1 - 3*(1/3) = 1
        assert_eq!(eq.known_sum(&assignment), BigRational::one());
        assert!(!eq.is_satisfied(&assignment));

        assert!(assignment.assign(VarId(1), ratio(-1, 1)));
        assert!(eq.is_satisfied(&assignment));
        assert!(assignment.is_complete());
    }

    #[test]
    fn test_assignment_is_monotonic() {
        let mut assignment = RationalAssignment::new(2);
        assert!(assignment.assign(VarId(1), ratio(1, 2)));
        assert!(!assignment.assign(VarId(1), ratio(3, 2)));
        assert!(!assignment.assign(VarId(5), ratio(3, 2)));
        assert_eq!(assignment.get(VarId(1)), Some(&ratio(1, 2)));
        assert_eq!(assignment.known_count(), 1);
        assert_eq!(assignment.into_values(), None);
    }

    #[test]
    fn test_variable_on_both_sides_cancels() {
        let eq: LinearEquation = "A + B = A + 2C".parse().unwrap();
        let assignment = RationalAssignment::new(3);
        assert_eq!(eq.net_coefficient(VarId(0)), 0);
        assert_eq!(eq.unknowns(&assignment), vec![VarId(1), VarId(2)]);
    }
}
