use super::brute_force::{DEFAULT_BRUTE_FORCE_LIMIT, brute_force};
use super::builder::StoichiometricSystem;
use super::rational_solver::{RationalSolver, normalize_coefficients};
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

/// How the final coefficients were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceMethod {
    /// the stated multiplicities already conserved every element
    AlreadyBalanced,
    LinearSolved,
    BruteForced,
}

/// A way of finding integer coefficients for a stoichiometric system.
#[enum_dispatch]
pub trait BalancingStrategy {
    fn name(&self) -> &'static str;
    fn method(&self) -> BalanceMethod;
    /// Minimal non-negative integer coefficients indexed by variable, if found.
    fn find_coefficients(&self, system: &StoichiometricSystem) -> Option<Vec<u64>>;
}

/// Bounded exhaustive search, see [`brute_force`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BruteForceSearch {
    pub limit: u32,
}

impl BruteForceSearch {
    pub fn new(limit: u32) -> Self {
        Self { limit }
    }
}

impl Default for BruteForceSearch {
    fn default() -> Self {
        Self::new(DEFAULT_BRUTE_FORCE_LIMIT)
    }
}

impl BalancingStrategy for RationalSolver {
    fn name(&self) -> &'static str {
        "rational solver"
    }

    fn method(&self) -> BalanceMethod {
        BalanceMethod::LinearSolved
    }

    fn find_coefficients(&self, system: &StoichiometricSystem) -> Option<Vec<u64>> {
        let values = self.solve(system.equations(), system.variable_count())?;
        normalize_coefficients(&values)
    }
}

impl BalancingStrategy for BruteForceSearch {
    fn name(&self) -> &'static str {
        "brute force search"
    }

    fn method(&self) -> BalanceMethod {
        BalanceMethod::BruteForced
    }

    fn find_coefficients(&self, system: &StoichiometricSystem) -> Option<Vec<u64>> {
        brute_force(system.reactants(), system.products(), self.limit)
    }
}

#[derive(Debug, Clone)]
#[enum_dispatch(BalancingStrategy)]
pub enum Strategy {
    Linear(RationalSolver),
    BruteForce(BruteForceSearch),
}

pub enum StrategyType {
    Linear,
    BruteForce,
}

pub fn create_strategy(strategy_type: StrategyType, brute_force_limit: u32) -> Strategy {
    match strategy_type {
        StrategyType::Linear => Strategy::Linear(RationalSolver::new()),
        StrategyType::BruteForce => Strategy::BruteForce(BruteForceSearch::new(brute_force_limit)),
    }
}
