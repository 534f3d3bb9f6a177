//! Orchestrates one balancing attempt: parse, validate the element sets,
//! short-circuit already balanced input, then run the configured strategies
//! until one of them produces coefficients that conserve every element.
use crate::config::BalancerConfig;
use crate::elements::{Element, ElementLookup, PeriodicTable, periodic_table};
use crate::equation::{ChemicalEquation, Side, render_equation};
use crate::error::{ChemError, ChemResult};
use crate::formula::Molecule;
use crate::stoichiometry::builder::StoichiometricSystem;
use crate::stoichiometry::strategy::{
    BalanceMethod, BalancingStrategy, Strategy, StrategyType, create_strategy,
};
use log::{debug, info, warn};
use num_integer::Integer;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// A balanced equation: every molecule with its integer coefficient.
#[derive(Debug, Clone, PartialEq)]
pub struct BalancedEquation {
    reactants: Vec<(Molecule, u64)>,
    products: Vec<(Molecule, u64)>,
    method: BalanceMethod,
}

/// One molecule of a [`BalanceReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermReport {
    pub formula: String,
    pub coefficient: u64,
    pub relative_formula_mass: f64,
}

/// Serializable summary of a balanced equation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceReport {
    pub equation: String,
    pub method: BalanceMethod,
    pub reactants: Vec<TermReport>,
    pub products: Vec<TermReport>,
}

impl BalancedEquation {
    pub fn new(reactants: Vec<(Molecule, u64)>, products: Vec<(Molecule, u64)>, method: BalanceMethod) -> Self {
        Self {
            reactants,
            products,
            method,
        }
    }

    pub fn reactants(&self) -> &[(Molecule, u64)] {
        &self.reactants
    }

    pub fn products(&self) -> &[(Molecule, u64)] {
        &self.products
    }

    pub fn side(&self, side: Side) -> &[(Molecule, u64)] {
        match side {
            Side::Reactant => &self.reactants,
            Side::Product => &self.products,
        }
    }

    pub fn method(&self) -> BalanceMethod {
        self.method
    }

    /// reactant coefficients followed by product coefficients
    pub fn coefficients(&self) -> Vec<u64> {
        self.reactants
            .iter()
            .chain(&self.products)
            .map(|(_, n)| *n)
            .collect()
    }

    pub fn reactant_map(&self) -> HashMap<Molecule, u64> {
        self.reactants.iter().cloned().collect()
    }

    pub fn product_map(&self) -> HashMap<Molecule, u64> {
        self.products.iter().cloned().collect()
    }

    /// Coefficient of a molecule given by formula, searched on both sides.
    pub fn coefficient_of(&self, molecule: &Molecule) -> Option<(Side, u64)> {
        self.reactants
            .iter()
            .find(|(m, _)| m == molecule)
            .map(|(_, n)| (Side::Reactant, *n))
            .or_else(|| {
                self.products
                    .iter()
                    .find(|(m, _)| m == molecule)
                    .map(|(_, n)| (Side::Product, *n))
            })
    }

    pub fn to_canonical_string(&self) -> String {
        render_equation(&self.reactants, &self.products)
    }

    /// true if both sides carry the same number of atoms of every element
    pub fn is_conserved(&self) -> bool {
        side_totals(&self.reactants) == side_totals(&self.products)
    }

    pub fn report(&self) -> BalanceReport {
        let terms = |side: &[(Molecule, u64)]| -> Vec<TermReport> {
            side.iter()
                .map(|(molecule, n)| TermReport {
                    formula: molecule.formula().to_string(),
                    coefficient: *n,
                    relative_formula_mass: molecule.relative_formula_mass(),
                })
                .collect()
        };
        BalanceReport {
            equation: self.to_canonical_string(),
            method: self.method,
            reactants: terms(&self.reactants),
            products: terms(&self.products),
        }
    }

    pub fn to_json(&self) -> ChemResult<String> {
        Ok(serde_json::to_string_pretty(&self.report())?)
    }
}

impl fmt::Display for BalancedEquation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

// u32 atom count times u64 coefficient always fits in u128
fn side_totals(side: &[(Molecule, u64)]) -> BTreeMap<Element, u128> {
    let mut totals = BTreeMap::new();
    for (molecule, n) in side {
        if *n == 0 {
            continue;
        }
        for (element, &count) in molecule.element_counts() {
            *totals.entry(element.clone()).or_insert(0u128) += count as u128 * *n as u128;
        }
    }
    totals
}

/// Balances chemical equations according to a [`BalancerConfig`].
///
/// # Examples
/// ```
/// use chem_balance::balancer::Balancer;
/// let balanced = Balancer::default().balance("Fe + O2 -> Fe2O3").unwrap();
/// assert_eq!(balanced.to_string(), "4Fe + 3O2 -> 2Fe2O3");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Balancer {
    config: BalancerConfig,
    table: Option<PeriodicTable>,
}

impl Balancer {
    pub fn new(config: BalancerConfig) -> ChemResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            table: None,
        })
    }

    /// Resolves element symbols against `table` instead of the built-in one.
    pub fn with_table(mut self, table: PeriodicTable) -> Self {
        self.table = Some(table);
        self
    }

    pub fn config(&self) -> &BalancerConfig {
        &self.config
    }

    pub fn table(&self) -> &dyn ElementLookup {
        match &self.table {
            Some(table) => table,
            None => periodic_table(),
        }
    }

    /// the enabled strategies in the order they are tried
    pub fn strategies(&self) -> Vec<Strategy> {
        let mut strategies = Vec::with_capacity(2);
        if self.config.enable_linear_solver {
            strategies.push(create_strategy(StrategyType::Linear, self.config.brute_force_limit));
        }
        if self.config.enable_brute_force {
            strategies.push(create_strategy(
                StrategyType::BruteForce,
                self.config.brute_force_limit,
            ));
        }
        strategies
    }

    pub fn parse(&self, text: &str) -> ChemResult<ChemicalEquation> {
        ChemicalEquation::parse_unvalidated(text, self.table())
    }

    pub fn balance(&self, text: &str) -> ChemResult<BalancedEquation> {
        let equation = self.parse(text)?;
        info!("parsed '{}'", equation);
        self.balance_parsed(&equation)
    }

    /// Balances an already parsed equation. The element sets of the two sides
    /// must agree.
    pub fn balance_parsed(&self, equation: &ChemicalEquation) -> ChemResult<BalancedEquation> {
        equation.validate_elements()?;
        info!("element sets of both sides agree");
        if equation.is_balanced()? {
            info!("'{}' is already balanced", equation);
            return Ok(reduce_stated(equation));
        }

        let system = StoichiometricSystem::from_equation(equation)?;
        debug!("stoichiometric system:\n{}", system.describe());

        for (attempt, strategy) in self.strategies().into_iter().enumerate() {
            if attempt > 0 {
                warn!("falling back to the {}", strategy.name());
            }
            let Some(coefficients) = strategy.find_coefficients(&system) else {
                debug!("{} found no coefficients", strategy.name());
                continue;
            };
            let (reactants, products) = system.split_coefficients(&coefficients);
            let balanced = BalancedEquation::new(reactants, products, strategy.method());
            if !balanced.is_conserved() {
                warn!("{} produced non-conserving {}", strategy.name(), balanced);
                continue;
            }
            info!("balanced by the {}: {}", strategy.name(), balanced);
            return Ok(balanced);
        }
        Err(ChemError::Unbalanceable(equation.to_string()))
    }
}

/// stated multiplicities divided by their gcd
fn reduce_stated(equation: &ChemicalEquation) -> BalancedEquation {
    let divisor = equation
        .reactants()
        .iter()
        .chain(equation.products())
        .fold(0u64, |acc, (_, n)| acc.gcd(n))
        .max(1);
    let reduce = |side: &[(Molecule, u64)]| -> Vec<(Molecule, u64)> {
        side.iter().map(|(m, n)| (m.clone(), n / divisor)).collect()
    };
    BalancedEquation::new(
        reduce(equation.reactants()),
        reduce(equation.products()),
        BalanceMethod::AlreadyBalanced,
    )
}

/// Balances `text` with the default configuration and the built-in periodic table.
pub fn balance_equation(text: &str) -> ChemResult<BalancedEquation> {
    Balancer::default().balance(text)
}

#[cfg(test)]
mod balancer_tests;
