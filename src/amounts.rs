//! Reaction amounts for a balanced equation: which reactant runs out first
//! and how many moles are consumed and formed.
//!
//! Amounts are given per reactant formula. Reactants without a stated amount
//! are taken to be in excess. The extent of reaction is the smallest ratio
//! `moles / coefficient` over the stated reactants.
use crate::balancer::BalancedEquation;
use crate::elements::{ElementLookup, periodic_table};
use crate::equation::Side;
use crate::error::{ChemError, ChemResult};
use crate::formula::Molecule;
use log::debug;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct ReactionAmounts {
    limiting_reagent: Molecule,
    extent: f64,
    consumed: Vec<(Molecule, f64)>,
    formed: Vec<(Molecule, f64)>,
    leftover: Vec<(Molecule, f64)>,
}

impl ReactionAmounts {
    pub fn from_reactant_moles(balanced: &BalancedEquation, moles: &HashMap<String, f64>) -> ChemResult<Self> {
        Self::from_reactant_moles_with(balanced, moles, periodic_table())
    }

    /// Same as [`Self::from_reactant_moles`] with formulas resolved against `table`.
    pub fn from_reactant_moles_with(
        balanced: &BalancedEquation,
        moles: &HashMap<String, f64>,
        table: &dyn ElementLookup,
    ) -> ChemResult<Self> {
        let stated = stated_reactants(balanced, moles, table, |_, amount| amount)?;
        Self::from_stated(balanced, stated)
    }

    /// Amounts given in grams; converted to moles with each reactant's
    /// relative formula mass.
    pub fn from_reactant_masses(balanced: &BalancedEquation, grams: &HashMap<String, f64>) -> ChemResult<Self> {
        let stated = stated_reactants(balanced, grams, periodic_table(), |molecule, mass| {
            mass / molecule.relative_formula_mass()
        })?;
        Self::from_stated(balanced, stated)
    }

    fn from_stated(balanced: &BalancedEquation, stated: Vec<(Molecule, u64, f64)>) -> ChemResult<Self> {
        let (limiting_reagent, extent) = stated
            .iter()
            .map(|(molecule, coefficient, amount)| (molecule, amount / *coefficient as f64))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(molecule, extent)| (molecule.clone(), extent))
            .ok_or_else(|| ChemError::InvalidAmount("no reactant amounts given".to_string()))?;
        debug!("limiting reagent {} with extent {}", limiting_reagent, extent);

        let scale = |side: &[(Molecule, u64)]| -> Vec<(Molecule, f64)> {
            side.iter()
                .filter(|(_, n)| *n != 0)
                .map(|(molecule, n)| (molecule.clone(), extent * *n as f64))
                .collect()
        };
        let leftover = stated
            .iter()
            .map(|(molecule, coefficient, amount)| {
                (molecule.clone(), (amount - extent * *coefficient as f64).max(0.0))
            })
            .collect();

        Ok(Self {
            limiting_reagent,
            extent,
            consumed: scale(balanced.reactants()),
            formed: scale(balanced.products()),
            leftover,
        })
    }

    pub fn limiting_reagent(&self) -> &Molecule {
        &self.limiting_reagent
    }

    /// moles of "reaction units" that take place
    pub fn extent(&self) -> f64 {
        self.extent
    }

    pub fn consumed(&self) -> &[(Molecule, f64)] {
        &self.consumed
    }

    pub fn formed(&self) -> &[(Molecule, f64)] {
        &self.formed
    }

    /// unreacted moles of every reactant whose amount was given
    pub fn leftover(&self) -> &[(Molecule, f64)] {
        &self.leftover
    }

    pub fn consumed_moles(&self, molecule: &Molecule) -> Option<f64> {
        find(&self.consumed, molecule)
    }

    pub fn formed_moles(&self, molecule: &Molecule) -> Option<f64> {
        find(&self.formed, molecule)
    }

    pub fn formed_mass(&self, molecule: &Molecule) -> Option<f64> {
        self.formed_moles(molecule)
            .map(|moles| moles * molecule.relative_formula_mass())
    }
}

fn find(amounts: &[(Molecule, f64)], molecule: &Molecule) -> Option<f64> {
    amounts
        .iter()
        .find(|(m, _)| m == molecule)
        .map(|(_, amount)| *amount)
}

/// Resolves each formula to a reactant of `balanced` and converts its amount
/// to moles with `to_moles`.
fn stated_reactants(
    balanced: &BalancedEquation,
    amounts: &HashMap<String, f64>,
    table: &dyn ElementLookup,
    to_moles: impl Fn(&Molecule, f64) -> f64,
) -> ChemResult<Vec<(Molecule, u64, f64)>> {
    let mut stated = Vec::with_capacity(amounts.len());
    for (formula, &amount) in amounts {
        if !amount.is_finite() || amount < 0.0 {
            return Err(ChemError::InvalidAmount(format!("{} of {}", amount, formula)));
        }
        let molecule = Molecule::parse_with(formula, table)?;
        match balanced.coefficient_of(&molecule) {
            Some((Side::Reactant, 0)) => {
                debug!("{} does not react, ignoring its amount", molecule);
            }
            Some((Side::Reactant, coefficient)) => {
                let moles = to_moles(&molecule, amount);
                stated.push((molecule, coefficient, moles));
            }
            Some((Side::Product, _)) => {
                return Err(ChemError::InvalidAmount(format!(
                    "{} is a product, amounts are given for reactants",
                    formula
                )));
            }
            None => return Err(ChemError::NotInReaction(formula.clone())),
        }
    }
    Ok(stated)
}
