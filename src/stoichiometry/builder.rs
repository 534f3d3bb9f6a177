//! Turns reactant/product molecules into one conservation equation per element.
use super::linear_equation::{LinearEquation, Term};
use super::variables::{CoefficientVariable, VarId};
use crate::elements::Element;
use crate::equation::{ChemicalEquation, Side};
use crate::error::ChemResult;
use crate::formula::Molecule;
use std::collections::BTreeSet;

/// Variables, molecules and element equations of one balancing attempt.
#[derive(Debug, Clone)]
pub struct StoichiometricSystem {
    variables: Vec<CoefficientVariable>,
    reactants: Vec<Molecule>,
    products: Vec<Molecule>,
    elements: Vec<Element>,
    equations: Vec<LinearEquation>,
}

impl StoichiometricSystem {
    /// Variables are numbered reactants first, then products. Equations are
    /// built for every element found in the reactants, in atomic-number order.
    pub fn build(reactants: &[Molecule], products: &[Molecule]) -> ChemResult<Self> {
        let mut variables = Vec::with_capacity(reactants.len() + products.len());
        for i in 0..reactants.len() {
            variables.push(CoefficientVariable {
                id: VarId(variables.len()),
                side: Side::Reactant,
                molecule_index: i,
            });
        }
        for i in 0..products.len() {
            variables.push(CoefficientVariable {
                id: VarId(variables.len()),
                side: Side::Product,
                molecule_index: i,
            });
        }

        let elements: Vec<Element> = reactants
            .iter()
            .flat_map(|m| m.elements().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut equations = Vec::with_capacity(elements.len());
        for element in &elements {
            let mut left = Vec::new();
            let mut right = Vec::new();
            for variable in &variables {
                let molecule = match variable.side {
                    Side::Reactant => &reactants[variable.molecule_index],
                    Side::Product => &products[variable.molecule_index],
                };
                let count = molecule.count_of(element);
                if count == 0 {
                    continue;
                }
                let term = Term::new(variable.id, count as i64);
                match variable.side {
                    Side::Reactant => left.push(term),
                    Side::Product => right.push(term),
                }
            }
            equations.push(LinearEquation::new(left, right)?);
        }

        Ok(Self {
            variables,
            reactants: reactants.to_vec(),
            products: products.to_vec(),
            elements,
            equations,
        })
    }

    pub fn from_equation(equation: &ChemicalEquation) -> ChemResult<Self> {
        Self::build(&equation.reactant_molecules(), &equation.product_molecules())
    }

    pub fn variables(&self) -> &[CoefficientVariable] {
        &self.variables
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn equations(&self) -> &[LinearEquation] {
        &self.equations
    }

    /// the element each equation conserves, same order as `equations()`
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn reactants(&self) -> &[Molecule] {
        &self.reactants
    }

    pub fn products(&self) -> &[Molecule] {
        &self.products
    }

    pub fn molecule(&self, var: VarId) -> Option<&Molecule> {
        let variable = self.variables.get(var.index())?;
        match variable.side {
            Side::Reactant => self.reactants.get(variable.molecule_index),
            Side::Product => self.products.get(variable.molecule_index),
        }
    }

    /// Splits a flat coefficient vector (indexed by `VarId`) into reactant
    /// and product parts.
    pub fn split_coefficients(&self, coefficients: &[u64]) -> (Vec<(Molecule, u64)>, Vec<(Molecule, u64)>) {
        let mut reactants = Vec::with_capacity(self.reactants.len());
        let mut products = Vec::with_capacity(self.products.len());
        for (variable, &n) in self.variables.iter().zip(coefficients) {
            match variable.side {
                Side::Reactant => reactants.push((self.reactants[variable.molecule_index].clone(), n)),
                Side::Product => products.push((self.products[variable.molecule_index].clone(), n)),
            }
        }
        (reactants, products)
    }

    /// one line per variable and per element equation, for debug logs
    pub fn describe(&self) -> String {
        let mut lines = Vec::new();
        for variable in &self.variables {
            if let Some(molecule) = self.molecule(variable.id) {
                lines.push(format!("{} := {} ({:?})", variable.id, molecule, variable.side));
            }
        }
        for (element, equation) in self.elements.iter().zip(&self.equations) {
            lines.push(format!("{}: {}", element, equation));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system(text: &str) -> StoichiometricSystem {
        StoichiometricSystem::from_equation(&ChemicalEquation::parse(text).unwrap()).unwrap()
    }

    #[test]
    fn test_water_system() {
        let system = system("H2 + O2 -> H2O");
        assert_eq!(system.variable_count(), 3);
        let symbols: Vec<&str> = system.elements().iter().map(|e| e.symbol()).collect();
        assert_eq!(symbols, vec!["H", "O"]);
        let equations: Vec<String> = system.equations().iter().map(|e| e.to_string()).collect();
        assert_eq!(equations, vec!["2A = 2C", "2B = C"]);
    }

    #[test]
    fn test_variables_are_tagged_by_side() {
        let system = system("KMnO4 + HCl -> KCl + MnCl2 + H2O + Cl2");
        assert_eq!(system.variable_count(), 6);
        let sides: Vec<Side> = system.variables().iter().map(|v| v.side).collect();
        assert_eq!(sides[..2], [Side::Reactant, Side::Reactant]);
        assert!(sides[2..].iter().all(|&s| s == Side::Product));
        assert_eq!(system.molecule(VarId(3)).unwrap().formula(), "MnCl2");
        let chlorine = system
            .elements()
            .iter()
            .position(|e| e.symbol() == "Cl")
            .unwrap();
        assert_eq!(system.equations()[chlorine].to_string(), "B = C + 2D + 2F");
    }

    #[test]
    fn test_same_molecule_on_both_sides_gets_two_variables() {
        let system = system("H2O + C -> CO + H2 + H2O");
        assert_eq!(system.variable_count(), 5);
        assert_eq!(system.variables()[4].side, Side::Product);
        let hydrogen = system.elements().iter().position(|e| e.symbol() == "H").unwrap();
        assert_eq!(system.equations()[hydrogen].to_string(), "2A = 2D + 2E");
    }

    #[test]
    fn test_split_coefficients() {
        let system = system("N2 + H2 -> NH3");
        let (reactants, products) = system.split_coefficients(&[1, 3, 2]);
        assert_eq!(reactants[1].0.formula(), "H2");
        assert_eq!(reactants[1].1, 3);
        assert_eq!(products[0].1, 2);
        assert!(system.describe().contains("N: 2A = C"));
    }
}
