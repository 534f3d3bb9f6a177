//! Exhaustive search over small integer coefficients.
//!
//! Only used when the rational solver cannot order the equations. The search
//! is exponential in the number of molecules; `limit` bounds every
//! coefficient and is not a guarantee that a solution, if one exists, is found.
use crate::elements::Element;
use crate::formula::Molecule;
use log::debug;
use num_integer::Integer;
use std::collections::BTreeSet;

/// Coefficient bound used when none is configured.
pub const DEFAULT_BRUTE_FORCE_LIMIT: u32 = 15;
/// Largest bound a configuration may ask for.
pub const MAX_BRUTE_FORCE_LIMIT: u32 = 10_000;

/// Finds the first coefficient vector (reactants then products, each entry
/// in `1..=limit`, lexicographic order) that conserves every element, reduced
/// by its gcd.
pub fn brute_force(reactants: &[Molecule], products: &[Molecule], limit: u32) -> Option<Vec<u64>> {
    if limit == 0 || reactants.is_empty() || products.is_empty() {
        return None;
    }
    let elements: Vec<Element> = reactants
        .iter()
        .chain(products)
        .flat_map(|m| m.elements().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    // signed atom counts: reactants add, products subtract. u32 counts times
    // u32 coefficients summed over the molecules stay well inside i128.
    let rows: Vec<Vec<i128>> = reactants
        .iter()
        .map(|m| (m, 1i128))
        .chain(products.iter().map(|m| (m, -1i128)))
        .map(|(m, sign)| {
            elements
                .iter()
                .map(|e| sign * m.count_of(e) as i128)
                .collect()
        })
        .collect();

    let mut search = Search {
        rows: &rows,
        limit: limit as i128,
        coefficients: vec![0; rows.len()],
        totals: vec![0; elements.len()],
        visited: 0,
    };
    let found = search.assign(0);
    debug!(
        "brute force over {} molecules (limit {}) visited {} assignments",
        rows.len(),
        limit,
        search.visited
    );
    if !found {
        return None;
    }
    let divisor = search
        .coefficients
        .iter()
        .fold(0u64, |acc, &n| acc.gcd(&(n as u64)));
    Some(
        search
            .coefficients
            .iter()
            .map(|&n| n as u64 / divisor.max(1))
            .collect(),
    )
}

struct Search<'a> {
    rows: &'a [Vec<i128>],
    limit: i128,
    coefficients: Vec<i128>,
    totals: Vec<i128>,
    visited: u64,
}

impl Search<'_> {
    fn assign(&mut self, position: usize) -> bool {
        if position == self.rows.len() {
            self.visited += 1;
            return self.totals.iter().all(|&t| t == 0);
        }
        for coefficient in 1..=self.limit {
            self.coefficients[position] = coefficient;
            self.shift_totals(position, coefficient);
            if self.assign(position + 1) {
                return true;
            }
            self.shift_totals(position, -coefficient);
        }
        false
    }

    fn shift_totals(&mut self, position: usize, coefficient: i128) {
        for (total, &count) in self.totals.iter_mut().zip(&self.rows[position]) {
            *total += coefficient * count;
        }
    }
}
