use super::*;
use crate::elements::lookup_element;
use approx::assert_relative_eq;
use proptest::prelude::*;

const SKELETONS: [(&str, &str); 6] = [
    ("H2 + O2 -> H2O", "2H2 + O2 -> 2H2O"),
    ("N2 + H2 -> NH3", "N2 + 3H2 -> 2NH3"),
    ("Fe + O2 -> Fe2O3", "4Fe + 3O2 -> 2Fe2O3"),
    ("C3H8 + O2 -> CO2 + H2O", "C3H8 + 5O2 -> 3CO2 + 4H2O"),
    ("Al + O2 -> Al2O3", "4Al + 3O2 -> 2Al2O3"),
    ("Ca(OH)2 + HCl -> CaCl2 + H2O", "Ca(OH)2 + 2HCl -> CaCl2 + 2H2O"),
];

fn gcd_of(coefficients: &[u64]) -> u64 {
    coefficients.iter().fold(0u64, |acc, n| acc.gcd(n))
}

#[test]
fn test_known_equations() {
    for (input, expected) in SKELETONS {
        let balanced = balance_equation(input).unwrap();
        assert_eq!(balanced.to_string(), expected, "input {:?}", input);
        assert_eq!(balanced.method(), BalanceMethod::LinearSolved);
        assert!(balanced.is_conserved());
    }
}

#[test]
fn test_permanganate() {
    let balanced = balance_equation("KMnO4 + HCl -> KCl + MnCl2 + H2O + Cl2").unwrap();
    assert_eq!(
        balanced.to_canonical_string(),
        "2KMnO4 + 16HCl -> 2KCl + 2MnCl2 + 8H2O + 5Cl2"
    );
    assert_eq!(balanced.coefficients(), vec![2, 16, 2, 2, 8, 5]);
}

#[test]
fn test_already_balanced_is_unchanged() {
    let balanced = balance_equation("C + O2 -> CO2").unwrap();
    assert_eq!(balanced.to_string(), "C + O2 -> CO2");
    assert_eq!(balanced.method(), BalanceMethod::AlreadyBalanced);

    let balanced = balance_equation("N2 + 3H2 -> 2NH3").unwrap();
    assert_eq!(balanced.to_string(), "N2 + 3H2 -> 2NH3");
    assert_eq!(balanced.method(), BalanceMethod::AlreadyBalanced);
}

#[test]
fn test_already_balanced_is_reduced() {
    let balanced = balance_equation("4H2 + 2O2 -> 4H2O").unwrap();
    assert_eq!(balanced.to_string(), "2H2 + O2 -> 2H2O");
    assert_eq!(balanced.method(), BalanceMethod::AlreadyBalanced);
}

#[test]
fn test_stated_multipliers_ignored_when_unbalanced() {
    let balanced = balance_equation("3H2 + 3O2 -> 3H2O").unwrap();
    assert_eq!(balanced.to_string(), "2H2 + O2 -> 2H2O");
}

#[test]
fn test_idempotence() {
    for (input, _) in SKELETONS {
        let once = balance_equation(input).unwrap();
        let twice = balance_equation(&once.to_string()).unwrap();
        assert_eq!(once.to_string(), twice.to_string());
        assert_eq!(twice.method(), BalanceMethod::AlreadyBalanced);
    }
}

#[test]
fn test_element_set_mismatch_before_solving() {
    match balance_equation("Na + Cl2 -> CO2") {
        Err(ChemError::ElementSetMismatch {
            reactant_only,
            product_only,
        }) => {
            assert_eq!(reactant_only, vec!["Na".to_string(), "Cl".to_string()]);
            assert_eq!(product_only, vec!["C".to_string(), "O".to_string()]);
        }
        other => panic!("expected element set mismatch, got {:?}", other),
    }
}

#[test]
fn test_syntax_errors_propagate() {
    assert!(matches!(balance_equation("H2 + O2"), Err(ChemError::Syntax(_))));
    assert!(matches!(balance_equation("H2 + O2 -> H2O)"), Err(ChemError::Syntax(_))));
    assert!(matches!(
        balance_equation("Xy + O2 -> XyO"),
        Err(ChemError::UnknownElement(_))
    ));
}

#[test]
fn test_multiplier_overflow_is_an_error() {
    assert!(matches!(
        balance_equation("18446744073709551615H2 -> H2"),
        Err(ChemError::Syntax(_))
    ));
    assert!(matches!(
        balance_equation("18446744073709551615H2 + O2 -> H2O"),
        Err(ChemError::Syntax(_))
    ));
}

#[test]
fn test_conservation_check_with_large_coefficients() {
    let hydrogen = Molecule::parse("H4294967295").unwrap();
    let balanced = BalancedEquation::new(
        vec![(hydrogen.clone(), u64::MAX)],
        vec![(hydrogen.clone(), u64::MAX)],
        BalanceMethod::LinearSolved,
    );
    assert!(balanced.is_conserved());
    let unequal = BalancedEquation::new(
        vec![(hydrogen.clone(), u64::MAX)],
        vec![(hydrogen, u64::MAX - 1)],
        BalanceMethod::LinearSolved,
    );
    assert!(!unequal.is_conserved());
}

#[test]
fn test_brute_force_fallback() {
    let balanced = balance_equation("C2H6 + C3H8 + O2 -> CO2 + H2O").unwrap();
    assert_eq!(balanced.to_string(), "2C2H6 + C3H8 + 12O2 -> 7CO2 + 10H2O");
    assert_eq!(balanced.method(), BalanceMethod::BruteForced);
}

#[test]
fn test_unbalanceable() {
    assert!(matches!(
        balance_equation("H2O -> H2O2"),
        Err(ChemError::Unbalanceable(_))
    ));

    let linear_only = Balancer::new(BalancerConfig {
        enable_brute_force: false,
        ..BalancerConfig::default()
    })
    .unwrap();
    assert!(matches!(
        linear_only.balance("C2H6 + C3H8 + O2 -> CO2 + H2O"),
        Err(ChemError::Unbalanceable(_))
    ));
}

#[test]
fn test_brute_force_limit_is_respected() {
    let small = Balancer::new(BalancerConfig {
        enable_linear_solver: false,
        brute_force_limit: 4,
        ..BalancerConfig::default()
    })
    .unwrap();
    assert!(small.balance("Fe + O2 -> Fe2O3").is_ok());
    assert!(matches!(
        small.balance("C3H8 + O2 -> CO2 + H2O"),
        Err(ChemError::Unbalanceable(_))
    ));
}

#[test]
fn test_disabled_strategies_rejected() {
    let result = Balancer::new(BalancerConfig {
        enable_linear_solver: false,
        enable_brute_force: false,
        ..BalancerConfig::default()
    });
    assert!(matches!(result, Err(ChemError::InvalidConfig(_))));
}

#[test]
fn test_strategy_chain_follows_config() {
    let brute_only = Balancer::new(BalancerConfig {
        enable_linear_solver: false,
        ..BalancerConfig::default()
    })
    .unwrap();
    let names: Vec<&str> = brute_only.strategies().iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["brute force search"]);
    let names: Vec<&str> = Balancer::default().strategies().iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["rational solver", "brute force search"]);
}

#[test]
fn test_coefficient_maps() {
    let balanced = balance_equation("N2 + H2 -> NH3").unwrap();
    let reactants = balanced.reactant_map();
    let products = balanced.product_map();
    assert_eq!(reactants[&Molecule::parse("H2").unwrap()], 3);
    assert_eq!(reactants[&Molecule::parse("N2").unwrap()], 1);
    assert_eq!(products[&Molecule::parse("NH3").unwrap()], 2);
    assert_eq!(
        balanced.coefficient_of(&Molecule::parse("H3N").unwrap()),
        Some((Side::Product, 2))
    );
    assert_eq!(balanced.coefficient_of(&Molecule::parse("O2").unwrap()), None);
}

#[test]
fn test_json_report() {
    let balanced = balance_equation("H2 + O2 -> H2O").unwrap();
    let report = balanced.report();
    assert_eq!(report.equation, "2H2 + O2 -> 2H2O");
    assert_relative_eq!(report.reactants[0].relative_formula_mass, 2.016, epsilon = 1e-9);
    assert_relative_eq!(report.products[0].relative_formula_mass, 18.015, epsilon = 1e-9);

    let json: serde_json::Value = serde_json::from_str(&balanced.to_json().unwrap()).unwrap();
    assert_eq!(json["method"], "linear_solved");
    assert_eq!(json["reactants"][0]["formula"], "H2");
    assert_eq!(json["reactants"][0]["coefficient"], 2);
    assert_eq!(json["products"][0]["coefficient"], 2);

    let back: BalanceReport = serde_json::from_str(&balanced.to_json().unwrap()).unwrap();
    assert_eq!(back, report);
}

#[test]
fn test_custom_table() {
    let mut table = PeriodicTable::new();
    table.insert(lookup_element("H").unwrap().clone());
    table.insert(lookup_element("O").unwrap().clone());
    let balancer = Balancer::default().with_table(table);
    assert_eq!(
        balancer.balance("H2 + O2 -> H2O").unwrap().to_string(),
        "2H2 + O2 -> 2H2O"
    );
    assert!(matches!(
        balancer.balance("C + O2 -> CO2"),
        Err(ChemError::UnknownElement(_))
    ));
}

#[test]
fn test_balancer_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Balancer>();

    let balancer = Balancer::default();
    std::thread::scope(|scope| {
        let handles: Vec<_> = SKELETONS
            .iter()
            .map(|(input, expected)| {
                let balancer = &balancer;
                scope.spawn(move || assert_eq!(balancer.balance(input).unwrap().to_string(), *expected))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    });
}

// every molecule of `input` prefixed with the same multiplier
fn scaled(input: &str, multiplier: u64) -> String {
    let render = |side: &str| {
        side.split(" + ")
            .map(|f| format!("{}{}", multiplier, f))
            .collect::<Vec<_>>()
            .join(" + ")
    };
    let (left, right) = input.split_once(" -> ").unwrap();
    format!("{} -> {}", render(left), render(right))
}

proptest! {
    #[test]
    fn prop_balanced_output_is_conserved_and_minimal(
        index in 0..SKELETONS.len(),
        multiplier in 1u64..6,
    ) {
        let (input, expected) = SKELETONS[index];
        let balanced = balance_equation(&scaled(input, multiplier)).unwrap();
        prop_assert!(balanced.is_conserved());
        prop_assert_eq!(gcd_of(&balanced.coefficients()), 1);
        prop_assert_eq!(balanced.to_string(), expected);
    }

    #[test]
    fn prop_brute_force_agrees_with_linear_solver(
        index in 0..SKELETONS.len(),
        multiplier in 1u64..6,
    ) {
        let text = scaled(SKELETONS[index].0, multiplier);
        let linear_only = Balancer::new(BalancerConfig {
            enable_brute_force: false,
            ..BalancerConfig::default()
        })
        .unwrap();
        let brute_only = Balancer::new(BalancerConfig {
            enable_linear_solver: false,
            ..BalancerConfig::default()
        })
        .unwrap();

        let linear = linear_only.balance(&text).unwrap();
        let brute = brute_only.balance(&text).unwrap();
        prop_assert_eq!(linear.method(), BalanceMethod::LinearSolved);
        prop_assert_eq!(brute.method(), BalanceMethod::BruteForced);
        prop_assert_eq!(linear.coefficients(), brute.coefficients());
    }
}
