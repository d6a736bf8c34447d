//! Runs the built-in palindrome checker end to end.

use tape_machine::programs::PALINDROME_ACCEPT;
use tape_machine::{
    Configuration, Halt, ProgramManager, TuringMachine, TuringMachineError, DEFAULT_MAX_STEPS,
};

fn check(input: &str) -> TuringMachine {
    let mut machine = ProgramManager::palindrome_machine(input).unwrap();

    assert_eq!(machine.run(DEFAULT_MAX_STEPS), Halt::Final, "input {input:?}");
    machine
}

#[test]
fn empty_input_is_accepted_in_one_step() {
    let machine = check("");

    assert_eq!(machine.state(), "q_accept");
    assert_eq!(machine.step_count(), 1);
    assert_eq!(
        machine.configuration(),
        Configuration {
            state: "q_accept".into(),
            tape: "#".into(),
            head: 1,
        }
    );
}

#[test]
fn single_symbol_is_accepted() {
    let machine = check("a");

    assert_eq!(machine.state(), "q_accept");
    assert_eq!(machine.step_count(), 3);
}

#[test]
fn mismatched_pair_is_rejected_before_budget() {
    let machine = check("ad");

    assert_eq!(machine.state(), "q_reject");
    assert!(machine.step_count() < DEFAULT_MAX_STEPS);
    assert_eq!(machine.step_count(), 4);
}

#[test]
fn palindromes_are_accepted() {
    for input in ["aa", "ada", "radar", "adda", "RADAR", "  rar  ", "ddrrdd"] {
        assert_eq!(check(input).state(), PALINDROME_ACCEPT, "input {input:?}");
    }
}

#[test]
fn non_palindromes_are_rejected() {
    for input in ["ar", "rad", "adar", "radr", "aaad"] {
        assert_eq!(check(input).state(), "q_reject", "input {input:?}");
    }
}

#[test]
fn foreign_symbol_halts_without_transition() {
    let mut machine = ProgramManager::palindrome_machine("abc").unwrap();

    assert_eq!(machine.run(DEFAULT_MAX_STEPS), Halt::NoTransition);
    assert!(!machine.is_final());
    assert!(machine.step_count() < DEFAULT_MAX_STEPS);
}

#[test]
fn embedded_end_marker_is_rejected() {
    for input in ["a#d", "#ad", "r#a", "ada#"] {
        assert!(
            matches!(
                ProgramManager::palindrome_machine(input),
                Err(TuringMachineError::ValidationError(_))
            ),
            "input {input:?}"
        );
    }
}

#[test]
fn underscore_is_an_ordinary_foreign_symbol() {
    let mut machine = ProgramManager::palindrome_machine("a_a").unwrap();
    assert_eq!(machine.configuration().tape, "a_a#");

    assert_eq!(machine.run(DEFAULT_MAX_STEPS), Halt::NoTransition);
    assert_eq!(machine.state(), "carry_a");
    assert_eq!(machine.tape().current_symbol(), '_');
    assert_eq!(machine.step_count(), 1);
}

#[test]
fn small_budget_is_exhausted() {
    let mut machine = ProgramManager::palindrome_machine("radar").unwrap();

    assert_eq!(machine.run(3), Halt::StepLimit);
    assert_eq!(machine.step_count(), 3);

    // Picking up where the budget ran out still reaches the verdict.
    assert_eq!(machine.run(DEFAULT_MAX_STEPS), Halt::Final);
    assert_eq!(machine.state(), PALINDROME_ACCEPT);
}

#[test]
fn repeated_runs_are_identical() {
    let first = check("radar");
    let second = check("radar");

    assert_eq!(first.configuration(), second.configuration());
    assert_eq!(first.step_count(), second.step_count());
}
