//! This module defines the `TuringMachine` struct, which simulates a single-tape
//! deterministic Turing Machine. It owns its tape, tracks the current state and the
//! number of executed steps, and runs transitions until it halts.

use std::collections::HashSet;

use crate::tape::Tape;
use crate::types::{
    Configuration, Halt, Program, Step, Transition, TransitionTable, INPUT_BLANK_SYMBOL,
};

/// Represents a single-tape Turing Machine.
///
/// The transition table and final states are fixed at construction. The tape, the
/// current state and the step counter change as transitions fire.
#[derive(Debug, Clone)]
pub struct TuringMachine {
    state: String,
    tape: Tape,
    final_states: HashSet<String>,
    rules: TransitionTable,
    step_count: usize,
    initial_state: String,
    initial_tape: Tape,
}

impl TuringMachine {
    /// Creates a new `TuringMachine` driving `tape`.
    ///
    /// # Arguments
    ///
    /// * `tape` - The tape the machine reads and writes.
    /// * `initial_state` - The state the machine starts in.
    /// * `final_states` - States that end a run successfully.
    /// * `rules` - The transition table.
    pub fn new<S>(
        tape: Tape,
        initial_state: impl Into<String>,
        final_states: impl IntoIterator<Item = S>,
        rules: TransitionTable,
    ) -> Self
    where
        S: Into<String>,
    {
        let initial_state = initial_state.into();

        Self {
            state: initial_state.clone(),
            initial_tape: tape.clone(),
            tape,
            final_states: final_states.into_iter().map(Into::into).collect(),
            rules,
            step_count: 0,
            initial_state,
        }
    }

    /// Creates a machine from a parsed `Program`, with the program's tape loaded.
    pub fn from_program(program: &Program) -> Self {
        Self::new(
            Tape::new(&program.tape, program.blank),
            program.initial_state.clone(),
            program.final_states.iter().cloned(),
            program.rules.clone(),
        )
    }

    /// Executes a single transition.
    ///
    /// Reads the symbol under the head and looks up the rule for the current state. If
    /// there is one, the machine writes, moves, changes state and counts the step. If
    /// there isn't, nothing changes.
    ///
    /// # Returns
    ///
    /// * `Step::Continue` if a transition fired.
    /// * `Step::Halt(Halt::NoTransition)` if no rule matched.
    pub fn step(&mut self) -> Step {
        let symbol = self.tape.current_symbol();

        let Some(Transition {
            next_state,
            write,
            direction,
        }) = self.rules.get(&self.state, symbol).cloned()
        else {
            tracing::debug!(state = %self.state, symbol = ?symbol, "no transition");
            return Step::Halt(Halt::NoTransition);
        };

        tracing::trace!(
            step = self.step_count + 1,
            state = %self.state,
            read = ?symbol,
            write = ?write,
            %direction,
            next = %next_state,
            "transition"
        );

        self.tape.write(write);
        self.tape.move_head(direction);
        self.state = next_state;
        self.step_count += 1;

        Step::Continue
    }

    /// Runs the machine until it reaches a final state, finds no transition, or has
    /// executed `max_steps` steps in total.
    ///
    /// ```
    /// use tape_machine::{Direction, Halt, Tape, TransitionTable, TuringMachine};
    ///
    /// let rules = TransitionTable::new().rule("q0", '#', "q_accept", '#', Direction::Right);
    /// let mut machine = TuringMachine::new(Tape::new("#", ' '), "q0", ["q_accept"], rules);
    ///
    /// assert_eq!(machine.run(1000), Halt::Final);
    /// assert_eq!(machine.step_count(), 1);
    /// ```
    pub fn run(&mut self, max_steps: usize) -> Halt {
        self.run_with(max_steps, |_| {})
    }

    /// Like [`TuringMachine::run`], calling `on_step` after every executed transition.
    pub fn run_with<F>(&mut self, max_steps: usize, mut on_step: F) -> Halt
    where
        F: FnMut(&TuringMachine),
    {
        let mut stuck = false;

        while !self.is_final() && self.step_count < max_steps {
            match self.step() {
                Step::Continue => on_step(self),
                Step::Halt(_) => {
                    stuck = true;
                    break;
                }
            }
        }

        let halt = if self.is_final() {
            Halt::Final
        } else if stuck {
            Halt::NoTransition
        } else {
            Halt::StepLimit
        };

        tracing::debug!(?halt, state = %self.state, steps = self.step_count, "run finished");
        halt
    }

    /// Returns a snapshot of the current state, tape contents and head position.
    pub fn configuration(&self) -> Configuration {
        Configuration {
            state: self.state.clone(),
            tape: self.tape.contents(),
            head: self.tape.head_position(),
        }
    }

    /// Returns the current state of the machine.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns the initial state of the machine.
    pub fn initial_state(&self) -> &str {
        &self.initial_state
    }

    /// Returns the total number of steps executed by the machine.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn final_states(&self) -> &HashSet<String> {
        &self.final_states
    }

    /// Checks if the machine is currently in one of its final states.
    pub fn is_final(&self) -> bool {
        self.final_states.contains(&self.state)
    }

    /// Returns the transition the next call to [`TuringMachine::step`] would fire.
    pub fn transition(&self) -> Option<&Transition> {
        self.rules.get(&self.state, self.tape.current_symbol())
    }

    /// Resets the machine to its initial configuration.
    /// This includes resetting the state, the tape and the step count.
    pub fn reset(&mut self) {
        self.state = self.initial_state.clone();
        self.tape = self.initial_tape.clone();
        self.step_count = 0;
    }

    /// Loads new tape content and rewinds the machine.
    ///
    /// `_` in `content` is written as the tape's blank symbol. The new content also
    /// becomes the configuration restored by [`TuringMachine::reset`].
    pub fn set_tape(&mut self, content: &str) {
        let blank = self.tape.blank();
        let content: String = content
            .chars()
            .map(|c| if c == INPUT_BLANK_SYMBOL { blank } else { c })
            .collect();

        self.load_tape(Tape::new(&content, blank));
    }

    /// Installs `tape` as is and rewinds the machine. The tape becomes the
    /// configuration restored by [`TuringMachine::reset`].
    pub fn load_tape(&mut self, tape: Tape) {
        self.initial_tape = tape;
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;

    /// Moves right over `a`s and accepts on the first blank.
    fn create_scanner() -> TuringMachine {
        let rules = TransitionTable::new()
            .rule("scan", 'a', "scan", 'a', Direction::Right)
            .rule("scan", '_', "done", '_', Direction::Left);

        TuringMachine::new(Tape::new("aaa", '_'), "scan", ["done"], rules)
    }

    /// Never reaches a final state: bounces between two cells forever.
    fn create_looper() -> TuringMachine {
        let rules = TransitionTable::new()
            .rule("ping", '_', "pong", '_', Direction::Right)
            .rule("pong", '_', "ping", '_', Direction::Left);

        TuringMachine::new(Tape::new("", '_'), "ping", ["never"], rules)
    }

    #[test]
    fn test_machine_creation() {
        let machine = create_scanner();

        assert_eq!(machine.state(), "scan");
        assert_eq!(machine.initial_state(), "scan");
        assert_eq!(machine.step_count(), 0);
        assert!(!machine.is_final());
        assert_eq!(machine.tape().contents(), "aaa");
    }

    #[test]
    fn test_single_step() {
        let mut machine = create_scanner();

        assert_eq!(machine.step(), Step::Continue);
        assert_eq!(machine.state(), "scan");
        assert_eq!(machine.tape().head_position(), 1);
        assert_eq!(machine.step_count(), 1);
    }

    #[test]
    fn test_step_without_transition_changes_nothing() {
        let rules = TransitionTable::new().rule("q0", 'a', "q1", 'b', Direction::Right);
        let mut machine = TuringMachine::new(Tape::new("z", '_'), "q0", ["q1"], rules);
        let before = machine.configuration();

        assert_eq!(machine.step(), Step::Halt(Halt::NoTransition));
        assert_eq!(machine.configuration(), before);
        assert_eq!(machine.step_count(), 0);
    }

    #[test]
    fn test_run_to_final_state() {
        let mut machine = create_scanner();

        assert_eq!(machine.run(1000), Halt::Final);
        assert_eq!(machine.state(), "done");
        assert_eq!(machine.step_count(), 4);
        assert_eq!(
            machine.configuration(),
            Configuration {
                state: "done".into(),
                tape: "aaa_".into(),
                head: 2,
            }
        );
    }

    #[test]
    fn test_run_stops_at_final_state_with_outgoing_rules() {
        let rules = TransitionTable::new()
            .rule("q0", 'a', "q1", 'a', Direction::Right)
            .rule("q1", 'a', "q0", 'a', Direction::Right);
        let mut machine = TuringMachine::new(Tape::new("aaaa", '_'), "q0", ["q1"], rules);

        assert_eq!(machine.run(1000), Halt::Final);
        assert_eq!(machine.step_count(), 1);
    }

    #[test]
    fn test_run_from_final_state_executes_nothing() {
        let rules = TransitionTable::new().rule("q0", 'a', "q0", 'b', Direction::Right);
        let mut machine = TuringMachine::new(Tape::new("a", '_'), "q0", ["q0"], rules);

        assert_eq!(machine.run(1000), Halt::Final);
        assert_eq!(machine.step_count(), 0);
        assert_eq!(machine.tape().contents(), "a");
    }

    #[test]
    fn test_missing_transition_is_distinguished_from_step_limit() {
        let rules = TransitionTable::new()
            .rule("q0", 'a', "q1", 'a', Direction::Right)
            .rule("q1", 'b', "q2", 'b', Direction::Right);
        let mut machine = TuringMachine::new(Tape::new("ac", '_'), "q0", ["q2"], rules);

        let halt = machine.run(3);
        assert_eq!(halt, Halt::NoTransition);
        assert_eq!(machine.state(), "q1");
        assert!(!machine.is_final());
        assert!(machine.step_count() < 3);

        let mut looper = create_looper();
        let halt = looper.run(3);
        assert_eq!(halt, Halt::StepLimit);
        assert!(!looper.is_final());
        assert_eq!(looper.step_count(), 3);
    }

    #[test]
    fn test_step_limit_counts_total_steps() {
        let mut machine = create_looper();
        machine.step();
        machine.step();

        assert_eq!(machine.run(3), Halt::StepLimit);
        assert_eq!(machine.step_count(), 3);

        // Budget already spent.
        assert_eq!(machine.run(3), Halt::StepLimit);
        assert_eq!(machine.step_count(), 3);
    }

    #[test]
    fn test_run_with_zero_budget() {
        let mut machine = create_scanner();

        assert_eq!(machine.run(0), Halt::StepLimit);
        assert_eq!(machine.step_count(), 0);
    }

    #[test]
    fn test_run_with_observer() {
        let mut machine = create_scanner();
        let mut seen = Vec::new();

        machine.run_with(1000, |m| seen.push(m.step_count()));

        assert_eq!(seen, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_left_extension_during_run() {
        // Writes 'x' two cells left of the start, then accepts.
        let rules = TransitionTable::new()
            .rule("q0", 'a', "q1", 'a', Direction::Left)
            .rule("q1", '_', "q2", '_', Direction::Left)
            .rule("q2", '_', "done", 'x', Direction::Right);
        let mut machine = TuringMachine::new(Tape::new("a", '_'), "q0", ["done"], rules);

        assert_eq!(machine.run(1000), Halt::Final);
        assert_eq!(
            machine.configuration(),
            Configuration {
                state: "done".into(),
                tape: "x_a".into(),
                head: 1,
            }
        );
    }

    #[test]
    fn test_transition_preview() {
        let machine = create_scanner();

        assert_eq!(
            machine.transition(),
            Some(&Transition::new("scan", 'a', Direction::Right))
        );
    }

    #[test]
    fn test_reset() {
        let mut machine = create_scanner();
        machine.run(1000);
        assert_eq!(machine.state(), "done");

        machine.reset();
        assert_eq!(machine.state(), "scan");
        assert_eq!(machine.step_count(), 0);
        assert_eq!(machine.tape().contents(), "aaa");
        assert_eq!(machine.tape().head_position(), 0);
    }

    #[test]
    fn test_set_tape_with_blank_symbol() {
        let rules = TransitionTable::new();
        let mut machine = TuringMachine::new(Tape::new("", '-'), "q0", ["q1"], rules);

        machine.set_tape("a_b");
        assert_eq!(machine.tape().contents(), "a-b");

        machine.reset();
        assert_eq!(machine.tape().contents(), "a-b");
    }

    #[test]
    fn test_load_tape_keeps_symbols_literal() {
        let mut machine = create_scanner();
        machine.run(1000);

        machine.load_tape(Tape::new("a_a", '-'));
        assert_eq!(machine.state(), "scan");
        assert_eq!(machine.step_count(), 0);
        assert_eq!(machine.tape().contents(), "a_a");
        assert_eq!(machine.tape().blank(), '-');

        machine.step();
        machine.reset();
        assert_eq!(machine.tape().contents(), "a_a");
        assert_eq!(machine.tape().head_position(), 0);
    }
}
