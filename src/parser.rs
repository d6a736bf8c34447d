//! This module provides the parser for `.tur` program files, utilizing the `pest` crate.
//! It defines the grammar binding and the functions that turn a parse tree into a `Program`.

use crate::{
    analyzer::analyze,
    types::{
        Direction, Program, Transition, TransitionTable, TuringMachineError,
        DEFAULT_BLANK_SYMBOL, INPUT_BLANK_SYMBOL, MAX_PROGRAM_SIZE,
    },
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::{Pair, Pairs},
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::{BTreeSet, HashSet};

/// Derives a `PestParser` for the program grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct TuringMachineParser;

/// Parses the given input string into a `Program` struct.
///
/// This is the main entry point for parsing program definitions. It trims the input,
/// parses it using the `TuringMachineParser`, and then processes the resulting parse
/// tree into a structured `Program`. The parsed program is validated before being
/// returned.
///
/// # Arguments
///
/// * `input` - A string slice containing the program definition.
///
/// # Returns
///
/// * `Ok(Program)` if the input is successfully parsed and validated.
/// * `Err(TuringMachineError::ParseError)` if there are any syntax errors.
/// * `Err(TuringMachineError::InvalidDirection)` if a rule moves the head in an unknown direction.
/// * `Err(TuringMachineError::ValidationError)` if the program fails validation.
pub fn parse(input: &str) -> Result<Program, TuringMachineError> {
    if input.len() > MAX_PROGRAM_SIZE {
        return Err(TuringMachineError::ValidationError(format!(
            "Program is too large: {} bytes (limit {} bytes)",
            input.len(),
            MAX_PROGRAM_SIZE
        )));
    }

    let root = TuringMachineParser::parse(Rule::program, input.trim())
        .map_err(|e| TuringMachineError::ParseError(e.into()))?
        .next()
        .ok_or_else(|| TuringMachineError::ValidationError("Empty program".into()))?;

    let program = parse_program(root)?;

    analyze(&program)?;
    tracing::debug!(name = %program.name, rules = program.rules.len(), "parsed program");

    Ok(program)
}

/// Parses the top-level structure of a program from a `Pair<Rule::program>`.
fn parse_program(pair: Pair<Rule>) -> Result<Program, TuringMachineError> {
    let mut name: Option<String> = None;
    let mut blank: Option<char> = None;
    let mut tape: Option<Vec<char>> = None;
    let mut final_states: Option<BTreeSet<String>> = None;
    let mut blocks: Option<Vec<StateBlock>> = None;
    let mut seen = HashSet::new();

    for p in pair.into_inner() {
        let span = p.as_span();
        let rule = p.as_rule();

        check_unique_rule(rule, span, &mut seen)?;

        match rule {
            Rule::name => name = Some(parse_inner_string(p).trim().to_string()),
            Rule::blank => blank = Some(parse_symbol(&parse_inner_string(p))),
            Rule::tape => tape = Some(parse_symbols(p)),
            Rule::final_states => final_states = Some(parse_state_names(p)),
            Rule::rules => blocks = Some(parse_state_blocks(p)?),
            _ => {} // EOI
        }
    }

    let name = check_required_rule(name, "name")?;
    let blocks = check_required_rule(blocks, "rules")?;
    let initial_state = blocks
        .first()
        .map(|block| block.state.clone())
        .ok_or_else(|| TuringMachineError::ValidationError("No states defined".into()))?;
    let blank = blank.unwrap_or(DEFAULT_BLANK_SYMBOL);

    // Without an explicit `final:` section, states declared with no rules are final.
    let final_states = final_states.unwrap_or_else(|| {
        blocks
            .iter()
            .filter(|block| block.actions.is_empty())
            .map(|block| block.state.clone())
            .collect()
    });

    let tape = tape
        .unwrap_or_default()
        .into_iter()
        .map(|symbol| rewrite_blank(symbol, blank))
        .collect();

    Ok(Program {
        name,
        initial_state,
        final_states,
        tape,
        blank,
        rules: build_table(blocks, blank)?,
    })
}

/// Parses the `rules:` section into state blocks, rejecting repeated states.
fn parse_state_blocks(pair: Pair<Rule>) -> Result<Vec<StateBlock>, TuringMachineError> {
    let mut blocks: Vec<StateBlock> = Vec::new();

    for block_pair in pair.into_inner() {
        let span = block_pair.as_span();
        let block = parse_state_block(block_pair)?;

        if blocks.iter().any(|b| b.state == block.state) {
            return Err(parse_error(
                &format!("Duplicate transition rule: {}", block.state),
                span,
            ));
        }

        blocks.push(block);
    }

    Ok(blocks)
}

/// Parses a single state block from a `Pair<Rule::state_block>`.
fn parse_state_block(pair: Pair<Rule>) -> Result<StateBlock, TuringMachineError> {
    let mut pairs = pair.into_inner();
    let state = parse_string(&mut pairs)?;
    let actions = pairs
        .filter(|p| p.as_rule() == Rule::action)
        .map(parse_action)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(StateBlock { state, actions })
}

/// Parses one rule line from a `Pair<Rule::action>`.
///
/// If the write symbol is omitted, the rule writes back the symbol it read.
fn parse_action(pair: Pair<Rule>) -> Result<ParsedAction, TuringMachineError> {
    let span = pair.as_span();
    let (symbols, rest): (Vec<_>, Vec<_>) = pair
        .into_inner()
        .partition(|p| p.as_rule() == Rule::symbol);

    let read = symbols
        .first()
        .map(|p| parse_symbol(p.as_str()))
        .ok_or_else(|| parse_error("Missing read symbol", span))?;
    let write = symbols.get(1).map_or(read, |p| parse_symbol(p.as_str()));

    let mut rest = rest.into_iter();
    let direction = rest
        .next()
        .ok_or_else(|| parse_error("Missing direction", span))?
        .as_str()
        .parse::<Direction>()?;
    let next = rest
        .next()
        .ok_or_else(|| parse_error("Missing next state", span))?
        .as_str()
        .to_string();

    Ok(ParsedAction {
        read,
        write,
        direction,
        next,
        span: span.as_str().trim().to_string(),
    })
}

/// Builds the transition table, rewriting input blanks and rejecting rules that would
/// make the machine non-deterministic.
fn build_table(blocks: Vec<StateBlock>, blank: char) -> Result<TransitionTable, TuringMachineError> {
    let mut table = TransitionTable::new();

    for block in blocks {
        for action in block.actions {
            let read = rewrite_blank(action.read, blank);
            let transition = Transition::new(
                action.next,
                rewrite_blank(action.write, blank),
                action.direction,
            );

            if table.insert(block.state.clone(), read, transition).is_some() {
                return Err(TuringMachineError::ValidationError(format!(
                    "Duplicate rule for state '{}' and symbol {:?}: {}",
                    block.state, read, action.span
                )));
            }
        }
    }

    Ok(table)
}

/// Parses the symbol list of a `tape:` section.
fn parse_symbols(pair: Pair<Rule>) -> Vec<char> {
    // Rule: tape > symbols? > [symbol]
    pair.into_inner()
        .flat_map(|symbols| symbols.into_inner())
        .filter(|p| p.as_rule() == Rule::symbol)
        .map(|p| parse_symbol(p.as_str()))
        .collect()
}

/// Parses the state list of a `final:` section.
fn parse_state_names(pair: Pair<Rule>) -> BTreeSet<String> {
    // Rule: final_states > state_names? > [state_name]
    pair.into_inner()
        .flat_map(|names| names.into_inner())
        .filter(|p| p.as_rule() == Rule::state_name)
        .map(|p| p.as_str().to_string())
        .collect()
}

/// Creates a `TuringMachineError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> TuringMachineError {
    TuringMachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

/// Parses a single character symbol from a string, handling quoted and unquoted symbols.
fn parse_symbol(input: &str) -> char {
    let inner = input
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(input);

    inner.chars().next().unwrap_or(DEFAULT_BLANK_SYMBOL)
}

fn rewrite_blank(symbol: char, blank: char) -> char {
    if symbol == INPUT_BLANK_SYMBOL {
        blank
    } else {
        symbol
    }
}

/// Extracts the inner string content from a `Pair`.
fn parse_inner_string(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default()
}

/// Extracts the string content from the current `Pair` in a `Pairs` iterator.
fn parse_string(pairs: &mut Pairs<Rule>) -> Result<String, TuringMachineError> {
    pairs
        .next()
        .map(|p| p.as_str().to_string())
        .ok_or_else(|| TuringMachineError::ValidationError("Unexpected end of rule".into()))
}

/// Checks if a given section has already been declared.
fn check_unique_rule(
    rule: Rule,
    span: Span,
    seen: &mut HashSet<Rule>,
) -> Result<(), TuringMachineError> {
    if !matches!(
        rule,
        Rule::name | Rule::blank | Rule::tape | Rule::final_states | Rule::rules
    ) {
        return Ok(());
    };

    if !seen.insert(rule) {
        let keyword = span.as_str().split(':').next().unwrap_or_default().trim();
        return Err(parse_error(
            &format!("Duplicate \"{keyword}:\" declaration"),
            span,
        ));
    }

    Ok(())
}

/// Checks if a required section is present, returning an `Err` if it's missing.
fn check_required_rule<T>(value: Option<T>, name: &str) -> Result<T, TuringMachineError> {
    value.ok_or_else(|| TuringMachineError::ValidationError(format!("Missing '{name}' section")))
}

/// The rules declared under one state header.
struct StateBlock {
    state: String,
    actions: Vec<ParsedAction>,
}

/// A helper struct to temporarily hold parsed action data.
struct ParsedAction {
    read: char,
    write: char,
    direction: Direction,
    next: String,
    span: String,
}
