//! This module contains the Thompson construction that turns postfix tokens into an automaton.

use std::time::Instant;

use log::debug;

use crate::{
    errors::RegexError,
    operations::{concat, kleene, optional, union, KleeneKind},
    parser::{infix_to_postfix, PostfixToken},
    Automaton, FaError, Result,
};

impl TryFrom<&[PostfixToken]> for Automaton {
    type Error = FaError;

    /// Run the stack machine over the postfix tokens.
    ///
    /// Literals push a two state automaton, unary operators replace the top of the stack
    /// and binary operators replace the two topmost automata by their combination. Exactly
    /// one automaton must remain.
    fn try_from(tokens: &[PostfixToken]) -> Result<Self> {
        let mut stack: Vec<Automaton> = Vec::new();
        for token in tokens {
            let automaton = match token {
                PostfixToken::Literal(symbol) => Automaton::from_symbol(symbol)?,
                PostfixToken::Star => kleene(&pop_operand(&mut stack, token)?, KleeneKind::Star)?,
                PostfixToken::Plus => kleene(&pop_operand(&mut stack, token)?, KleeneKind::Plus)?,
                PostfixToken::Optional => optional(&pop_operand(&mut stack, token)?)?,
                PostfixToken::Concatenation | PostfixToken::Alternation => {
                    let right = pop_operand(&mut stack, token)?;
                    let left = pop_operand(&mut stack, token)?;
                    if *token == PostfixToken::Concatenation {
                        concat(&left, &right)?
                    } else {
                        union(&left, &right)?
                    }
                }
            };
            stack.push(automaton);
        }

        if stack.len() > 1 {
            return Err(RegexError::MalformedPostfix(format!(
                "{} operands remain on the stack",
                stack.len()
            ))
            .into());
        }
        stack.pop().ok_or_else(|| {
            RegexError::MalformedPostfix("the expression has no operand".to_string()).into()
        })
    }
}

fn pop_operand(stack: &mut Vec<Automaton>, token: &PostfixToken) -> Result<Automaton> {
    stack.pop().ok_or_else(|| {
        RegexError::MalformedPostfix(format!("missing operand for '{}'", token)).into()
    })
}

impl Automaton {
    /// Compile a regex pattern into an automaton with epsilon transitions.
    ///
    /// The pattern is converted to postfix notation first, see [`infix_to_postfix`] for the
    /// supported syntax.
    pub fn from_regex(pattern: &str) -> Result<Self> {
        let now = Instant::now();
        let postfix = infix_to_postfix(pattern)?;
        let automaton = Automaton::try_from(postfix.as_slice())?;
        debug!(
            "Compiled '{}' into {} states in {} microseconds.",
            pattern,
            automaton.state_count(),
            now.elapsed().as_micros()
        );
        Ok(automaton)
    }
}
