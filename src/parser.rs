//! This module contains the conversion of a regex pattern from infix to postfix notation.
//!
//! The supported syntax is small: every character except `|`, `*`, `+`, `?`, `(`, `)` and
//! `\` is a literal, `\x` escapes the character `x`, juxtaposition is concatenation and the
//! postfix operators bind stronger than concatenation, which binds stronger than `|`.
//! The conversion is a shunting-yard algorithm that inserts the implicit concatenation
//! operator while it scans the pattern.

use std::fmt::{Display, Formatter};
use std::time::Instant;

use itertools::Itertools;
use log::trace;

use crate::{errors::RegexError, Result};

/// A token of a regex in postfix notation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostfixToken {
    /// A literal symbol.
    Literal(String),
    /// The binary concatenation operator, written as `.` in postfix form.
    Concatenation,
    /// The binary alternation operator `|`.
    Alternation,
    /// The postfix operator `*`.
    Star,
    /// The postfix operator `+`.
    Plus,
    /// The postfix operator `?`.
    Optional,
}

impl PostfixToken {
    // Binding strength of the binary operators
    fn precedence(&self) -> u8 {
        match self {
            PostfixToken::Alternation => 1,
            PostfixToken::Concatenation => 2,
            _ => 3,
        }
    }
}

impl Display for PostfixToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PostfixToken::Literal(s) if is_operator(s) => write!(f, "\\{}", s),
            PostfixToken::Literal(s) => write!(f, "{}", s),
            PostfixToken::Concatenation => write!(f, "."),
            PostfixToken::Alternation => write!(f, "|"),
            PostfixToken::Star => write!(f, "*"),
            PostfixToken::Plus => write!(f, "+"),
            PostfixToken::Optional => write!(f, "?"),
        }
    }
}

fn is_operator(s: &str) -> bool {
    matches!(s, "|" | "*" | "+" | "?" | "(" | ")" | "\\" | ".")
}

/// Format a postfix token sequence as text, e.g. `ab|*a.`.
pub fn format_postfix(tokens: &[PostfixToken]) -> String {
    tokens.iter().join("")
}

// The class of the previously scanned token. It decides whether an implicit concatenation
// is inserted and which tokens may follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Previous {
    Nothing,
    Operand,
    Alternation,
    Open,
}

// An entry of the operator stack
#[derive(Debug)]
enum StackEntry {
    Open(usize),
    Operator(PostfixToken),
}

struct ShuntingYard {
    output: Vec<PostfixToken>,
    operators: Vec<StackEntry>,
    previous: Previous,
}

impl ShuntingYard {
    fn new() -> Self {
        Self {
            output: Vec::new(),
            operators: Vec::new(),
            previous: Previous::Nothing,
        }
    }

    // Push a binary operator after popping all operators that bind at least as strong.
    fn push_binary(&mut self, operator: PostfixToken) {
        while let Some(StackEntry::Operator(top)) = self.operators.last() {
            if top.precedence() < operator.precedence() {
                break;
            }
            if let Some(StackEntry::Operator(top)) = self.operators.pop() {
                self.output.push(top);
            }
        }
        self.operators.push(StackEntry::Operator(operator));
    }

    // Literals and opening parentheses start a new operand, which is concatenated to a
    // preceding complete operand.
    fn begin_operand(&mut self) {
        if self.previous == Previous::Operand {
            self.push_binary(PostfixToken::Concatenation);
        }
    }

    fn literal(&mut self, symbol: String) {
        self.begin_operand();
        self.output.push(PostfixToken::Literal(symbol));
        self.previous = Previous::Operand;
    }

    fn open(&mut self, position: usize) {
        self.begin_operand();
        self.operators.push(StackEntry::Open(position));
        self.previous = Previous::Open;
    }

    fn close(&mut self, position: usize) -> std::result::Result<(), RegexError> {
        if self.previous != Previous::Operand {
            return Err(unexpected(')', position));
        }
        loop {
            match self.operators.pop() {
                Some(StackEntry::Operator(operator)) => self.output.push(operator),
                Some(StackEntry::Open(_)) => break,
                None => return Err(RegexError::UnbalancedParentheses { position }),
            }
        }
        self.previous = Previous::Operand;
        Ok(())
    }

    fn alternation(&mut self, position: usize) -> std::result::Result<(), RegexError> {
        if self.previous != Previous::Operand {
            return Err(unexpected('|', position));
        }
        self.push_binary(PostfixToken::Alternation);
        self.previous = Previous::Alternation;
        Ok(())
    }

    fn postfix(
        &mut self,
        operator: PostfixToken,
        c: char,
        position: usize,
    ) -> std::result::Result<(), RegexError> {
        if self.previous != Previous::Operand {
            return Err(unexpected(c, position));
        }
        // Postfix operators bind strongest and apply to the operand just emitted
        self.output.push(operator);
        Ok(())
    }

    fn finish(mut self) -> std::result::Result<Vec<PostfixToken>, RegexError> {
        match self.previous {
            Previous::Nothing => return Err(RegexError::EmptyPattern),
            Previous::Alternation => return Err(RegexError::TrailingOperator { operator: '|' }),
            Previous::Open | Previous::Operand => {}
        }
        while let Some(entry) = self.operators.pop() {
            match entry {
                StackEntry::Operator(operator) => self.output.push(operator),
                StackEntry::Open(position) => {
                    return Err(RegexError::UnbalancedParentheses { position })
                }
            }
        }
        Ok(self.output)
    }
}

fn unexpected(c: char, position: usize) -> RegexError {
    RegexError::UnexpectedToken {
        token: c.to_string(),
        position,
    }
}

/// Convert a regex pattern to postfix notation.
/// # Arguments
/// * `pattern` - The regex pattern in infix notation.
/// # Returns
/// The tokens of the pattern in postfix notation, with explicit concatenation operators.
/// # Errors
/// A `RegexSyntaxError` if the pattern is empty, has unbalanced parentheses, an operator
/// without operand or a dangling escape character.
pub fn infix_to_postfix(pattern: &str) -> Result<Vec<PostfixToken>> {
    let now = Instant::now();
    let mut shunting_yard = ShuntingYard::new();
    let mut chars = pattern.chars().enumerate();
    while let Some((position, c)) = chars.next() {
        match c {
            '(' => shunting_yard.open(position),
            ')' => shunting_yard.close(position)?,
            '|' => shunting_yard.alternation(position)?,
            '*' => shunting_yard.postfix(PostfixToken::Star, c, position)?,
            '+' => shunting_yard.postfix(PostfixToken::Plus, c, position)?,
            '?' => shunting_yard.postfix(PostfixToken::Optional, c, position)?,
            '\\' => match chars.next() {
                Some((_, escaped)) => shunting_yard.literal(escaped.to_string()),
                None => return Err(unexpected('\\', position).into()),
            },
            _ => shunting_yard.literal(c.to_string()),
        }
    }
    let postfix = shunting_yard.finish()?;
    trace!(
        "Postfix of '{}' is '{}', conversion took {} microseconds.",
        pattern,
        format_postfix(&postfix),
        now.elapsed().as_micros()
    );
    Ok(postfix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FaErrorKind;

    struct TestData {
        input: &'static str,
        expected: &'static str,
    }

    const TEST_DATA: &[TestData] = &[
        TestData {
            input: "a",
            expected: "a",
        },
        TestData {
            input: "ab",
            expected: "ab.",
        },
        TestData {
            input: "abc",
            expected: "ab.c.",
        },
        TestData {
            input: "a|b",
            expected: "ab|",
        },
        TestData {
            input: "a|b|c",
            expected: "ab|c|",
        },
        TestData {
            input: "ab|c",
            expected: "ab.c|",
        },
        TestData {
            input: "a(b|c)*",
            expected: "abc|*.",
        },
        TestData {
            input: "a+b?",
            expected: "a+b?.",
        },
        TestData {
            input: "(a|b)*abb",
            expected: "ab|*a.b.b.",
        },
        TestData {
            input: "a**",
            expected: "a**",
        },
        TestData {
            input: "((a))",
            expected: "a",
        },
        TestData {
            input: r"\*a",
            expected: r"\*a.",
        },
        TestData {
            input: "x y",
            expected: "x .y.",
        },
    ];

    #[test]
    fn test_infix_to_postfix() {
        for data in TEST_DATA {
            let postfix = infix_to_postfix(data.input).unwrap();
            assert_eq!(
                format_postfix(&postfix),
                data.expected,
                "input '{}'",
                data.input
            );
        }
    }

    #[test]
    fn test_postfix_tokens() {
        let postfix = infix_to_postfix("a|b*").unwrap();
        assert_eq!(
            postfix,
            vec![
                PostfixToken::Literal("a".to_string()),
                PostfixToken::Literal("b".to_string()),
                PostfixToken::Star,
                PostfixToken::Alternation,
            ]
        );
    }

    struct ErrorData {
        input: &'static str,
        expected: RegexError,
    }

    #[test]
    fn test_infix_to_postfix_errors() {
        let error_data = [
            ErrorData {
                input: "",
                expected: RegexError::EmptyPattern,
            },
            ErrorData {
                input: "(a",
                expected: RegexError::UnbalancedParentheses { position: 0 },
            },
            ErrorData {
                input: "a)",
                expected: RegexError::UnbalancedParentheses { position: 1 },
            },
            ErrorData {
                input: "(",
                expected: RegexError::UnbalancedParentheses { position: 0 },
            },
            ErrorData {
                input: "*a",
                expected: unexpected('*', 0),
            },
            ErrorData {
                input: "a||b",
                expected: unexpected('|', 2),
            },
            ErrorData {
                input: "()",
                expected: unexpected(')', 1),
            },
            ErrorData {
                input: "(|a)",
                expected: unexpected('|', 1),
            },
            ErrorData {
                input: "(a|)",
                expected: unexpected(')', 3),
            },
            ErrorData {
                input: "a|",
                expected: RegexError::TrailingOperator { operator: '|' },
            },
            ErrorData {
                input: "a\\",
                expected: unexpected('\\', 1),
            },
        ];
        for data in error_data {
            let result = infix_to_postfix(data.input);
            match result {
                Err(e) => match e.kind() {
                    FaErrorKind::RegexSyntaxError(error) => {
                        assert_eq!(error, &data.expected, "input '{}'", data.input)
                    }
                    kind => panic!("Unexpected error kind {:?} for '{}'", kind, data.input),
                },
                Ok(postfix) => panic!(
                    "'{}' was accepted as '{}'",
                    data.input,
                    format_postfix(&postfix)
                ),
            }
        }
    }

    #[test]
    fn test_error_message() {
        let error = infix_to_postfix("a||b").unwrap_err();
        assert_eq!(error.to_string(), "Unexpected token '|' at position 2");
    }
}
