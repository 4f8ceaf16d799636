// Copyright (c) 2025 ADBC Drivers Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Tokenizer and parser for the supported SQL subset.
//!
//! Tokens are separated by whitespace; `=` outside a quoted literal is a
//! token of its own. Literals may be quoted with `'` or `"`, and a doubled
//! quote inside a literal stands for one quote character.

use crate::error::{Error, Result};
use crate::query::{Predicate, PredicateValue, QueryPlan};

const END_OF_STATEMENT: &str = "end of statement";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    /// Token with quoting removed.
    text: String,
    /// Token as written.
    raw: String,
    quoted: bool,
}

impl Token {
    fn is_keyword(&self, keyword: &str) -> bool {
        !self.quoted && self.text.eq_ignore_ascii_case(keyword)
    }
}

fn tokenize(sql: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = sql.char_indices().peekable();

    while let Some(&(start, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        if ch == '=' {
            chars.next();
            tokens.push(Token {
                text: "=".to_string(),
                raw: "=".to_string(),
                quoted: false,
            });
            continue;
        }

        if ch == '\'' || ch == '"' {
            chars.next();
            let mut text = String::new();
            let mut end = None;
            while let Some((i, c)) = chars.next() {
                if c == ch {
                    if let Some(&(_, next)) = chars.peek() {
                        if next == ch {
                            chars.next();
                            text.push(ch);
                            continue;
                        }
                    }
                    end = Some(i + c.len_utf8());
                    break;
                }
                text.push(c);
            }
            let Some(end) = end else {
                return Err(Error::syntax().message(format!(
                    "unterminated quoted literal: {}",
                    &sql[start..]
                )));
            };
            tokens.push(Token {
                text,
                raw: sql[start..end].to_string(),
                quoted: true,
            });
            continue;
        }

        let mut end = sql.len();
        while let Some(&(i, c)) = chars.peek() {
            if c.is_whitespace() || c == '=' || c == '\'' || c == '"' {
                end = i;
                break;
            }
            chars.next();
        }
        let word = &sql[start..end];
        tokens.push(Token {
            text: word.to_string(),
            raw: word.to_string(),
            quoted: false,
        });
    }

    Ok(tokens)
}

fn expected(what: &str, got: Option<&Token>) -> Error {
    let got = got.map(|t| t.raw.as_str()).unwrap_or(END_OF_STATEMENT);
    Error::syntax().message(format!("{} expected, got: {}", what, got))
}

fn expect_keyword(tokens: &[Token], index: usize, keyword: &str) -> Result<()> {
    match tokens.get(index) {
        Some(t) if t.is_keyword(keyword) => Ok(()),
        other => Err(expected(keyword, other)),
    }
}

fn expect_operand<'a>(tokens: &'a [Token], index: usize, what: &str) -> Result<&'a Token> {
    tokens.get(index).ok_or_else(|| expected(what, None))
}

/// Parses statement text into a [`QueryPlan`].
///
/// Surrounding whitespace and a single trailing `;` are ignored.
pub fn parse(sql: &str) -> Result<QueryPlan> {
    let sql = sql.trim();
    let sql = sql.strip_suffix(';').unwrap_or(sql).trim_end();
    let tokens = tokenize(sql)?;

    expect_keyword(&tokens, 0, "SELECT")?;
    expect_keyword(&tokens, 1, "*")?;
    expect_keyword(&tokens, 2, "FROM")?;
    let table = expect_operand(&tokens, 3, "table name")?.text.clone();

    if tokens.len() == 4 {
        return Ok(QueryPlan {
            table,
            predicate: None,
        });
    }

    expect_keyword(&tokens, 4, "WHERE")?;
    let column = expect_operand(&tokens, 5, "column name")?.text.clone();
    expect_keyword(&tokens, 6, "=")?;
    let literal = expect_operand(&tokens, 7, "literal")?;
    if let Some(extra) = tokens.get(8) {
        return Err(expected(END_OF_STATEMENT, Some(extra)));
    }

    let value = if literal.is_keyword("?") {
        PredicateValue::Parameter
    } else {
        PredicateValue::Literal(literal.text.clone())
    };

    Ok(QueryPlan {
        table,
        predicate: Some(Predicate { column, value }),
    })
}
