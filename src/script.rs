//! User script execution against the working dataset.
//!
//! The collaborator contract is the [`ScriptEngine`] trait: given the
//! current dataset and a script, produce a possibly mutated dataset or
//! fail. The built-in engine evaluates a small pipe-separated query
//! language:
//!
//! ```text
//! where age > 30 | select name, age | rename age years | drop name
//! ```
//!
//! Clauses run left to right against the frame bound at the start of
//! execution. Errors abort the whole script; the caller decides whether
//! to commit the result.

use polars::prelude::*;

use crate::error::{OpError, OpResult};

pub trait ScriptEngine {
    fn execute(&self, df: &DataFrame, source: &str) -> OpResult<DataFrame>;
}

/// The built-in pipe-query engine.
#[derive(Debug, Default)]
pub struct QueryScriptEngine;

impl ScriptEngine for QueryScriptEngine {
    fn execute(&self, df: &DataFrame, source: &str) -> OpResult<DataFrame> {
        let mut frame = df.clone();
        for clause in source.split('|') {
            let clause = clause.trim();
            if clause.is_empty() {
                continue;
            }
            frame = eval_clause(&frame, clause)?;
        }
        Ok(frame)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Identifier(String),
    Number(f64),
    Str(String),
    Op(String),
    Comma,
}

fn script_err(msg: impl Into<String>) -> OpError {
    OpError::Script(msg.into())
}

fn tokenize(input: &str) -> OpResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' | '\n' | '\r' => {
                chars.next();
            }
            ',' => {
                tokens.push(Token::Comma);
                chars.next();
            }
            '"' => {
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '"' {
                        closed = true;
                        break;
                    }
                    value.push(c);
                }
                if !closed {
                    return Err(script_err("Unterminated string literal"));
                }
                tokens.push(Token::Str(value));
            }
            '=' | '<' | '>' | '!' => {
                let mut op = c.to_string();
                chars.next();
                if let Some(&'=') = chars.peek() {
                    if c != '=' {
                        op.push('=');
                        chars.next();
                    }
                }
                tokens.push(Token::Op(op));
            }
            '0'..='9' | '.' | '-' => {
                let mut num = String::new();
                if c == '-' {
                    num.push(c);
                    chars.next();
                }
                while let Some(&nc) = chars.peek() {
                    if nc.is_ascii_digit() || nc == '.' {
                        num.push(nc);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value: f64 = num
                    .parse()
                    .map_err(|_| script_err(format!("Invalid number: {num}")))?;
                tokens.push(Token::Number(value));
            }
            c if c.is_alphanumeric() || c == '_' => {
                let mut ident = String::new();
                while let Some(&nc) = chars.peek() {
                    if nc.is_alphanumeric() || nc == '_' {
                        ident.push(nc);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Identifier(ident));
            }
            other => {
                return Err(script_err(format!("Unexpected character: {other}")));
            }
        }
    }
    Ok(tokens)
}

fn identifiers(tokens: &[Token]) -> OpResult<Vec<String>> {
    let mut names = Vec::new();
    let mut expect_name = true;
    for token in tokens {
        match token {
            Token::Identifier(name) if expect_name => {
                names.push(name.clone());
                expect_name = false;
            }
            Token::Comma if !expect_name => expect_name = true,
            other => return Err(script_err(format!("Expected column name, got {other:?}"))),
        }
    }
    if names.is_empty() || expect_name {
        return Err(script_err("Expected a list of column names"));
    }
    Ok(names)
}

fn eval_clause(df: &DataFrame, clause: &str) -> OpResult<DataFrame> {
    let tokens = tokenize(clause)?;
    let Some(Token::Identifier(verb)) = tokens.first() else {
        return Err(script_err(format!("Expected a clause verb in '{clause}'")));
    };
    let rest = &tokens[1..];
    match verb.as_str() {
        "select" => {
            let names = identifiers(rest)?;
            Ok(df.select(names)?)
        }
        "drop" => {
            let names = identifiers(rest)?;
            let mut out = df.clone();
            for name in names {
                out = out.drop(&name)?;
            }
            Ok(out)
        }
        "rename" => match rest {
            [Token::Identifier(old), Token::Identifier(new)] => {
                let mut out = df.clone();
                out.rename(old, new.as_str().into())?;
                Ok(out)
            }
            _ => Err(script_err("Usage: rename <old> <new>")),
        },
        "where" => match rest {
            [Token::Identifier(column), Token::Op(op), literal] => {
                filter_where(df, column, op, literal)
            }
            _ => Err(script_err("Usage: where <column> <op> <value>")),
        },
        other => Err(script_err(format!("Unknown clause: {other}"))),
    }
}

fn filter_where(df: &DataFrame, column: &str, op: &str, literal: &Token) -> OpResult<DataFrame> {
    let series = df
        .column(column)
        .map_err(|_| script_err(format!("Unknown column: {column}")))?
        .as_materialized_series()
        .clone();

    let mask: Vec<bool> = match literal {
        Token::Number(target) => {
            let cast = series.cast(&DataType::Float64)?;
            let ca = cast.f64()?;
            ca.iter()
                .map(|v| v.is_some_and(|x| compare_f64(x, *target, op)))
                .collect()
        }
        Token::Str(target) | Token::Identifier(target) => {
            let cast = series.cast(&DataType::String)?;
            let ca = cast.str()?;
            ca.iter()
                .map(|v| v.is_some_and(|x| compare_str(x, target, op)))
                .collect()
        }
        other => return Err(script_err(format!("Unsupported literal: {other:?}"))),
    };

    let ca = BooleanChunked::new("mask".into(), mask);
    Ok(df.filter(&ca)?)
}

fn compare_f64(a: f64, b: f64, op: &str) -> bool {
    match op {
        "=" => a == b,
        "!=" => a != b,
        "<" => a < b,
        "<=" => a <= b,
        ">" => a > b,
        ">=" => a >= b,
        _ => false,
    }
}

fn compare_str(a: &str, b: &str, op: &str) -> bool {
    match op {
        "=" => a == b,
        "!=" => a != b,
        "<" => a < b,
        "<=" => a <= b,
        ">" => a > b,
        ">=" => a >= b,
        _ => false,
    }
}
