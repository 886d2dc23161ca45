use chrono::{Duration, NaiveDate};

use super::ConditionError;
use super::parser::{BinOp, Expr, parse};

/// Runtime value domain of the condition language.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Date(NaiveDate),
    List(Vec<Value>),
}

impl Value {
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Date(_) => true,
            Value::List(items) => !items.is_empty(),
        }
    }

    fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => Value::Str(s.clone()),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(Value::from_json).collect())
            }
            // Nested objects are opaque; membership and field access walk
            // the JSON directly before conversion.
            serde_json::Value::Object(_) => Value::Null,
        }
    }
}

/// Evaluates `expr` against the record snapshot and reduces the result to
/// a boolean by truthiness.
pub fn evaluate(expr: &str, doc: &serde_json::Value) -> Result<bool, ConditionError> {
    Ok(evaluate_value(expr, doc)?.truthy())
}

pub fn evaluate_value(
    expr: &str,
    doc: &serde_json::Value,
) -> Result<Value, ConditionError> {
    let ast = parse(expr)?;
    eval(&ast, doc)
}

fn eval(expr: &Expr, doc: &serde_json::Value) -> Result<Value, ConditionError> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Str(s) => Ok(Value::Str(s.clone())),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Null => Ok(Value::Null),
        Expr::Path(path) => resolve_path(path, doc),
        Expr::Call { name, args } => call(name, args, doc),
        Expr::Not(inner) => Ok(Value::Bool(!eval(inner, doc)?.truthy())),
        Expr::Binary { op, lhs, rhs } => {
            match op {
                // `and`/`or` short-circuit
                BinOp::And => {
                    let left = eval(lhs, doc)?;
                    if !left.truthy() {
                        return Ok(Value::Bool(false));
                    }
                    Ok(Value::Bool(eval(rhs, doc)?.truthy()))
                }
                BinOp::Or => {
                    let left = eval(lhs, doc)?;
                    if left.truthy() {
                        return Ok(Value::Bool(true));
                    }
                    Ok(Value::Bool(eval(rhs, doc)?.truthy()))
                }
                _ => {
                    let left = eval(lhs, doc)?;
                    let right = eval(rhs, doc)?;
                    apply(*op, left, right)
                }
            }
        }
    }
}

fn resolve_path(path: &[String], doc: &serde_json::Value) -> Result<Value, ConditionError> {
    if path[0] != "doc" {
        return Err(ConditionError::UnknownIdentifier(path.join(".")));
    }
    let mut current = doc;
    for segment in &path[1..] {
        match current.get(segment) {
            Some(next) => current = next,
            // Absent fields read as null, like the record store's get()
            None => return Ok(Value::Null),
        }
    }
    if path.len() == 1 {
        // Bare `doc` is truthy when the snapshot is non-empty
        return Ok(Value::Bool(
            current.as_object().is_some_and(|o| !o.is_empty()),
        ));
    }
    Ok(Value::from_json(current))
}

fn call(
    name: &str,
    args: &[Expr],
    doc: &serde_json::Value,
) -> Result<Value, ConditionError> {
    match name {
        "today" | "nowdate" => {
            if !args.is_empty() {
                return Err(ConditionError::Type(format!(
                    "{name}() takes no arguments"
                )));
            }
            Ok(Value::Date(chrono::Local::now().date_naive()))
        }
        "days" => {
            if args.len() != 1 {
                return Err(ConditionError::Type(
                    "days(n) takes exactly one argument".to_string(),
                ));
            }
            match eval(&args[0], doc)? {
                Value::Number(n) => Ok(Value::Number(n)),
                other => Err(ConditionError::Type(format!(
                    "days(n) expects a number, got {other:?}"
                ))),
            }
        }
        other => Err(ConditionError::UnknownFunction(other.to_string())),
    }
}

fn apply(op: BinOp, left: Value, right: Value) -> Result<Value, ConditionError> {
    match op {
        BinOp::Eq => Ok(Value::Bool(values_equal(&left, &right))),
        BinOp::Ne => Ok(Value::Bool(!values_equal(&left, &right))),
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            let ordering = compare(&left, &right)?;
            let result = match op {
                BinOp::Lt => ordering.is_lt(),
                BinOp::Le => ordering.is_le(),
                BinOp::Gt => ordering.is_gt(),
                BinOp::Ge => ordering.is_ge(),
                _ => unreachable!(),
            };
            Ok(Value::Bool(result))
        }
        BinOp::In => member_of(&left, &right),
        BinOp::Add | BinOp::Sub => arithmetic(op, left, right),
        BinOp::And | BinOp::Or => unreachable!("handled with short-circuit"),
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        // `doc.half_day == 1` on a Check field
        (Value::Bool(a), Value::Number(b)) | (Value::Number(b), Value::Bool(a)) => {
            (*a as i64 as f64) == *b
        }
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Date(a), Value::Date(b)) => a == b,
        (Value::Number(n), Value::Str(s)) | (Value::Str(s), Value::Number(n)) => {
            s.parse::<f64>().map(|parsed| parsed == *n).unwrap_or(false)
        }
        (Value::Date(d), Value::Str(s)) | (Value::Str(s), Value::Date(d)) => {
            parse_date(s).map(|parsed| parsed == *d).unwrap_or(false)
        }
        _ => false,
    }
}

fn compare(left: &Value, right: &Value) -> Result<std::cmp::Ordering, ConditionError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a
            .partial_cmp(b)
            .ok_or_else(|| ConditionError::Type("numbers are not comparable".to_string())),
        (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
        (Value::Date(a), Value::Date(b)) => Ok(a.cmp(b)),
        (Value::Date(d), Value::Str(s)) => {
            let other = parse_date(s).ok_or_else(|| date_error(s))?;
            Ok(d.cmp(&other))
        }
        (Value::Str(s), Value::Date(d)) => {
            let this = parse_date(s).ok_or_else(|| date_error(s))?;
            Ok(this.cmp(d))
        }
        (Value::Number(n), Value::Str(s)) => {
            let other: f64 = s.parse().map_err(|_| num_error(s))?;
            n.partial_cmp(&other)
                .ok_or_else(|| ConditionError::Type("not comparable".to_string()))
        }
        (Value::Str(s), Value::Number(n)) => {
            let this: f64 = s.parse().map_err(|_| num_error(s))?;
            this.partial_cmp(n)
                .ok_or_else(|| ConditionError::Type("not comparable".to_string()))
        }
        (a, b) => Err(ConditionError::Type(format!(
            "cannot order {a:?} against {b:?}"
        ))),
    }
}

fn member_of(needle: &Value, haystack: &Value) -> Result<Value, ConditionError> {
    match haystack {
        Value::List(items) => Ok(Value::Bool(
            items.iter().any(|item| values_equal(needle, item)),
        )),
        Value::Str(s) => match needle {
            Value::Str(sub) => Ok(Value::Bool(s.contains(sub.as_str()))),
            other => Err(ConditionError::Type(format!(
                "'in' on a string needs a string, got {other:?}"
            ))),
        },
        Value::Null => Ok(Value::Bool(false)),
        other => Err(ConditionError::Type(format!(
            "'in' needs a list or string, got {other:?}"
        ))),
    }
}

fn arithmetic(op: BinOp, left: Value, right: Value) -> Result<Value, ConditionError> {
    let sign = if op == BinOp::Sub { -1.0 } else { 1.0 };
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + sign * b)),
        (Value::Date(d), Value::Number(n)) => {
            Ok(Value::Date(d + Duration::days((sign * n) as i64)))
        }
        (Value::Date(a), Value::Date(b)) if op == BinOp::Sub => {
            Ok(Value::Number((a - b).num_days() as f64))
        }
        (Value::Str(s), Value::Number(n)) => {
            if let Some(date) = parse_date(&s) {
                Ok(Value::Date(date + Duration::days((sign * n) as i64)))
            } else {
                let this: f64 = s.parse().map_err(|_| num_error(&s))?;
                Ok(Value::Number(this + sign * n))
            }
        }
        (a, b) => Err(ConditionError::Type(format!(
            "cannot {} {a:?} and {b:?}",
            if op == BinOp::Sub { "subtract" } else { "add" }
        ))),
    }
}

/// ISO date, optionally with a time suffix (the record store's datetime
/// string form).
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let date_part = s.split(|c| c == ' ' || c == 'T').next()?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn date_error(s: &str) -> ConditionError {
    ConditionError::Type(format!("'{s}' is not a date"))
}

fn num_error(s: &str) -> ConditionError {
    ConditionError::Type(format!("'{s}' is not a number"))
}
