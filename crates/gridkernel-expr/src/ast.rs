//! The post-order expression node array (spec §2 item 5, §4.4) and its
//! evaluator/printer.

use std::fmt;

use gridkernel_common::{CellValue, ErrorKind, Expr, Position, Range, Resolver, StringHandle, StringPool};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Concat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggFn {
    Sum,
    Avg,
    Min,
    Max,
    Prod,
}

impl AggFn {
    pub fn name(self) -> &'static str {
        match self {
            AggFn::Sum => "sum",
            AggFn::Avg => "avg",
            AggFn::Min => "min",
            AggFn::Max => "max",
            AggFn::Prod => "prod",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sum" => Some(AggFn::Sum),
            "avg" => Some(AggFn::Avg),
            "min" => Some(AggFn::Min),
            "max" => Some(AggFn::Max),
            "prod" => Some(AggFn::Prod),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
enum NodeData {
    Number(f64),
    StringLit(StringHandle),
    CellRef(Position),
    RangeRef(Position, Position),
    Neg,
    Binary(BinOp),
    Aggregate(AggFn),
}

/// An immutable post-order array of expression nodes. The array is the
/// entire representation: evaluation and range enumeration both walk it
/// linearly, with a small value/range stack standing in for the implicit
/// call tree a post-order traversal encodes.
#[derive(Debug, Clone)]
pub struct AstExpr {
    nodes: Vec<NodeData>,
}

pub(crate) struct Builder {
    nodes: Vec<NodeData>,
}

impl Builder {
    pub(crate) fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub(crate) fn push_number(&mut self, n: f64) {
        self.nodes.push(NodeData::Number(n));
    }

    pub(crate) fn push_string(&mut self, handle: StringHandle) {
        self.nodes.push(NodeData::StringLit(handle));
    }

    pub(crate) fn push_cell_ref(&mut self, pos: Position) {
        self.nodes.push(NodeData::CellRef(pos));
    }

    pub(crate) fn push_range_ref(&mut self, a: Position, b: Position) {
        self.nodes.push(NodeData::RangeRef(a, b));
    }

    pub(crate) fn push_neg(&mut self) {
        self.nodes.push(NodeData::Neg);
    }

    pub(crate) fn push_binary(&mut self, op: BinOp) {
        self.nodes.push(NodeData::Binary(op));
    }

    pub(crate) fn push_aggregate(&mut self, f: AggFn) {
        self.nodes.push(NodeData::Aggregate(f));
    }

    pub(crate) fn finish(self) -> AstExpr {
        AstExpr { nodes: self.nodes }
    }
}

enum StackItem {
    Value(CellValue),
    Range(Position, Position),
}

fn as_number(v: &CellValue) -> Result<f64, ErrorKind> {
    match v {
        CellValue::Number(n) => Ok(*n),
        CellValue::Empty => Ok(0.0),
        CellValue::Text(_) => Err(ErrorKind::TypeMismatch),
        CellValue::Error(e) => Err(*e),
    }
}

fn as_text(v: &CellValue) -> Result<String, ErrorKind> {
    match v {
        CellValue::Text(s) => Ok(s.clone()),
        CellValue::Number(n) => Ok(n.to_string()),
        CellValue::Empty => Ok(String::new()),
        CellValue::Error(e) => Err(*e),
    }
}

fn pop_value(stack: &mut Vec<StackItem>) -> Result<CellValue, ErrorKind> {
    match stack.pop() {
        Some(StackItem::Value(v)) => Ok(v),
        Some(StackItem::Range(_, _)) => Err(ErrorKind::TypeMismatch),
        None => Err(ErrorKind::TypeMismatch),
    }
}

fn pop_range(stack: &mut Vec<StackItem>) -> Result<(Position, Position), ErrorKind> {
    match stack.pop() {
        Some(StackItem::Range(a, b)) => Ok((a, b)),
        Some(StackItem::Value(_)) => Err(ErrorKind::TypeMismatch),
        None => Err(ErrorKind::TypeMismatch),
    }
}

fn apply_binop(op: BinOp, a: CellValue, b: CellValue) -> Result<CellValue, ErrorKind> {
    if op == BinOp::Concat {
        let s = format!("{}{}", as_text(&a)?, as_text(&b)?);
        return Ok(CellValue::Text(s));
    }
    let x = as_number(&a)?;
    let y = as_number(&b)?;
    let result = match op {
        BinOp::Add => x + y,
        BinOp::Sub => x - y,
        BinOp::Mul => x * y,
        BinOp::Div => {
            if y == 0.0 {
                return Err(ErrorKind::DivisionByZero);
            }
            x / y
        }
        BinOp::Concat => unreachable!("handled above"),
    };
    if result.is_nan() || result.is_infinite() {
        return Err(ErrorKind::Overflow);
    }
    Ok(CellValue::Number(result))
}

fn apply_aggregate(f: AggFn, a: Position, b: Position, ctx: &mut dyn Resolver) -> Result<CellValue, ErrorKind> {
    let range = Range::new(a, b);
    let mut values: Vec<f64> = Vec::new();
    for pos in ctx.live_positions(range) {
        match ctx.resolve(pos) {
            CellValue::Number(n) => values.push(n),
            CellValue::Empty => {}
            CellValue::Text(_) => {}
            CellValue::Error(e) => return Err(e),
        }
    }
    let result = match f {
        AggFn::Sum => values.iter().sum(),
        AggFn::Avg => {
            if values.is_empty() {
                0.0
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            }
        }
        AggFn::Min => values.iter().cloned().fold(f64::INFINITY, f64::min),
        AggFn::Max => values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        AggFn::Prod => values.iter().product(),
    };
    if result.is_nan() || result.is_infinite() {
        return Err(ErrorKind::Overflow);
    }
    Ok(CellValue::Number(result))
}

impl Expr for AstExpr {
    fn referenced_ranges(&self) -> Vec<Range> {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                NodeData::CellRef(p) => Some(Range::single(*p)),
                NodeData::RangeRef(a, b) => Some(Range::new(*a, *b)),
                _ => None,
            })
            .collect()
    }

    fn evaluate(&self, ctx: &mut dyn Resolver, pool: &dyn StringPool) -> Result<CellValue, ErrorKind> {
        let mut stack: Vec<StackItem> = Vec::new();
        for node in &self.nodes {
            match node {
                NodeData::Number(n) => stack.push(StackItem::Value(CellValue::Number(*n))),
                NodeData::StringLit(h) => {
                    stack.push(StackItem::Value(CellValue::Text(pool.get(*h).to_string())))
                }
                NodeData::CellRef(p) => match ctx.resolve(*p) {
                    CellValue::Error(e) => return Err(e),
                    v => stack.push(StackItem::Value(v)),
                },
                NodeData::RangeRef(a, b) => stack.push(StackItem::Range(*a, *b)),
                NodeData::Neg => {
                    let v = pop_value(&mut stack)?;
                    let n = as_number(&v)?;
                    stack.push(StackItem::Value(CellValue::Number(-n)));
                }
                NodeData::Binary(op) => {
                    let b = pop_value(&mut stack)?;
                    let a = pop_value(&mut stack)?;
                    stack.push(StackItem::Value(apply_binop(*op, a, b)?));
                }
                NodeData::Aggregate(f) => {
                    let (a, b) = pop_range(&mut stack)?;
                    stack.push(StackItem::Value(apply_aggregate(*f, a, b, ctx)?));
                }
            }
        }
        match (stack.pop(), stack.is_empty()) {
            (Some(StackItem::Value(v)), true) => Ok(v),
            _ => Err(ErrorKind::TypeMismatch),
        }
    }

    fn print(&self, out: &mut dyn fmt::Write, pool: &dyn StringPool) -> fmt::Result {
        // The grammar is simple enough that a direct post-order-to-infix
        // rewrite (via a small text stack) round-trips without needing to
        // reconstruct precedence-driven parenthesization rules: every
        // sub-expression this grammar can produce is either a leaf or a
        // fully-parenthesized compound.
        let mut text_stack: Vec<String> = Vec::new();
        for node in &self.nodes {
            match node {
                NodeData::Number(n) => text_stack.push(format!("{n}")),
                NodeData::StringLit(h) => text_stack.push(format!("\"{}\"", pool.get(*h))),
                NodeData::CellRef(p) => text_stack.push(p.to_string()),
                NodeData::RangeRef(a, b) => text_stack.push(format!("{a}:{b}")),
                NodeData::Neg => {
                    let v = text_stack.pop().unwrap_or_default();
                    text_stack.push(format!("(-{v})"));
                }
                NodeData::Binary(op) => {
                    let b = text_stack.pop().unwrap_or_default();
                    let a = text_stack.pop().unwrap_or_default();
                    let sym = match op {
                        BinOp::Add => "+",
                        BinOp::Sub => "-",
                        BinOp::Mul => "*",
                        BinOp::Div => "/",
                        BinOp::Concat => "&",
                    };
                    text_stack.push(format!("({a} {sym} {b})"));
                }
                NodeData::Aggregate(f) => {
                    let range = text_stack.pop().unwrap_or_default();
                    text_stack.push(format!("@{}({range})", f.name()));
                }
            }
        }
        for piece in text_stack {
            out.write_str(&piece)?;
        }
        Ok(())
    }
}

pub(crate) use Builder as AstBuilder;
