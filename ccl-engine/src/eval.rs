//! The Column Calculation Language evaluator: runs a parsed [`Program`] or
//! single [`Expr`] against a table's columns, one row at a time, with `@`
//! aggregates snapshotted once per call.
use ccl_ast::{
    BinaryOperator, BracketTarget, ColRange, ColRef, Expr, LValue, Literal, Program, RowRange,
    RowRef, Statement, UnaryOperator,
};
use ccl_parser::{EntryMode, Parser};
use ccl_value::Value;

use crate::{column::Column, letters, registry, rowindex::RowIndex, EngineError};

/// A read/append view over a table's columns, as seen by the evaluator.
/// Borrowed rather than owned so `Table`'s mutate closures can hand the
/// evaluator a `&mut Vec<Column>` without the evaluator knowing about
/// `TableInner`.
pub(crate) struct TableView<'a> {
    pub(crate) columns: &'a mut Vec<Column>,
    pub(crate) row_index: &'a RowIndex,
}

impl TableView<'_> {
    fn row_count(&self) -> usize {
        self.columns.iter().map(Column::len).max().unwrap_or(0)
    }

    fn col_position(&self, col: &ColRef) -> Option<usize> {
        match col {
            ColRef::Bare(name) => letters::decode(name)
                .filter(|&p| p < self.columns.len())
                .or_else(|| self.col_position_by_name(name)),
            ColRef::BracketLetter(letter) => letters::decode(letter).filter(|&p| p < self.columns.len()),
            ColRef::BracketName(name) => self.col_position_by_name(name),
        }
    }

    fn col_position_by_name(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.get_name() == name)
    }

    fn row_position(&self, row: &RowRef, len: usize) -> Option<usize> {
        match row {
            RowRef::Index(i) => {
                let resolved = if *i < 0 { i + len as i64 } else { *i };
                (resolved >= 0 && (resolved as usize) < len).then_some(resolved as usize)
            }
            RowRef::Name(name) => self.row_index.index_of(name),
        }
    }

    fn cell(&self, col: usize, row: usize) -> Value {
        self.columns.get(col).map(|c| c.get(row as i64)).unwrap_or(Value::Null)
    }
}

/// Parses a full program for [`crate::Table::execute_ccl`].
pub(crate) fn parse_program(source: &str) -> Result<Program, EngineError> {
    let mut parser = Parser::new_with_source(EntryMode::Execute, source)?;
    Ok(parser.parse_program()?)
}

/// Parses the single expression used by `add_col_using_ccl` /
/// `edit_col_*_using_ccl`.
pub(crate) fn parse_add_or_edit_expr(source: &str) -> Result<Expr, EngineError> {
    let mut parser = Parser::new_with_source(EntryMode::AddColumn, source)?;
    Ok(parser.parse_single_expr()?)
}

/// Runs every statement of `program` against `table`, in source order.
/// `@`-aggregates are snapshotted once, before the first statement, and
/// shared by every statement in the program (so a column mutated by an
/// earlier statement does not change what a later statement's `@` sees).
pub(crate) fn run_program(mut table: TableView<'_>, program: &Program, warnings: &crate::warnings::WarningLog) {
    let snapshot: Vec<Vec<Value>> = table.columns.iter().map(Column::data).collect();
    for statement in program {
        run_statement(&mut table, &snapshot, statement, warnings);
    }
}

fn run_statement(table: &mut TableView<'_>, snapshot: &[Vec<Value>], statement: &Statement, warnings: &crate::warnings::WarningLog) {
    match statement {
        Statement::Assign { target, expr } => {
            let values = eval_all_rows(&*table, snapshot, expr, warnings);
            assign(table, target, values, warnings);
        }
        Statement::Expr(_) => {
            // Grammar restrictions already keep a bare expression statement
            // out of Execute-mode programs; nothing to do if one slips
            // through a future relaxation of that restriction.
        }
    }
}

fn assign(table: &mut TableView<'_>, target: &LValue, values: Vec<Value>, warnings: &crate::warnings::WarningLog) {
    if let LValue::New(name) = target {
        let unique = crate::table::unique_col_name(table.columns, name);
        table.columns.push(Column::from_values(values).with_name(unique));
        return;
    }
    let pos = match target {
        LValue::Ident(name) => letters::decode(name)
            .filter(|&p| p < table.columns.len())
            .or_else(|| table.col_position_by_name(name)),
        LValue::Bracket(BracketTarget::Letter(letter)) => letters::decode(letter).filter(|&p| p < table.columns.len()),
        LValue::Bracket(BracketTarget::Name(name)) => table.col_position_by_name(name),
        LValue::New(_) => unreachable!("handled above"),
    };
    match pos {
        Some(pos) => overwrite(&table.columns[pos], values),
        None => warnings.push(format!("assignment target could not be resolved: {target:?}")),
    }
}

fn overwrite(col: &Column, values: Vec<Value>) {
    col.clear();
    col.append_many(values);
}

/// Evaluates `expr` once per row of the table (or once, if `expr` contains
/// no per-row column access), returning one value per row.
pub(crate) fn eval_per_row(table: TableView<'_>, expr: &Expr, warnings: &crate::warnings::WarningLog) -> Vec<Value> {
    let snapshot: Vec<Vec<Value>> = table.columns.iter().map(Column::data).collect();
    eval_all_rows(&table, &snapshot, expr, warnings)
}

fn eval_all_rows(table: &TableView<'_>, snapshot: &[Vec<Value>], expr: &Expr, warnings: &crate::warnings::WarningLog) -> Vec<Value> {
    let row_count = table.row_count().max(1);
    let mut ragged = false;
    let mut out = Vec::with_capacity(row_count);
    for row in 0..row_count {
        out.push(eval(table, snapshot, expr, row, &mut ragged, warnings));
    }
    if ragged {
        warnings.push("expression read past the end of a shorter column; missing cells treated as null".to_string());
    }
    out
}

fn eval(
    table: &TableView<'_>,
    snapshot: &[Vec<Value>],
    expr: &Expr,
    row: usize,
    ragged: &mut bool,
    warnings: &crate::warnings::WarningLog,
) -> Value {
    match expr {
        Expr::Literal(Literal::Number(raw)) => parse_number(raw),
        Expr::Literal(Literal::String(s)) => Value::String(s.clone()),
        Expr::At => Value::Seq(snapshot.iter().flatten().cloned().collect()),
        Expr::Nested(inner) => eval(table, snapshot, inner, row, ragged, warnings),
        Expr::Unary { op, expr } => {
            let v = eval(table, snapshot, expr, row, ragged, warnings);
            match op {
                UnaryOperator::Negate => {
                    let (f, ok) = ccl_value::to_float(&v);
                    if ok {
                        Value::Float(-f)
                    } else {
                        Value::Float(f64::NAN)
                    }
                }
            }
        }
        Expr::Binary { left, op, right } => eval_binary(table, snapshot, left, *op, right, row, ragged, warnings),
        Expr::Column { col, row: row_suffix } => eval_column_access(table, col, row_suffix, row, ragged),
        Expr::Call { name, args } => eval_call(table, snapshot, name, args, row, ragged, warnings),
    }
}

fn parse_number(raw: &str) -> Value {
    if let Ok(i) = raw.parse::<i64>() {
        Value::Int(i)
    } else {
        raw.parse::<f64>().map(Value::Float).unwrap_or(Value::Float(f64::NAN))
    }
}

fn eval_binary(
    table: &TableView<'_>,
    snapshot: &[Vec<Value>],
    left: &Expr,
    op: BinaryOperator,
    right: &Expr,
    row: usize,
    ragged: &mut bool,
    warnings: &crate::warnings::WarningLog,
) -> Value {
    // AND/OR short-circuit before the right operand is evaluated.
    if matches!(op, BinaryOperator::And) {
        let l = eval(table, snapshot, left, row, ragged, warnings);
        if !l.truthy() {
            return Value::Bool(false);
        }
        return Value::Bool(eval(table, snapshot, right, row, ragged, warnings).truthy());
    }
    if matches!(op, BinaryOperator::Or) {
        let l = eval(table, snapshot, left, row, ragged, warnings);
        if l.truthy() {
            return Value::Bool(true);
        }
        return Value::Bool(eval(table, snapshot, right, row, ragged, warnings).truthy());
    }

    let l = eval(table, snapshot, left, row, ragged, warnings);
    let r = eval(table, snapshot, right, row, ragged, warnings);
    match op {
        BinaryOperator::Plus => int_preserving_arith(&l, &r, |a, b| a + b, i64::checked_add),
        BinaryOperator::Minus => int_preserving_arith(&l, &r, |a, b| a - b, i64::checked_sub),
        BinaryOperator::Multiply => int_preserving_arith(&l, &r, |a, b| a * b, i64::checked_mul),
        BinaryOperator::Divide => arith(&l, &r, |a, b| if b == 0.0 { f64::NAN } else { a / b }),
        BinaryOperator::Modulo => int_preserving_arith(
            &l,
            &r,
            |a, b| if b == 0.0 { f64::NAN } else { a % b },
            |a, b| if b == 0 { None } else { a.checked_rem(b) },
        ),
        BinaryOperator::Power => arith(&l, &r, f64::powf),
        BinaryOperator::Concat => Value::String(ccl_value::concat_string(&l, &r)),
        BinaryOperator::Equal => Value::Bool(l.eq_nan_aware(&r)),
        BinaryOperator::NotEqual => Value::Bool(!l.eq_nan_aware(&r)),
        BinaryOperator::Less => Value::Bool(matches!(ccl_value::compare(&l, &r), ccl_value::Ordering::Less)),
        BinaryOperator::LessOrEqual => Value::Bool(!matches!(ccl_value::compare(&l, &r), ccl_value::Ordering::Greater)),
        BinaryOperator::Greater => Value::Bool(matches!(ccl_value::compare(&l, &r), ccl_value::Ordering::Greater)),
        BinaryOperator::GreaterOrEqual => Value::Bool(!matches!(ccl_value::compare(&l, &r), ccl_value::Ordering::Less)),
        BinaryOperator::And | BinaryOperator::Or => unreachable!("handled above"),
    }
}

fn arith(l: &Value, r: &Value, f: impl Fn(f64, f64) -> f64) -> Value {
    let (lf, lok) = ccl_value::to_float(l);
    let (rf, rok) = ccl_value::to_float(r);
    if !lok || !rok {
        return Value::Float(f64::NAN);
    }
    Value::Float(f(lf, rf))
}

/// `+ - * %` preserve an integer result when both operands are already
/// integer-valued (not merely numeric-looking, e.g. a numeric string or a
/// bool); `/` and `^` always widen to float (see `arith`'s call sites).
/// Falls back to the float path on overflow rather than wrapping.
fn int_preserving_arith(l: &Value, r: &Value, float_f: impl Fn(f64, f64) -> f64, int_f: impl Fn(i64, i64) -> Option<i64>) -> Value {
    if let (Value::Int(a), Value::Int(b)) = (l, r) {
        if let Some(result) = int_f(*a, *b) {
            return Value::Int(result);
        }
    }
    arith(l, r, float_f)
}

fn eval_column_access(table: &TableView<'_>, col: &ColRange, row_suffix: &Option<RowRange>, current_row: usize, ragged: &mut bool) -> Value {
    let cols = resolve_col_range(table, col);
    let len = table.row_count();

    match row_suffix {
        None => {
            // No row suffix: this access tracks the enclosing per-row
            // evaluation, one cell (or, for a column range, one row slice).
            let values: Vec<Value> = cols
                .iter()
                .map(|&c| {
                    let col_len = table.columns.get(c).map(Column::len).unwrap_or(0);
                    if current_row >= col_len {
                        *ragged = true;
                    }
                    table.cell(c, current_row)
                })
                .collect();
            single_or_seq(values)
        }
        Some(rows) => {
            let row_positions = resolve_row_range(table, rows, len);
            match (cols.len(), row_positions.len()) {
                (1, 1) => table.cell(cols[0], row_positions[0]),
                (_, 1) => Value::Seq(cols.iter().map(|&c| table.cell(c, row_positions[0])).collect()),
                (1, _) => Value::Seq(row_positions.iter().map(|&r| table.cell(cols[0], r)).collect()),
                _ => Value::Seq(
                    row_positions
                        .iter()
                        .map(|&r| Value::Seq(cols.iter().map(|&c| table.cell(c, r)).collect()))
                        .collect(),
                ),
            }
        }
    }
}

fn single_or_seq(mut values: Vec<Value>) -> Value {
    if values.len() == 1 {
        values.pop().unwrap()
    } else {
        Value::Seq(values)
    }
}

fn resolve_col_range(table: &TableView<'_>, range: &ColRange) -> Vec<usize> {
    let start = table.col_position(&range.start);
    match (&range.end, start) {
        (None, Some(s)) => vec![s],
        (Some(end), Some(s)) => {
            let e = table.col_position(end).unwrap_or(s);
            ordered_range(s, e)
        }
        (_, None) => vec![],
    }
}

fn resolve_row_range(table: &TableView<'_>, range: &RowRange, len: usize) -> Vec<usize> {
    let start = table.row_position(&range.start, len);
    match (&range.end, start) {
        (None, Some(s)) => vec![s],
        (Some(end), Some(s)) => {
            let e = table.row_position(end, len).unwrap_or(s);
            ordered_range(s, e)
        }
        (_, None) => vec![],
    }
}

fn ordered_range(a: usize, b: usize) -> Vec<usize> {
    if a <= b {
        (a..=b).collect()
    } else {
        (b..=a).rev().collect()
    }
}

fn eval_call(
    table: &TableView<'_>,
    snapshot: &[Vec<Value>],
    name: &str,
    args: &[Expr],
    row: usize,
    ragged: &mut bool,
    warnings: &crate::warnings::WarningLog,
) -> Value {
    let upper = name.to_ascii_uppercase();
    match upper.as_str() {
        "IF" if args.len() == 3 => {
            if eval(table, snapshot, &args[0], row, ragged, warnings).truthy() {
                eval(table, snapshot, &args[1], row, ragged, warnings)
            } else {
                eval(table, snapshot, &args[2], row, ragged, warnings)
            }
        }
        "SUM" | "COUNT" | "AVG" | "MIN" | "MAX" if args.len() == 1 => {
            let values = flatten(eval(table, snapshot, &args[0], row, ragged, warnings));
            aggregate(&upper, &values)
        }
        _ => match registry::lookup(name) {
            Some(f) => {
                let evaluated: Vec<Value> = args.iter().map(|a| eval(table, snapshot, a, row, ragged, warnings)).collect();
                match f(&evaluated) {
                    Ok(v) => v,
                    Err(e) => {
                        warnings.push(format!("function '{name}' failed: {e}; result treated as null"));
                        Value::Null
                    }
                }
            }
            None => {
                warnings.push(format!("unknown function '{name}'; result treated as null"));
                Value::Null
            }
        },
    }
}

fn flatten(v: Value) -> Vec<Value> {
    match v {
        Value::Seq(values) => values.into_iter().flat_map(flatten).collect(),
        other => vec![other],
    }
}

fn aggregate(name: &str, values: &[Value]) -> Value {
    match name {
        "COUNT" => Value::Int(values.len() as i64),
        "SUM" => {
            let sum: f64 = values
                .iter()
                .filter_map(|v| {
                    let (f, ok) = ccl_value::to_float(v);
                    ok.then_some(f)
                })
                .sum();
            Value::Float(sum)
        }
        "AVG" => {
            let numeric: Vec<f64> = values.iter().filter_map(|v| {
                let (f, ok) = ccl_value::to_float(v);
                ok.then_some(f)
            }).collect();
            if numeric.is_empty() {
                Value::Float(f64::NAN)
            } else {
                Value::Float(numeric.iter().sum::<f64>() / numeric.len() as f64)
            }
        }
        "MIN" => reduce_numeric(values, f64::min),
        "MAX" => reduce_numeric(values, f64::max),
        _ => unreachable!(),
    }
}

fn reduce_numeric(values: &[Value], f: impl Fn(f64, f64) -> f64) -> Value {
    let numeric: Vec<f64> = values.iter().filter_map(|v| {
        let (f, ok) = ccl_value::to_float(v);
        ok.then_some(f)
    }).collect();
    if numeric.is_empty() {
        Value::Float(f64::NAN)
    } else {
        Value::Float(numeric.into_iter().reduce(f).unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warnings::WarningLog;

    fn view<'a>(columns: &'a mut Vec<Column>, row_index: &'a RowIndex) -> TableView<'a> {
        TableView { columns, row_index }
    }

    #[test]
    fn simple_add_expression_per_row() {
        let a = Column::from_values(vec![Value::Int(1), Value::Int(2)]).with_name("A");
        let b = Column::from_values(vec![Value::Int(10), Value::Int(20)]).with_name("B");
        let mut columns = vec![a, b];
        let row_index = RowIndex::default();
        let expr = parse_add_or_edit_expr("A + B").unwrap();
        let out = eval_per_row(view(&mut columns, &row_index), &expr, &WarningLog::default());
        assert_eq!(out, vec![Value::Int(11), Value::Int(22)]);
    }

    #[test]
    fn sum_of_at_aggregates_every_cell() {
        let a = Column::from_values(vec![Value::Int(1), Value::Int(2)]).with_name("A");
        let b = Column::from_values(vec![Value::Int(3), Value::Int(4)]).with_name("B");
        let mut columns = vec![a, b];
        let row_index = RowIndex::default();
        let expr = parse_add_or_edit_expr("SUM(@)").unwrap();
        let out = eval_per_row(view(&mut columns, &row_index), &expr, &WarningLog::default());
        assert_eq!(out, vec![Value::Float(10.0), Value::Float(10.0)]);
    }

    #[test]
    fn if_short_circuits() {
        let a = Column::from_values(vec![Value::Int(1), Value::Int(0)]).with_name("A");
        let mut columns = vec![a];
        let row_index = RowIndex::default();
        let expr = parse_add_or_edit_expr("IF(A, 'yes', 'no')").unwrap();
        let out = eval_per_row(view(&mut columns, &row_index), &expr, &WarningLog::default());
        assert_eq!(out, vec![Value::String("yes".into()), Value::String("no".into())]);
    }

    #[test]
    fn ragged_read_logs_one_warning_for_the_whole_call() {
        let a = Column::from_values(vec![Value::Int(1), Value::Int(2), Value::Int(3)]).with_name("A");
        let b = Column::from_values(vec![Value::Int(10)]).with_name("B");
        let mut columns = vec![a, b];
        let row_index = RowIndex::default();
        let expr = parse_add_or_edit_expr("A + B").unwrap();
        let warnings = WarningLog::default();
        eval_per_row(view(&mut columns, &row_index), &expr, &warnings);
        assert_eq!(warnings.snapshot().len(), 1);
    }

    #[test]
    fn execute_assigns_into_an_existing_column() {
        let a = Column::from_values(vec![Value::Int(1), Value::Int(2)]).with_name("A");
        let b = Column::from_values(vec![Value::Int(0), Value::Int(0)]).with_name("B");
        let mut columns = vec![a, b];
        let row_index = RowIndex::default();
        let program = parse_program("B = A * 2").unwrap();
        run_program(view(&mut columns, &row_index), &program, &WarningLog::default());
        assert_eq!(columns[1].data(), vec![Value::Int(2), Value::Int(4)]);
    }

    #[test]
    fn new_lvalue_appends_a_fresh_column() {
        let a = Column::from_values(vec![Value::Int(1), Value::Int(2)]).with_name("A");
        let b = Column::from_values(vec![Value::Int(10), Value::Int(20)]).with_name("B");
        let mut columns = vec![a, b];
        let row_index = RowIndex::default();
        let program = parse_program("NEW('Sum') = A + B").unwrap();
        run_program(view(&mut columns, &row_index), &program, &WarningLog::default());
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[2].get_name(), "Sum");
        assert_eq!(columns[2].data(), vec![Value::Int(11), Value::Int(22)]);
    }

    #[test]
    fn integer_arithmetic_preserves_int_but_division_and_power_widen() {
        assert_eq!(eval_scalar("3 + 4"), Value::Int(7));
        assert_eq!(eval_scalar("3 * 4"), Value::Int(12));
        assert_eq!(eval_scalar("7 % 2"), Value::Int(1));
        assert_eq!(eval_scalar("7 / 2"), Value::Float(3.5));
        assert_eq!(eval_scalar("2 ^ 3"), Value::Float(8.0));
        assert!(matches!(eval_scalar("5 % 0"), Value::Float(f) if f.is_nan()));
    }

    fn eval_scalar(source: &str) -> Value {
        let mut columns: Vec<Column> = vec![];
        let row_index = RowIndex::default();
        let expr = parse_add_or_edit_expr(source).unwrap();
        eval_per_row(view(&mut columns, &row_index), &expr, &WarningLog::default())
            .into_iter()
            .next()
            .unwrap()
    }

    #[test]
    fn unknown_function_name_warns_and_evaluates_to_null() {
        let mut columns: Vec<Column> = vec![];
        let row_index = RowIndex::default();
        let expr = parse_add_or_edit_expr("NOT_A_REAL_FUNCTION(1)").unwrap();
        let warnings = WarningLog::default();
        let out = eval_per_row(view(&mut columns, &row_index), &expr, &warnings);
        assert_eq!(out, vec![Value::Null]);
        assert_eq!(warnings.snapshot().len(), 1);
    }

    #[test]
    fn host_function_error_warns_and_evaluates_to_null() {
        registry::register("always_fails_test_fn", |_args| Err("boom".to_string()));
        let mut columns: Vec<Column> = vec![];
        let row_index = RowIndex::default();
        let expr = parse_add_or_edit_expr("ALWAYS_FAILS_TEST_FN(1)").unwrap();
        let warnings = WarningLog::default();
        let out = eval_per_row(view(&mut columns, &row_index), &expr, &warnings);
        assert_eq!(out, vec![Value::Null]);
        assert_eq!(warnings.snapshot().len(), 1);
        registry::unregister("always_fails_test_fn");
    }

    #[test]
    fn combined_column_and_row_range_nests_rows_outer_columns_inner() {
        let a = Column::from_values(vec![Value::Int(1), Value::Int(2)]).with_name("A");
        let b = Column::from_values(vec![Value::Int(10), Value::Int(20)]).with_name("B");
        let mut columns = vec![a, b];
        let row_index = RowIndex::default();
        let expr = parse_add_or_edit_expr("A:B.0:1").unwrap();
        let out = eval_per_row(view(&mut columns, &row_index), &expr, &WarningLog::default());
        let expected = Value::Seq(vec![
            Value::Seq(vec![Value::Int(1), Value::Int(10)]),
            Value::Seq(vec![Value::Int(2), Value::Int(20)]),
        ]);
        assert_eq!(out, vec![expected.clone(), expected]);
    }
}
