use pretty_assertions::assert_eq;
use tabula::{Column, Table, Value};

fn col(values: &[i64]) -> Column {
    Column::from_values(values.iter().map(|&v| Value::Int(v)).collect())
}

fn strings(values: &[&str]) -> Column {
    Column::from_values(values.iter().map(|&v| Value::String(v.to_string())).collect())
}

fn floats(column: &Column) -> Vec<f64> {
    column
        .data()
        .into_iter()
        .map(|v| match v {
            Value::Float(f) => f,
            Value::Int(i) => i as f64,
            other => panic!("expected a number, got {other:?}"),
        })
        .collect()
}

#[test]
fn s1_column_wise_arithmetic_assignment() {
    let a = col(&[1, 2, 3, 4]).with_name("A");
    let b = col(&[10, 20, 30, 40]).with_name("B");
    let c = col(&[100, 200, 300, 400]).with_name("C");
    let table = Table::new(vec![a, b, c]);

    table.execute_ccl("B = A + C").unwrap();

    assert_eq!(floats(&table.get_col_by_name("B").unwrap()), vec![101.0, 202.0, 303.0, 404.0]);
    assert_eq!(floats(&table.get_col_by_name("A").unwrap()), vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(floats(&table.get_col_by_name("C").unwrap()), vec![100.0, 200.0, 300.0, 400.0]);
}

#[test]
fn s2_new_column_creation() {
    let a = col(&[1, 2, 3, 4]).with_name("A");
    let b = col(&[10, 20, 30, 40]).with_name("B");
    let table = Table::new(vec![a, b]);

    table.execute_ccl("NEW('Sum') = A + B").unwrap();

    assert_eq!(table.col_count(), 3);
    assert_eq!(floats(&table.get_col_by_name("Sum").unwrap()), vec![11.0, 22.0, 33.0, 44.0]);
}

#[test]
fn s3_multi_statement_with_ordering() {
    let a = col(&[1, 2, 3, 4]).with_name("A");
    let b = col(&[10, 20, 30, 40]).with_name("B");
    let c = col(&[100, 200, 300, 400]).with_name("C");
    let table = Table::new(vec![a, b, c]);

    table.execute_ccl("A = A * 10\nNEW('D') = A + B + C").unwrap();

    assert_eq!(floats(&table.get_col_by_name("A").unwrap()), vec![10.0, 20.0, 30.0, 40.0]);
    assert_eq!(floats(&table.get_col_by_name("D").unwrap()), vec![120.0, 240.0, 360.0, 480.0]);
}

#[test]
fn s4_named_column_assignment_and_string_concat() {
    let greeting = strings(&["Hello", "World", "Test"]).with_name("greeting");
    let suffix = strings(&["Foo", "Bar", "Baz"]).with_name("suffix");
    let table = Table::new(vec![greeting, suffix]);

    table.execute_ccl("['greeting'] = ['greeting'] & '-' & ['suffix']").unwrap();

    let expected: Vec<Value> = ["Hello-Foo", "World-Bar", "Test-Baz"]
        .iter()
        .map(|s| Value::String(s.to_string()))
        .collect();
    assert_eq!(table.get_col_by_name("greeting").unwrap().data(), expected);
}

#[test]
fn s5_conditional_edit() {
    let value = col(&[10, 20, 30, 40]).with_name("value");
    let threshold = col(&[5, 25, 15, 35]).with_name("threshold");
    let table = Table::new(vec![value, threshold]);

    table
        .edit_col_by_name_using_ccl("value", "IF(['value'] > ['threshold'], ['value'] * 2, ['value'])")
        .unwrap();

    assert_eq!(floats(&table.get_col_by_name("value").unwrap()), vec![20.0, 20.0, 60.0, 80.0]);
}

#[test]
fn s6_snapshot_aggregate_consistency() {
    let a = col(&[1, 2, 3]).with_name("A");
    let b = col(&[4, 5, 6]).with_name("B");
    let table = Table::new(vec![a, b]);

    table.execute_ccl("NEW('S') = SUM(@); NEW('C') = COUNT(@)").unwrap();

    assert_eq!(floats(&table.get_col_by_name("S").unwrap()), vec![21.0, 21.0, 21.0]);
    assert_eq!(floats(&table.get_col_by_name("C").unwrap()), vec![6.0, 6.0, 6.0]);
}

#[test]
fn idempotence_of_read_only_programs() {
    let a = col(&[1, 2, 3]).with_name("A");
    let b = col(&[4, 5, 6]).with_name("B");
    let table = Table::new(vec![a, b]);

    table.add_col_using_ccl("first", "A + B").unwrap();
    table.add_col_using_ccl("second", "A + B").unwrap();

    assert_eq!(
        table.get_col_by_name("first").unwrap().data(),
        table.get_col_by_name("second").unwrap().data()
    );
}

#[test]
fn rejected_forms_leave_the_table_unchanged() {
    let a = col(&[1, 2, 3]).with_name("A");
    let table = Table::new(vec![a]);

    assert!(table.add_col_using_ccl("bad", "A = 1").is_err());
    assert!(table.add_col_using_ccl("bad", "NEW('x') = A").is_err());
    assert_eq!(table.col_count(), 1);
}

#[test]
fn letter_round_trip_past_z() {
    for position in [0usize, 25, 26, 27, 701, 702] {
        let letters = Table::letter(position);
        assert_eq!(Table::parse_letter(&letters), Some(position));
    }
}

#[test]
fn negative_index_returns_the_last_element() {
    let c = col(&[1, 2, 3]);
    assert_eq!(c.get(-1), Value::Int(3));
}

#[test]
fn out_of_range_index_returns_null_and_logs_a_warning() {
    let c = col(&[1, 2, 3]);
    assert_eq!(c.get(10), Value::Null);
    c.update(10, Value::Int(0));
    assert_eq!(c.warnings().len(), 1);
}

#[test]
fn dropping_an_element_shifts_subsequent_rows_up() {
    let c = col(&[1, 2, 3]);
    c.drop(0);
    assert_eq!(c.data(), vec![Value::Int(2), Value::Int(3)]);
}
