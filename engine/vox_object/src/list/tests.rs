use pretty_assertions::assert_eq;

use super::*;
use crate::error::ErrorCode;

fn numbers(values: &[i32]) -> List {
    values.iter().copied().collect()
}

fn ints(list: &List) -> Vec<i32> {
    list.iter().filter_map(|v| v.as_int().ok()).collect()
}

#[test]
fn push_and_pop_at_both_ends() {
    let mut list = List::new();
    list.push_back(2);
    list.push_back(3);
    list.push_front(1);
    assert_eq!(ints(&list), vec![1, 2, 3]);

    assert_eq!(list.pop_front(), Some(Value::Int(1)));
    assert_eq!(list.pop_back(), Some(Value::Int(3)));
    assert_eq!(list.len(), 1);
    assert_eq!(list.pop_back(), Some(Value::Int(2)));
    assert_eq!(list.pop_back(), None);
    assert!(list.is_empty());
}

#[test]
fn insert_relative_to_position() {
    let mut list = numbers(&[1, 3]);
    assert_eq!(list.insert_after(0, 2), Ok(()));
    assert_eq!(list.insert_before(0, 0), Ok(()));
    assert_eq!(ints(&list), vec![0, 1, 2, 3]);

    let err = list.insert_after(4, 9).map_err(|e| e.code());
    assert_eq!(err, Err(ErrorCode::ArgumentError));
    assert_eq!(list.len(), 4);
}

#[test]
fn nth_first_last() {
    let list = numbers(&[4, 5, 6]);
    assert_eq!(list.nth(1), Some(&Value::Int(5)));
    assert_eq!(list.nth(3), None);
    assert_eq!(list.first(), Some(&Value::Int(4)));
    assert_eq!(list.last(), Some(&Value::Int(6)));
}

#[test]
fn unlink_returns_payload() {
    let mut list = numbers(&[7, 8, 9]);
    assert_eq!(list.unlink(1), Ok(Value::Int(8)));
    assert_eq!(ints(&list), vec![7, 9]);
    assert!(list.unlink(5).is_err());
}

#[test]
fn replace_hands_back_old_value() {
    let mut list = numbers(&[1, 2]);
    assert_eq!(list.replace(0, "one"), Ok(Value::Int(1)));
    assert_eq!(list.nth(0), Some(&Value::from("one")));
    assert_eq!(list.to_string(), "(one 2)");
}

#[test]
fn compare_is_elementwise() {
    assert_eq!(numbers(&[1, 2]).compare(&numbers(&[1, 2])), Ok(true));
    assert_eq!(numbers(&[1, 2]).compare(&numbers(&[2, 1])), Ok(false));
    assert_eq!(numbers(&[1]).compare(&numbers(&[1, 1])), Ok(false));
}

#[test]
fn contains_uses_value_compare() {
    let list: List = [Value::Int(3), Value::from("ax"), Value::Float(0.5)]
        .into_iter()
        .collect();
    assert_eq!(list.contains(&Value::from("ax")), Ok(true));
    assert_eq!(list.contains(&Value::Float(0.5)), Ok(true));
    assert_eq!(list.contains(&Value::Int(4)), Ok(false));
    assert_eq!(List::new().contains(&Value::Int(3)), Ok(false));
}

#[test]
fn merge_appends_copies() {
    let mut list: List = [Value::Int(12), Value::from("a")].into_iter().collect();
    let with: List = [Value::Float(5.31), Value::from("a")].into_iter().collect();
    list.merge(&with);
    assert_eq!(list.to_string(), "(12 a 5.31 a)");
    assert_eq!(with.len(), 2);
}

#[test]
fn reverse_in_place() {
    let mut list = numbers(&[1, 2, 3, 4]);
    list.push_front(0);
    list.reverse();
    assert_eq!(ints(&list), vec![4, 3, 2, 1, 0]);

    let mut empty = List::new();
    empty.reverse();
    assert!(empty.is_empty());
}

#[test]
fn unlink_where_detaches_in_one_pass() {
    let mut list = numbers(&[1, 2, 3, 4, 5, 6]);
    let mut visited = Vec::new();
    let odd = list.unlink_where(|index, value| {
        visited.push(index);
        value.as_int().is_ok_and(|n| n % 2 == 1)
    });
    assert_eq!(visited, vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(ints(&odd), vec![1, 3, 5]);
    assert_eq!(ints(&list), vec![2, 4, 6]);

    let none = list.unlink_where(|_, _| false);
    assert!(none.is_empty());
    assert_eq!(list.len(), 3);
}
