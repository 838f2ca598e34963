/* src/server/injector/rust/src/visit.rs */

use serde_json::Value;

fn is_container(node: &Value) -> bool {
  node.is_object() || node.is_array()
}

/// Depth-first, pre-order search over objects and arrays.
pub fn find_first<'a, P>(node: &'a Value, pred: &P) -> Option<&'a Value>
where
  P: Fn(&Value) -> bool,
{
  if !is_container(node) {
    return None;
  }
  if pred(node) {
    return Some(node);
  }
  match node {
    Value::Array(items) => items.iter().find_map(|item| find_first(item, pred)),
    Value::Object(map) => map.values().find_map(|value| find_first(value, pred)),
    _ => None,
  }
}

pub fn find_first_mut<'a, P>(node: &'a mut Value, pred: &P) -> Option<&'a mut Value>
where
  P: Fn(&Value) -> bool,
{
  if !is_container(node) {
    return None;
  }
  if pred(node) {
    return Some(node);
  }
  match node {
    Value::Array(items) => items.iter_mut().find_map(|item| find_first_mut(item, pred)),
    Value::Object(map) => map.values_mut().find_map(|value| find_first_mut(value, pred)),
    _ => None,
  }
}

/// Every matching container in document order, including matches nested in
/// other matches.
pub fn find_all<'a, P>(node: &'a Value, pred: &P) -> Vec<&'a Value>
where
  P: Fn(&Value) -> bool,
{
  let mut out = Vec::new();
  collect(node, pred, &mut out);
  out
}

fn collect<'a, P>(node: &'a Value, pred: &P, out: &mut Vec<&'a Value>)
where
  P: Fn(&Value) -> bool,
{
  if !is_container(node) {
    return;
  }
  if pred(node) {
    out.push(node);
  }
  match node {
    Value::Array(items) => items.iter().for_each(|item| collect(item, pred, out)),
    Value::Object(map) => map.values().for_each(|value| collect(value, pred, out)),
    _ => {}
  }
}

/// Call `f` on every matching container in document order, then keep
/// descending into the (possibly rewritten) node. Returns the match count.
pub fn for_each_match_mut<P, F>(node: &mut Value, pred: &P, f: &mut F) -> usize
where
  P: Fn(&Value) -> bool,
  F: FnMut(&mut Value),
{
  if !is_container(node) {
    return 0;
  }
  let mut hits = 0;
  if pred(node) {
    f(node);
    hits += 1;
  }
  match node {
    Value::Array(items) => {
      for item in items.iter_mut() {
        hits += for_each_match_mut(item, pred, f);
      }
    }
    Value::Object(map) => {
      for value in map.values_mut() {
        hits += for_each_match_mut(value, pred, f);
      }
    }
    _ => {}
  }
  hits
}

/// String member of an object node.
pub fn str_field<'a>(node: &'a Value, key: &str) -> Option<&'a str> {
  node.as_object()?.get(key)?.as_str()
}
