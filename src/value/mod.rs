//! Runtime values as reported by the execution engine.
//!
//! Arrays and objects are shared, interior-mutable handles so the engine can hand
//! out the same structure from several places, including itself.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A value observed in the debuggee.
#[derive(Debug, Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Function { name: Option<String> },
    Array(ArrayRef),
    Object(ObjectRef),
    /// Anything else the engine can only describe by its string conversion
    /// (dates, regular expressions, symbols...).
    Other { type_name: String, display: String },
}

impl Value {
    pub fn string(text: impl Into<String>) -> Self {
        Value::String(text.into())
    }

    pub fn function(name: Option<&str>) -> Self {
        Value::Function {
            name: name.map(str::to_string),
        }
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(ArrayRef::new(items))
    }

    pub fn object<K: Into<String>>(props: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Object(ObjectRef::new(
            props.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    pub fn other(type_name: impl Into<String>, display: impl Into<String>) -> Self {
        Value::Other {
            type_name: type_name.into(),
            display: display.into(),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

/// Default string conversion for primitives, following script conventions.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if n == 0.0 {
        // covers negative zero
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        exponent_form(n)
    } else {
        format!("{}", n)
    }
}

/// Shortest round-trip digits with a signed exponent, e.g. `1e+21`, `-1.5e-7`.
fn exponent_form(n: f64) -> String {
    let text = format!("{:e}", n);
    match text.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
        _ => text,
    }
}

/// Shared handle to an array's elements.
#[derive(Clone, Default)]
pub struct ArrayRef(Rc<RefCell<Vec<Value>>>);

impl ArrayRef {
    pub fn new(items: Vec<Value>) -> Self {
        Self(Rc::new(RefCell::new(items)))
    }

    /// Address of the shared allocation; equal for clones of the same handle.
    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Copies the current elements out; the clones share nested handles.
    pub fn items(&self) -> Vec<Value> {
        self.0.borrow().clone()
    }

    pub fn push(&self, value: Value) {
        self.0.borrow_mut().push(value);
    }

    pub fn set(&self, index: usize, value: Value) {
        let mut items = self.0.borrow_mut();
        if index >= items.len() {
            items.resize(index + 1, Value::Undefined);
        }
        items[index] = value;
    }
}

impl fmt::Debug for ArrayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArrayRef(#{:x}, len {})", self.identity(), self.len())
    }
}

/// Shared handle to an object's own enumerable properties, in insertion order.
#[derive(Clone, Default)]
pub struct ObjectRef(Rc<RefCell<Vec<(String, Value)>>>);

impl ObjectRef {
    pub fn new(props: Vec<(String, Value)>) -> Self {
        Self(Rc::new(RefCell::new(props)))
    }

    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn entries(&self) -> Vec<(String, Value)> {
        self.0.borrow().clone()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.0
            .borrow()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    /// Sets a property, keeping the original position of an existing key.
    pub fn insert(&self, key: impl Into<String>, value: Value) {
        let key = key.into();
        let mut props = self.0.borrow_mut();
        match props.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => props.push((key, value)),
        }
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef(#{:x}, {} props)", self.identity(), self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_print_like_script_numbers() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn extreme_magnitudes_use_exponent_form() {
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-1.5e300), "-1.5e+300");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(2.5e-10), "2.5e-10");
        // the bounds themselves stay in plain notation
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(0.000001), "0.000001");
    }

    #[test]
    fn clones_share_identity() {
        let arr = ArrayRef::new(vec![Value::from(1)]);
        let alias = arr.clone();
        alias.push(Value::from(2));
        assert_eq!(arr.identity(), alias.identity());
        assert_eq!(arr.len(), 2);
        assert_ne!(arr.identity(), ArrayRef::new(Vec::new()).identity());
    }

    #[test]
    fn object_insert_keeps_key_order() {
        let obj = ObjectRef::new(Vec::new());
        obj.insert("a", Value::from(1));
        obj.insert("b", Value::from(2));
        obj.insert("a", Value::from(3));
        let keys: Vec<String> = obj.entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert!(matches!(obj.get("a"), Some(Value::Number(n)) if n == 3.0));
    }
}
