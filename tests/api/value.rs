use std::sync::Arc;

use ducktable::{Error, TryFromValue, Value};

use super::RevealResultExt;

#[test]
fn values_display_like_literals() {
    assert_eq!(Value::Nil.to_string(), "nil");
    assert_eq!(Value::from(true).to_string(), "true");
    assert_eq!(Value::from(-3).to_string(), "-3");
    assert_eq!(Value::from(0.5).to_string(), "0.5");
    assert_eq!(Value::from("uu").to_string(), "\"uu\"");
}

#[test]
fn options_and_unit_become_nil() {
    assert_eq!(Value::from(()), Value::Nil);
    assert_eq!(Value::from(None::<i64>), Value::Nil);
    assert_eq!(Value::from(Some(4_u8)), Value::Int(4));
}

#[test]
fn strings_convert_both_ways() {
    let value = Value::from(String::from("hello"));
    let shared: Arc<str> = Arc::try_from_value(&value).reveal();
    assert_eq!(&*shared, "hello");
    assert_eq!(String::try_from_value(&value).reveal(), "hello");
    assert!(matches!(
        String::try_from_value(&Value::Int(1)),
        Err(Error::TypeMismatch { .. })
    ));
}

#[test]
fn truthiness() {
    assert!(Value::Nil.is_falsy());
    assert!(Value::Boolean(false).is_falsy());
    assert!(Value::Int(0).is_truthy());
    assert!(Value::from("").is_truthy());
}
