//! General properties of tables, labels and dispatch.

use std::sync::Arc;

use ducktable::{
    ll::label::LabelAllocator, Arity, Error, IntoMethod, Label, Method, Object, Runtime, Value,
};
use rayon::prelude::*;

use crate::{Assertion, Suite};

fn private_runtime() -> Runtime {
    Runtime::with_labels(Arc::new(LabelAllocator::new()))
}

/// A method returning the index it was created with.
fn constant(index: usize) -> Method {
    Method::new(Arity::Fixed(0), move |_, _| Ok(Value::Int(index as i64)))
}

/// Checks that binding every label of `names` makes every name invocable.
fn bind_all(names: &[String], reverse: bool) -> Result<Vec<Value>, Error> {
    let runtime = private_runtime();
    let mut table = runtime.create_table(names);
    let labels = runtime.get_method_labels(&mut table, names);
    let mut pairs: Vec<(Label, Method)> =
        labels.iter().enumerate().map(|(index, &label)| (label, constant(index))).collect();
    if reverse {
        pairs.reverse();
        table.set_methods(pairs);
    } else {
        for (label, method) in pairs {
            table.set_method(label, method);
        }
    }
    let object = runtime.create_object_opt(None, &table.init_class()?);
    labels.iter().map(|&label| object.invoke(label, &[])).collect()
}

fn names(prefix: &str, count: usize) -> Vec<String> {
    (0..count).map(|index| format!("{prefix}{index}")).collect()
}

pub fn suite() -> Suite {
    Suite::new("properties")
        .test("every declared name is invocable", || {
            let names = names("method", 100);
            let got = bind_all(&names, false)?;
            let expected = (0..names.len()).map(|index| Value::Int(index as i64)).collect();
            Ok(Assertion::EqAll(expected, got))
        })
        .test("set_methods order does not matter", || {
            let names = names("m", 37);
            Ok(Assertion::EqAll(bind_all(&names, false)?, bind_all(&names, true)?))
        })
        .test("labels are deterministic", || {
            let labels = LabelAllocator::new();
            let first = labels.get_labels(["a", "b", "c"]);
            let again = labels.get_labels(["c", "b", "a"]);
            Ok(Assertion::Ok(
                first.iter().rev().eq(again.iter()) && labels.get_label("b") == first[1],
            ))
        })
        .test("concurrent allocation stays dense", || {
            let labels = LabelAllocator::new();
            let names = names("concurrent", 1000);
            let allocated: Vec<Label> =
                names.par_iter().map(|name| labels.get_label(name)).collect();
            let mut numbers: Vec<u32> = allocated.iter().map(|label| label.to_u32()).collect();
            numbers.sort_unstable();
            let dense = numbers.iter().enumerate().all(|(index, &n)| n == index as u32);
            let stable = names.iter().zip(&allocated).all(|(name, &l)| labels.get_label(name) == l);
            Ok(Assertion::Ok(dense && stable && labels.len() == names.len()))
        })
        .test("self dispatch delegates", || {
            let runtime = private_runtime();
            let mut table = runtime.create_table(["hi", "hello"]);
            let ids = runtime.get_method_labels(&mut table, ["hi", "hello"]);
            let (hi, hello) = (ids[0], ids[1]);
            table.set_methods([
                (hi, (|_: &Object, x: i64, y: i64| x + y).into_method()),
                (hello, (move |this: &Object, z: i64| this.call::<i64>(hi, (10, z))).into_method()),
            ]);
            let object = runtime.create_object_opt(None, &table.init_class()?);
            for z in -50..50 {
                let delegated = object.invoke(hello, &[Value::Int(z)])?;
                let direct = object.invoke(hi, &[Value::Int(10), Value::Int(z)])?;
                if delegated != direct {
                    return Ok(Assertion::Eq(direct, delegated));
                }
            }
            Ok(Assertion::Ok(true))
        })
        .test("preallocated objects are reinitialized", || {
            let runtime = private_runtime();
            let mut table = runtime.create_table(["get"]);
            let get = runtime.get_method_label(&mut table, "get");
            let count = table.new_variable("count");
            table.set_method(
                get,
                Method::new(Arity::Fixed(0), move |this, _| this.get_variable(count)),
            );
            let class = table.init_class()?;
            let object = runtime.create_object_opt(None, &class);
            object.set_variable(count, Value::Int(5))?;
            let before = object.invoke(get, &[])?;
            let object = runtime.create_object_opt(Some(object), &class);
            let after = object.invoke(get, &[])?;
            Ok(Assertion::EqAll(vec![Value::Int(5), Value::Nil], vec![before, after]))
        })
        .test("unknown labels are reported", || {
            let runtime = private_runtime();
            let mut table = runtime.create_table(["known"]);
            let known = runtime.get_method_label(&mut table, "known");
            table.set_method(known, constant(0));
            let object = runtime.create_object_opt(None, &table.init_class()?);
            let unknown = runtime.get_label("unknown");
            Ok(Assertion::Ok(matches!(
                object.invoke(unknown, &[]),
                Err(Error::MethodNotFound { label, .. }) if label == unknown
            )))
        })
        .ignored_test("many objects share one class", || {
            let runtime = private_runtime();
            let mut table = runtime.create_table(["inc"]);
            let inc = runtime.get_method_label(&mut table, "inc");
            table.set_method(inc, (|_: &Object, x: i64| x + 1).into_method());
            let class = table.init_class()?;
            let total: i64 = (0..100_000)
                .into_par_iter()
                .map(|i| {
                    let object = runtime.create_object_opt(None, &class);
                    runtime.call::<i64>(&object, inc, (i,))
                })
                .sum::<Result<i64, Error>>()?;
            Ok(Assertion::Eq(Value::Int(5_000_050_000), Value::Int(total)))
        })
}
