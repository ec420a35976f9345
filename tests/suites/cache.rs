//! Call-site caching never changes what a call returns.

use std::sync::Arc;

use ducktable::{
    ll::label::LabelAllocator, CacheId, CacheStats, ClassBuilder, Object, Runtime, RuntimeOptions,
    Selector, Tag, Value,
};

use crate::{Assertion, Suite};

/// Builds the same three classes in a runtime, all responding to `get` and `add`.
fn objects(runtime: &Runtime) -> Result<Vec<Object>, ducktable::Error> {
    let mut objects = Vec::new();
    for (name, base) in [("One", 1_i64), ("Ten", 10), ("Hundred", 100)] {
        let class = ClassBuilder::new(name)
            .add_method("get", move |_: &Object| base)
            .add_method("add", move |_: &Object, x: i64| base + x)
            .build(runtime)?;
        objects.push(runtime.create_object_opt(None, &class));
    }
    Ok(objects)
}

/// Runs a fixed sequence of calls through a single call site, alternating receivers and
/// selectors.
fn run_sequence(options: RuntimeOptions) -> Result<(Vec<Value>, CacheStats), ducktable::Error> {
    let runtime = Runtime::with_options(Arc::new(LabelAllocator::new()), options);
    let objects = objects(&runtime)?;
    let get = runtime.get_label("get");
    let add = Tag::of("add");
    let site = CacheId::from_u32(0);
    let mut results = Vec::new();
    for step in 0..64_usize {
        let object = &objects[(step * 7 / 3) % objects.len()];
        let result = if step % 5 == 0 {
            runtime.invoke_cached(site, add, object, &[Value::Int(step as i64)])?
        } else {
            runtime.invoke_cached(site, get, object, &[])?
        };
        results.push(result);
    }
    Ok((results, runtime.cache_stats()))
}

pub fn suite() -> Suite {
    Suite::new("cache")
        .test("transparent", || {
            let (cached, _) = run_sequence(RuntimeOptions::default())?;
            let (uncached, _) =
                run_sequence(RuntimeOptions { inline_caching: false, ..Default::default() })?;
            Ok(Assertion::EqAll(uncached, cached))
        })
        .test("uncached runtime never counts", || {
            let (_, stats) =
                run_sequence(RuntimeOptions { inline_caching: false, ..Default::default() })?;
            Ok(Assertion::Ok(stats == CacheStats::default()))
        })
        .test("every call is counted once", || {
            let (results, stats) = run_sequence(RuntimeOptions::default())?;
            Ok(Assertion::Ok(stats.hits + stats.misses == results.len() as u64))
        })
        .test("monomorphic site hits", || {
            let runtime = Runtime::with_labels(Arc::new(LabelAllocator::new()));
            let objects = objects(&runtime)?;
            let get = runtime.get_label("get");
            let site = runtime.call_site(CacheId::from_u32(3));
            for _ in 0..10 {
                site.invoke(get, &objects[0], &[])?;
            }
            Ok(Assertion::Ok(site.stats() == CacheStats { hits: 9, misses: 1 }))
        })
        .test("bimorphic site hits through the fallback", || {
            let runtime = Runtime::with_labels(Arc::new(LabelAllocator::new()));
            let objects = objects(&runtime)?;
            let get = runtime.get_label("get");
            let site = runtime.call_site(CacheId::from_u32(3));
            let mut results = Vec::new();
            for step in 0..10 {
                results.push(site.invoke(get, &objects[step % 2], &[])?);
            }
            let expected: Vec<_> = (0..10).map(|step| Value::Int([1, 10][step % 2])).collect();
            if site.stats() != (CacheStats { hits: 8, misses: 2 }) {
                return Ok(Assertion::Ok(false));
            }
            Ok(Assertion::EqAll(expected, results))
        })
        .test("selector through the same site", || {
            let runtime = Runtime::with_labels(Arc::new(LabelAllocator::new()));
            let objects = objects(&runtime)?;
            let site = CacheId::from_u32(9);
            let by_label = Selector::from(runtime.get_label("add"));
            let by_tag = Selector::from(Tag::of("add"));
            let a = runtime.invoke_cached(site, by_label, &objects[2], &[Value::Int(5)])?;
            let b = runtime.invoke_cached(site, by_tag, &objects[2], &[Value::Int(5)])?;
            Ok(Assertion::EqAll(vec![Value::Int(105), Value::Int(105)], vec![a, b]))
        })
        .test("missing method through a warm site", || {
            let runtime = Runtime::with_labels(Arc::new(LabelAllocator::new()));
            let objects = objects(&runtime)?;
            let site = CacheId::from_u32(1);
            runtime.invoke_cached(site, Tag::of("get"), &objects[0], &[])?;
            let missing = runtime.invoke_cached(site, Tag::of("nope"), &objects[0], &[]);
            Ok(Assertion::Ok(matches!(missing, Err(ducktable::Error::PublicMethodNotFound { .. }))))
        })
}
