//! Two unrelated classes that both know how to `tick`, driven through a single call site.
//!
//! Run with `RUST_LOG=trace` and `--features trace-cache` to watch the call site warm up.

use std::sync::Arc;

use ducktable::{CacheId, ClassBuilder, Error, Object, Runtime, Tag, TryFromValue, Value, VarIndex};
use tracing::{info, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn variable_index(this: &Object, name: &str) -> Result<VarIndex, Error> {
    let class = this.class();
    class.variable_index(name).ok_or_else(|| Error::VariableOutOfBounds {
        class: Arc::clone(class.name()),
        index: class.variable_count(),
    })
}

fn variable(this: &Object, name: &str) -> Result<i64, Error> {
    match this.get_variable(variable_index(this, name)?)? {
        Value::Nil => Ok(0),
        value => i64::try_from_value(&value),
    }
}

fn set_variable(this: &Object, name: &str, value: i64) -> Result<(), Error> {
    this.set_variable(variable_index(this, name)?, Value::Int(value))
}

fn main() -> Result<(), Error> {
    tracing_subscriber::registry()
        .with(fmt::layer().without_time())
        .with(
            EnvFilter::builder().with_default_directive(LevelFilter::INFO.into()).from_env_lossy(),
        )
        .init();

    let runtime = Runtime::new();

    let counter = ClassBuilder::new("Counter")
        .add_variable("count")
        .add_method("tick", |this: &Object| -> Result<i64, Error> {
            let count = variable(this, "count")? + 1;
            set_variable(this, "count", count)?;
            Ok(count)
        })
        .build(&runtime)?;

    let doubler = ClassBuilder::new("Doubler")
        .add_variable("value")
        .add_method("tick", |this: &Object| -> Result<i64, Error> {
            let value = variable(this, "value")?.max(1) * 2;
            set_variable(this, "value", value)?;
            Ok(value)
        })
        .build(&runtime)?;

    let objects = [
        runtime.create_object_opt(None, &counter),
        runtime.create_object_opt(None, &doubler),
    ];

    let site = CacheId::from_u32(0);
    let tick = Tag::of("tick");
    for round in 0..4 {
        for object in &objects {
            let value: i64 = runtime.call_cached(site, tick, object, ())?;
            info!(round, class = %object.class().name(), value, "tick");
        }
    }

    let stats = runtime.cache_stats();
    info!(hits = stats.hits, misses = stats.misses, hit_rate = stats.hit_rate(), "done");
    Ok(())
}
