use std::sync::Arc;

use ducktable::{CacheId, ClassBuilder, Object, Tag, Value};

use super::{create_runtime, RevealResultExt};

#[test]
fn many_classes_share_one_call_site() {
    let runtime = create_runtime();
    let objects: Vec<_> = (0..64_i64)
        .map(|i| {
            let class = ClassBuilder::new(format!("C{i}"))
                .add_method("get", move |_: &Object| i)
                .build(&runtime)
                .reveal();
            runtime.create_object_opt(None, &class)
        })
        .collect();

    for _ in 0..4 {
        for (i, object) in objects.iter().enumerate() {
            let value =
                runtime.invoke_cached(CacheId::from_u32(0), Tag::of("get"), object, &[]).reveal();
            assert_eq!(value, Value::Int(i as i64));
        }
    }
    let stats = runtime.cache_stats();
    assert_eq!(stats.hits + stats.misses, 256);
}

#[test]
fn call_sites_are_shared_across_threads() {
    let runtime = Arc::new(create_runtime());
    let class = ClassBuilder::new("Doubler")
        .add_method("double", |_: &Object, x: i64| x * 2)
        .build(&runtime)
        .reveal();
    let object = Arc::new(runtime.create_object_opt(None, &class));

    let handles: Vec<_> = (0..8_i64)
        .map(|thread| {
            let runtime = Arc::clone(&runtime);
            let object = Arc::clone(&object);
            std::thread::spawn(move || {
                for x in 0..1000 {
                    let site = CacheId::from_u32(1);
                    let doubled: i64 = runtime
                        .call_cached(site, Tag::of("double"), &object, (x + thread,))
                        .reveal();
                    assert_eq!(doubled, (x + thread) * 2);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    // Threads racing on a cold site may each resolve once; after that everything hits.
    let stats = runtime.call_site(CacheId::from_u32(1)).stats();
    assert_eq!(stats.hits + stats.misses, 8000);
    assert!(stats.misses <= 8, "{stats:?}");
}
