use criterion::{Criterion, criterion_group, criterion_main};
use vane_core::{MapConfig, PropertyAccess};

fn fixture() -> MapConfig {
    MapConfig::builder()
        .name("bench")
        .put("native", 42i32)
        .put("text", "8080")
        .put("host", "example.org")
        .put("url", "https://${host}:${text}/api")
        .put("csv", "1,2,3,4,5,6,7,8")
        .build()
}

/// Benchmark: 读取各类原始值的热点路径。
///
/// *Why*：类型化读取是配置核心调用最频繁的入口，转换、解码与插值的额外开销需要可见。
/// *How*：同一空间内分别读取原生数值、文本数值、插值模板与列表。
/// *What*：关注每次读取的耗时，插值模板与原生值的差距反映解析器创建成本。
fn bench_getters(c: &mut Criterion) {
    let config = fixture();

    c.bench_function("getters_native_integer", |b| {
        b.iter(|| criterion::black_box(config.get_long("native").expect("native")));
    });
    c.bench_function("getters_decoded_integer", |b| {
        b.iter(|| criterion::black_box(config.get_integer("text").expect("decoded")));
    });
    c.bench_function("getters_interpolated_string", |b| {
        b.iter(|| criterion::black_box(config.get_string("url").expect("interpolated")));
    });
    c.bench_function("getters_integer_list", |b| {
        b.iter(|| criterion::black_box(config.get_list::<i32>("csv").expect("list")));
    });
    c.bench_function("getters_missing_with_default", |b| {
        b.iter(|| criterion::black_box(config.get_integer_or("absent", 7).expect("default")));
    });
}

criterion_group!(getter_benches, bench_getters);
criterion_main!(getter_benches);
