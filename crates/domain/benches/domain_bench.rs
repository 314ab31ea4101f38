use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use domain::{CustomerId, Money, Order, OrderStatus, ProductId};

fn order_with_items(count: u32) -> Order {
    let mut order = Order::new(CustomerId::new(1)).unwrap();
    for product in 1..=count {
        order
            .add_item(
                ProductId::new(product),
                "SKU-BENCH",
                "Benchmark Widget",
                1,
                Money::from_cents(1000),
            )
            .unwrap();
    }
    order
}

fn bench_create_order(c: &mut Criterion) {
    c.bench_function("domain/create_order", |b| {
        b.iter(|| Order::new(CustomerId::new(1)).unwrap());
    });
}

fn bench_add_item(c: &mut Criterion) {
    let mut group = c.benchmark_group("domain/add_item");

    for existing in [0u32, 10, 100] {
        group.bench_with_input(
            BenchmarkId::from_parameter(existing),
            &existing,
            |b, &existing| {
                let base = order_with_items(existing);
                b.iter(|| {
                    let mut order = base.clone();
                    order
                        .add_item(
                            ProductId::new(existing + 1),
                            "SKU-NEW",
                            "New Widget",
                            2,
                            Money::from_cents(500),
                        )
                        .unwrap();
                });
            },
        );
    }

    group.finish();
}

fn bench_calculate_total(c: &mut Criterion) {
    let mut order = order_with_items(100);

    c.bench_function("domain/calculate_total_100_items", |b| {
        b.iter(|| order.calculate_total());
    });
}

fn bench_full_lifecycle(c: &mut Criterion) {
    c.bench_function("domain/full_lifecycle", |b| {
        b.iter(|| {
            let mut order = order_with_items(3);
            for target in [
                OrderStatus::Confirmed,
                OrderStatus::Processing,
                OrderStatus::Shipped,
                OrderStatus::Delivered,
                OrderStatus::Refunded,
            ] {
                order.transition_to(target).unwrap();
            }
        });
    });
}

criterion_group!(
    benches,
    bench_create_order,
    bench_add_item,
    bench_calculate_total,
    bench_full_lifecycle
);
criterion_main!(benches);
