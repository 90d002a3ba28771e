use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lexdesk_core::policy::{PolicyService, Principal, PrincipalId};
use lexdesk_core::practice::default_policies;
use lexdesk_core::resilience::{CircuitBreaker, CircuitBreakerConfig};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap()
}

fn benchmark_closed_circuit_call(c: &mut Criterion) {
    let rt = runtime();
    let breaker = CircuitBreaker::new("bench_closed", CircuitBreakerConfig::default()).unwrap();

    c.bench_function("closed_circuit_call", |b| {
        b.iter(|| {
            rt.block_on(breaker.execute(|| async { Ok::<_, &'static str>(black_box(42)) }))
        })
    });
}

fn benchmark_open_circuit_rejection(c: &mut Criterion) {
    let rt = runtime();
    let breaker = CircuitBreaker::new("bench_open", CircuitBreakerConfig::default()).unwrap();
    breaker.force_open();

    c.bench_function("open_circuit_rejection", |b| {
        b.iter(|| {
            rt.block_on(breaker.execute(|| async { Ok::<_, &'static str>(black_box(42)) }))
        })
    });
}

fn benchmark_policy_check(c: &mut Criterion) {
    let service = PolicyService::new();
    for policy in default_policies() {
        service.register_policy(policy);
    }
    let principal =
        Principal::new(PrincipalId::new(), "attorney").with_permissions(["clients.delete"]);

    c.bench_function("policy_check_cached", |b| {
        b.iter(|| service.can_execute(&principal.id, black_box("DeleteClientCommand"), &principal))
    });

    c.bench_function("policy_authorize_uncached", |b| {
        b.iter(|| service.authorize(&principal, black_box("delete"), "client"))
    });
}

criterion_group!(
    benches,
    benchmark_closed_circuit_call,
    benchmark_open_circuit_rejection,
    benchmark_policy_check
);
criterion_main!(benches);
