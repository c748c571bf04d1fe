//! Interpreter throughput benchmarks
//!
//! ```bash
//! cargo bench --package weave-evm --bench interpreter
//! ```

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use weave_evm::asm::assemble;
use weave_evm::{CallContext, ChainSpec, Environment, Evm};
use weave_primitives::{Address, U256};
use weave_state::InMemoryRepository;

const GAS: u64 = 100_000_000;

fn run(evm: &Evm<'_>, code: &Bytes, input: Bytes) -> u64 {
    let mut repo = InMemoryRepository::new();
    let ctx = CallContext::new(
        Address::from_low_u64_be(0xa),
        Address::from_low_u64_be(0x1),
        U256::zero(),
        input,
        GAS,
    );
    evm.execute(code.clone(), ctx, &mut repo).gas_used
}

fn bench_countdown(c: &mut Criterion) {
    let spec = ChainSpec::default();
    let env = Environment::default();
    let evm = Evm::new(&spec, &env);

    // counter on the stack, loop body at offset 4
    let mut group = c.benchmark_group("interpreter/countdown");
    for iterations in [100u64, 1_000, 10_000] {
        let text = format!(
            "PUSH3 {iterations} JUMPDEST PUSH1 1 SWAP1 SUB DUP1 PUSH1 4 JUMPI STOP"
        );
        let code = Bytes::from(assemble(&text).unwrap());
        group.bench_with_input(BenchmarkId::from_parameter(iterations), &code, |b, code| {
            b.iter(|| run(&evm, black_box(code), Bytes::new()))
        });
    }
    group.finish();
}

fn bench_sha3(c: &mut Criterion) {
    let spec = ChainSpec::default();
    let env = Environment::default();
    let evm = Evm::new(&spec, &env);

    let code = Bytes::from(
        assemble("CALLDATASIZE PUSH1 0 PUSH1 0 CALLDATACOPY CALLDATASIZE PUSH1 0 SHA3 POP")
            .unwrap(),
    );
    let mut group = c.benchmark_group("interpreter/sha3");
    for size in [32usize, 1024, 32 * 1024] {
        let input = Bytes::from(vec![0xab; size]);
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| run(&evm, &code, black_box(input.clone())))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_countdown, bench_sha3);
criterion_main!(benches);
