use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pktqueue::{PktQueue, PktReplacer};
use std::thread;

const PACKETS: u64 = 10_000;

fn stream(capacity: usize) {
    let q: PktQueue = PktQueue::new(capacity);
    let (r, w) = (q.read_part(), q.write_part());

    let writer = thread::spawn(move || {
        let mut pkt = w.take_empty();
        for n in 1..PACKETS {
            pkt[0] = n as u8;
            pkt = w.replace_pkt(pkt).unwrap();
        }
        w.submit(pkt);
        w.close();
    });

    if let Some(mut pkt) = r.recv_filled() {
        while let Ok(next) = r.replace_pkt(pkt) {
            black_box(next[0]);
            pkt = next;
        }
    }
    writer.join().unwrap();
}

fn bench_replace_pkt(c: &mut Criterion) {
    let mut group = c.benchmark_group("replace_pkt");
    group.throughput(Throughput::Elements(PACKETS));

    for capacity in [1usize, 8, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &capacity, |b, &cap| {
            b.iter(|| stream(cap))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_replace_pkt);
criterion_main!(benches);
