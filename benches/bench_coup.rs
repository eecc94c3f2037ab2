use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use coup_table::{Actor, Lobby, MatchConfig, RandomBot};

async fn complete_game(num_players: usize) {
    let mut lobby = Lobby::new(MatchConfig::default());
    for i in 0..num_players {
        let seat = lobby.join(format!("bot {i}")).unwrap();
        Actor::spawn(seat, Box::new(RandomBot::new(i as u64)));
    }
    lobby.start().unwrap().run().await.unwrap();
}

fn criterion_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    let mut group = c.benchmark_group("complete_game");
    for num_players in 2..=6usize {
        group.bench_with_input(BenchmarkId::from_parameter(num_players), &num_players, |b, &num_players| {
            b.iter(|| runtime.block_on(complete_game(num_players)))
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
