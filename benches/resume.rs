// benches/resume.rs
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use cpfile_processor::SectionStreamParser;

fn export(actions: usize) -> String {
    let mut text = String::from(
        "[Definition]\n\
         gameinfo=Game;Group;Date;TeamA;TeamB;RA;RB\n\
         statind=Game;Team;Nr;Name;Goals;Shots\n\
         actions=Game;Time;Team;Nr;Name;Text\n\
         [gameinfo]\n1001;A;2024-05-01;HCZ;SGF;31;28\n[statind]\n",
    );
    for nr in 1..=28 {
        text.push_str(&format!("1001;HCZ;{};Player{};{};{}\n", nr, nr, nr % 7, nr % 11));
    }
    text.push_str("[actions]\n");
    for i in 0..actions {
        text.push_str(&format!(
            "1001;{:02}:{:02};HCZ;{};Player{};Goal\n",
            i / 60,
            i % 60,
            i % 28,
            i % 28
        ));
    }
    text
}

fn bench_resume(c: &mut Criterion) {
    let parser = SectionStreamParser::default();
    let mut group = c.benchmark_group("grown_file");

    for &actions in &[200usize, 2_000, 20_000] {
        let before = export(actions);
        let after = export(actions + 20);
        let cursor = parser.parse_full("01.CP", &before).cursor;

        group.bench_with_input(BenchmarkId::new("full", actions), &after, |b, text| {
            b.iter(|| {
                let output = parser.parse_full("01.CP", black_box(text));
                black_box(output.stats.records_parsed)
            })
        });

        group.bench_with_input(BenchmarkId::new("resume", actions), &after, |b, text| {
            b.iter(|| {
                let output = parser.resume("01.CP", black_box(text), black_box(&cursor));
                black_box(output.stats.records_parsed)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_resume);
criterion_main!(benches);
