use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;

use sc_structure::find_stem_loops;
use sc_shape::Reactivity;
use sc_shape::PredictorError;
use sc_shape::ScanConfig;
use sc_shape::ScoreParams;
use sc_shape::scan_stem_loops;
use sc_shape::score_stem;

const HAIRPIN: &str = "((((((((...((((....))))...))))))))..((((((....)).))))....";

fn structure(copies: usize) -> String {
    HAIRPIN.repeat(copies)
}

fn profile(dot: &str) -> Vec<Reactivity> {
    dot.bytes().enumerate()
        .map(|(k, c)| Some(if c == b'.' { 0.5 + 0.03 * (k % 11) as f64 } else { 0.04 * (k % 3) as f64 }))
        .collect()
}

pub fn stem_loops(c: &mut Criterion) {
    let mut group = c.benchmark_group("StemLoops");

    let dot = structure(100);
    let values = profile(&dot);
    let params = ScoreParams::default();
    let stems = find_stem_loops(&dot, 8, 3, 5).unwrap();

    group.bench_function("Find stem-loops in 5.7 knt.", |b| {
        b.iter(|| {
            let _ = find_stem_loops(&dot, 8, 3, 5);
        });
    });

    group.bench_function("Score all stem-loops in 5.7 knt.", |b| {
        b.iter(|| {
            for stem in &stems {
                let _ = score_stem(&dot, &values, stem, &params);
            }
        });
    });

    // Folding dominates a real scan, here every window stays unfolded.
    let sequence = "ACGU".repeat(dot.len() / 4 + 1)[..dot.len()].to_string();
    let unfolded = |window: &str, _: Option<&[Reactivity]>| -> Result<String, PredictorError> {
        Ok(".".repeat(window.len()))
    };
    let config = ScanConfig::default();
    group.bench_function("Scan 5.7 knt without folding.", |b| {
        b.iter(|| {
            let _ = scan_stem_loops(&sequence, Some(&values), &unfolded, &config);
        });
    });
}

criterion_group!(benches, stem_loops);
criterion_main!(benches);
