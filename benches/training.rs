use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use sigboost::booster::{train, TrainOptions};
use sigboost::data::FeatureMatrix;
use sigboost::hyperparams::default_config;

fn create_classification_data(n_rows: usize, n_features: usize) -> FeatureMatrix {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);

    let x = Array2::from_shape_fn((n_rows, n_features), |_| rng.gen::<f64>() * 10.0);

    // Signal when the first two features are large, plus label noise
    let y = Array1::from_shape_fn(n_rows, |i| {
        let score = x[[i, 0]] + x[[i, 1]] + rng.gen::<f64>() * 4.0;
        if score > 12.0 { 1.0 } else { 0.0 }
    });

    let names = (0..n_features).map(|i| format!("feature_{}", i)).collect();
    FeatureMatrix::new(x, y, names).unwrap()
}

fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("training");
    group.sample_size(10); // Fewer samples for training benchmarks

    let options = TrainOptions { num_boost_round: 50, early_stopping_rounds: None, verbose_eval: 0 };

    for n_rows in [1000, 5000, 10000].iter() {
        let data = create_classification_data(*n_rows, 10);

        for (name, hp) in [
            ("gbtree", default_config(false)),
            ("dart", default_config(false).with("booster", "dart").with("rate_drop", 0.1)),
        ] {
            let params = hp.into_pairs();
            group.bench_with_input(BenchmarkId::new(name, n_rows), &data, |b, data| {
                b.iter(|| train(black_box(&params), black_box(data), &[], &options).unwrap())
            });
        }
    }

    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("prediction");

    // Train model once
    let train_data = create_classification_data(5000, 10);
    let options = TrainOptions { num_boost_round: 100, early_stopping_rounds: None, verbose_eval: 0 };
    let params = default_config(true).into_pairs();
    let bst = train(&params, &train_data, &[], &options).unwrap();

    for n_rows in [100, 1000, 10000].iter() {
        let test_data = create_classification_data(*n_rows, 10);

        group.bench_with_input(BenchmarkId::new("predict", n_rows), &test_data, |b, data| {
            b.iter(|| bst.predict(black_box(data)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_training, bench_prediction);
criterion_main!(benches);
