use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use realty_advisor::preprocessing::{ColumnTransformer, FittedTransformer, Transformer};
use realty_advisor::{FeatureEngineer, FeatureFrame, RawListing};
use std::hint::black_box;

fn listing(i: usize) -> RawListing {
    let cities = ["Pune", "Mumbai", "Chennai", "Jaipur", "Delhi"];
    RawListing {
        state: "Maharashtra".into(),
        city: cities[i % cities.len()].into(),
        locality: format!("Locality_{}", i % 40),
        property_type: "Apartment".into(),
        bhk: (1 + i % 5) as f64,
        size_in_sqft: 500.0 + (i % 3000) as f64,
        price_in_lakhs: 20.0 + (i % 480) as f64,
        year_built: 1990.0 + (i % 34) as f64,
        furnished_status: "Semi-furnished".into(),
        floor_no: (i % 20) as f64,
        total_floors: 20.0,
        nearby_schools: (i % 10) as f64,
        nearby_hospitals: (i % 7) as f64,
        public_transport_accessibility: "Medium".into(),
        parking_space: "Yes".into(),
        security: Some("Yes".into()),
        facing: "North".into(),
        owner_type: "Owner".into(),
        availability_status: "Ready_to_Move".into(),
        amenities: Some("Gym, Pool".into()),
    }
}

fn bench_engineer(c: &mut Criterion) {
    let engineer = FeatureEngineer::default();
    for size in [100, 1000, 10000].iter() {
        let listings: Vec<RawListing> = (0..*size).map(listing).collect();
        c.bench_with_input(BenchmarkId::new("engineer", size), &listings, |b, listings| {
            b.iter(|| {
                for l in listings {
                    black_box(engineer.engineer(black_box(l)).ok());
                }
            });
        });
    }
}

fn bench_frame_transform(c: &mut Criterion) {
    let engineer = FeatureEngineer::default();
    for size in [100, 1000, 10000].iter() {
        let features: Vec<_> = (0..*size)
            .filter_map(|i| engineer.engineer(&listing(i)).ok())
            .collect();
        let frame = FeatureFrame::from_features(&features);
        let Ok(fitted) = ColumnTransformer::standard().fit(&frame) else {
            continue;
        };
        c.bench_with_input(BenchmarkId::new("frame_transform", size), &features, |b, features| {
            b.iter(|| {
                let frame = FeatureFrame::from_features(black_box(features));
                black_box(fitted.transform(&frame).ok());
            });
        });
    }
}

criterion_group!(benches, bench_engineer, bench_frame_transform);
criterion_main!(benches);
