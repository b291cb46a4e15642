// Criterion benchmarks for Travel Match

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};
use std::collections::HashSet;
use travel_match::core::{
    validation::parse_response, validate_and_normalize, Extractor, ExtractorConfig, HeuristicScorer,
};
use travel_match::models::{CandidateListing, ListingKind, UserPreferences, UserProfile};

fn create_candidate(id: usize) -> CandidateListing {
    CandidateListing {
        title: Some(format!("Listing {}", id)),
        kind: Some(if id % 2 == 0 { ListingKind::Rail } else { ListingKind::Lodging }),
        location: Some(if id % 3 == 0 { "Milano Centrale" } else { "Roma Termini" }.to_string()),
        price: if id % 5 == 0 { None } else { Some(20.0 + (id % 150) as f64) },
        description: Some("Posto finestrino, carrozza 5".to_string()),
        ..CandidateListing::new(id.to_string())
    }
}

fn create_user() -> UserProfile {
    UserProfile {
        id: "current_user".to_string(),
        preferences: UserPreferences {
            kinds: vec![ListingKind::Rail],
            location: Some("milano".to_string()),
            max_price: Some(100.0),
        },
    }
}

fn bench_heuristic_scoring(c: &mut Criterion) {
    let scorer = HeuristicScorer::with_default_weights();
    let user = create_user();

    let mut group = c.benchmark_group("heuristic");

    for candidate_count in [10, 50, 100, 500, 1000].iter() {
        let candidates: Vec<CandidateListing> = (0..*candidate_count).map(create_candidate).collect();

        group.bench_with_input(
            BenchmarkId::new("score", candidate_count),
            candidate_count,
            |b, _| {
                b.iter(|| scorer.score(black_box(&user), black_box(&candidates)));
            },
        );
    }

    group.finish();
}

fn bench_model_output_validation(c: &mut Criterion) {
    let entries: Vec<Value> = (0..40)
        .map(|i| json!({ "id": i.to_string(), "score": i * 3, "bidirectional": i % 2 == 0 }))
        .collect();
    let fenced = format!("Here are the scores:\n```json\n{}\n```", Value::Array(entries));
    let ids: Vec<String> = (0..40).map(|i| i.to_string()).collect();
    let allowed: HashSet<&str> = ids.iter().map(String::as_str).collect();

    c.bench_function("parse_and_validate_40_fenced", |b| {
        b.iter(|| {
            let raw = parse_response(black_box(&fenced)).unwrap_or_default();
            black_box(validate_and_normalize(&raw, &allowed))
        });
    });
}

fn bench_canonicalize(c: &mut Criterion) {
    let extractor = Extractor::new(None, ExtractorConfig::default());
    let answer = json!({
        "kind": "train",
        "cerco_vendo": "vendo",
        "title": null,
        "location": "Torino → Venezia",
        "departAt": "2025-03-03T07:15:00",
        "arriveAt": "2025-03-03 10:40",
        "isNamedTicket": "si",
        "travelerGender": "F",
        "price": "39,90"
    });
    let obj = answer.as_object().cloned().unwrap_or_default();

    c.bench_function("canonicalize_rail_draft", |b| {
        b.iter(|| extractor.canonicalize(black_box(&obj), black_box("it")));
    });
}

criterion_group!(
    benches,
    bench_heuristic_scoring,
    bench_model_output_validation,
    bench_canonicalize
);

criterion_main!(benches);
