use skytag::{lookup, lookup_in_map, lookup_one, report, Error, LookupOptions, SkyMap};
use skytag_core::constants::FOUR_PI_SR;
use skytag_fits::test_utils::{MockColumn, MockFitsBuilder};
use tempfile::NamedTempFile;

const MJD_OBS: f64 = 60063.0;

fn level0_density(prob: f64) -> f64 {
    prob / (FOUR_PI_SR / 12.0)
}

fn level1_density(prob: f64) -> f64 {
    prob / (FOUR_PI_SR / 48.0)
}

/// Face 0 refined to level 1 with probabilities 0.05..0.10, the other
/// eleven faces at level 0 sharing the remaining 0.7.
fn mixed_map() -> NamedTempFile {
    let mut uniq: Vec<i64> = (16..20).collect();
    let mut density: Vec<f64> = [0.05, 0.07, 0.08, 0.10]
        .into_iter()
        .map(level1_density)
        .collect();
    uniq.extend(5..16);
    density.extend(std::iter::repeat_n(level0_density(0.7 / 11.0), 11));

    MockFitsBuilder::new()
        .simple_primary()
        .binary_table(&[
            ("UNIQ", MockColumn::Long(uniq)),
            ("PROBDENSITY", MockColumn::Double(density)),
        ])
        .real("MJD-OBS", MJD_OBS)
        .build_temp_file()
}

fn distance_map(mu: f64, sigma: f64, summary: Option<(f64, f64)>) -> NamedTempFile {
    let mut builder = MockFitsBuilder::new().simple_primary();
    if let Some((mean, std)) = summary {
        builder = builder.real("DISTMEAN", mean).real("DISTSTD", std);
    }
    builder
        .binary_table(&[
            ("UNIQ", MockColumn::Long((4..16).collect())),
            ("PROBDENSITY", MockColumn::Float(vec![0.0795775; 12])),
            ("DISTMU", MockColumn::Double(vec![mu; 12])),
            ("DISTSIGMA", MockColumn::Double(vec![sigma; 12])),
            ("DISTNORM", MockColumn::Double(vec![1e-5; 12])),
        ])
        .real("MJD-OBS", MJD_OBS)
        .build_gzip_temp_file()
}

#[test]
fn test_credibility_across_levels() {
    let file = mixed_map();
    let results = lookup(
        &[45.0, 30.0, 60.0, 135.0, 225.0],
        &[80.0, 50.0, 50.0, 60.0, -60.0],
        file.path(),
        None,
        &LookupOptions::default(),
    )
    .unwrap();

    let credibility: Vec<f64> = results.iter().map(|r| r.credibility).collect();
    // UNIQ 19, 18, 17, 5 and 14 (face 10, second to last base face).
    assert_eq!(credibility, vec![10.0, 18.0, 25.0, 36.36, 93.64]);
    assert!(results.iter().all(|r| r.time_delta.is_none()));
}

#[test]
fn test_results_follow_query_order() {
    let file = mixed_map();
    let ra = [225.0, 45.0, 135.0];
    let dec = [-60.0, 80.0, 60.0];
    let forward = lookup(&ra, &dec, file.path(), None, &LookupOptions::default()).unwrap();

    let ra_rev: Vec<f64> = ra.iter().rev().copied().collect();
    let dec_rev: Vec<f64> = dec.iter().rev().copied().collect();
    let reverse = lookup(&ra_rev, &dec_rev, file.path(), None, &LookupOptions::default()).unwrap();

    assert_eq!(forward.len(), 3);
    for (a, b) in forward.iter().zip(reverse.iter().rev()) {
        assert_eq!(a, b);
    }
}

#[test]
fn test_time_delta() {
    let file = mixed_map();
    let result = lookup_one(
        10.343234,
        14.345532,
        file.path(),
        Some(60034.257381),
        &LookupOptions::default(),
    )
    .unwrap();
    assert_eq!(result.time_delta, Some(-28.74262));
    assert!(report::sentence(&result).contains("occurred 28.74262 days before the map event"));
}

#[test]
fn test_idempotent() {
    let file = mixed_map();
    let options = LookupOptions::default().with_probability_density(true);
    let ra = [10.343234, 170.343532, 300.0];
    let dec = [14.345532, -40.532255, 5.0];
    let mjd = [60034.257381, 60063.5, 60100.0];

    let first = lookup(&ra, &dec, file.path(), Some(&mjd), &options).unwrap();
    let second = lookup(&ra, &dec, file.path(), Some(&mjd), &options).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_credibility_bounds_over_sky_grid() {
    let file = mixed_map();
    let map = SkyMap::load(file.path()).unwrap();

    let mut ra = Vec::new();
    let mut dec = Vec::new();
    for i in 0..24 {
        for j in 0..13 {
            ra.push(i as f64 * 15.0 + 1.0);
            dec.push(j as f64 * 15.0 - 90.0);
        }
    }

    let results = lookup_in_map(&map, &ra, &dec, None, &LookupOptions::default()).unwrap();
    assert_eq!(results.len(), ra.len());
    assert!(results
        .iter()
        .all(|r| (0.0..=100.0).contains(&r.credibility)));

    let mut cumprob: Vec<f64> = map.pixels().iter().map(|p| p.cumprob).collect();
    let ranked = cumprob.clone();
    cumprob.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(cumprob, ranked);
    assert!((map.total_probability() - 1.0).abs() < 1e-3);
}

#[test]
fn test_distance_requested_without_columns() {
    let file = mixed_map();
    let options = LookupOptions::default().with_distance(true);
    let results = lookup(&[45.0, 135.0], &[80.0, 60.0], file.path(), None, &options).unwrap();

    for result in &results {
        let distance = result.distance.unwrap();
        assert_eq!((distance.mean, distance.std), (None, None));
    }
    assert!(report::sentence(&results[0]).ends_with("no distance localisation for this position."));
}

#[test]
fn test_distance_uses_map_rmax() {
    let options = LookupOptions::default().with_distance(true);

    let default_rmax = distance_map(400.0, 100.0, None);
    let result = lookup_one(45.0, 60.0, default_rmax.path(), None, &options).unwrap();
    let distance = result.distance.unwrap();
    assert_eq!((distance.mean, distance.std), (Some(401.63), Some(66.34)));

    let summarized = distance_map(400.0, 100.0, Some((400.0, 100.0)));
    let result = lookup_one(45.0, 60.0, summarized.path(), None, &options).unwrap();
    let distance = result.distance.unwrap();
    assert_eq!((distance.mean, distance.std), (Some(447.06), Some(94.67)));
}

#[test]
fn test_out_of_map() {
    // Faces 0 and 6 are absent.
    let uniq: Vec<i64> = (5..10).chain(11..16).collect();
    let file = MockFitsBuilder::new()
        .simple_primary()
        .binary_table(&[
            ("UNIQ", MockColumn::Long(uniq)),
            ("PROBDENSITY", MockColumn::Double(vec![level0_density(0.1); 10])),
        ])
        .real("MJD-OBS", MJD_OBS)
        .build_temp_file();
    let options = LookupOptions::default();

    assert!(matches!(
        lookup_one(45.0, 60.0, file.path(), None, &options),
        Err(Error::OutOfMap { .. })
    ));
    assert!(matches!(
        lookup_one(180.0, 0.0, file.path(), None, &options),
        Err(Error::OutOfMap { .. })
    ));
    assert_eq!(
        lookup_one(90.0, 0.0, file.path(), None, &options)
            .unwrap()
            .credibility,
        50.0
    );
}

#[test]
fn test_dimension_mismatch_before_map_access() {
    let options = LookupOptions::default();
    let err = lookup(&[1.0, 2.0, 3.0], &[1.0], "/nonexistent/map.fits", None, &options).unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch(_)));
}

#[test]
fn test_json_output() {
    let file = mixed_map();
    let options = LookupOptions::default().with_probability_density(true);
    let result = lookup_one(45.0, 80.0, file.path(), Some(60063.25), &options).unwrap();

    let json: serde_json::Value = serde_json::to_value(&result).unwrap();
    assert_eq!(json["credibility"], 10.0);
    assert_eq!(json["time_delta"], 0.25);
    assert!(json.get("distance").is_none());
    assert!(json["probability_density"].as_f64().unwrap() > 0.0);
}
