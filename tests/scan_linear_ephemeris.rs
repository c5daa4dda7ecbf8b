mod common;

use hifitime::Duration;

use aspectarian::aspects::Aspect;
use aspectarian::constants::{Body, EPS};
use aspectarian::orb_policy::OrbPolicy;
use aspectarian::scan::{scan_pair, scan_time_range, ScanConfig, TimeWindow};

use common::{init_logs, linear_ephemeris, t0};

/// Mars = 10° + 0.2°/day, Venus = 0° + 1.0°/day: the separation is
/// |10 − 0.8·t| degrees after t days, so the sextile (60°) is exact at
/// t = 87.5 days.
fn mars_venus() -> impl aspectarian::position::PositionProvider {
    linear_ephemeris(vec![(Body::Mars, 10.0, 0.2), (Body::Venus, 0.0, 1.0)])
}

#[test]
fn test_sextile_root_within_thirty_seconds_of_analytic_solution() {
    init_logs();
    let provider = mars_venus();
    let window = TimeWindow::new(t0(), t0() + Duration::from_days(120.0)).unwrap();

    let hits = scan_pair(
        Body::Mars,
        Body::Venus,
        &window,
        &provider,
        &[Aspect::Sextile.angle()],
        &OrbPolicy::default(),
        &ScanConfig::from_minutes(720, 120).unwrap(),
    )
    .unwrap();

    assert_eq!(hits.len(), 1);
    let expected = t0() + Duration::from_days(87.5);
    let error_seconds = (hits[0].exact_time - expected).to_seconds().abs();
    assert!(
        error_seconds < 30.0,
        "root {} is {error_seconds:.1}s away from the analytic solution",
        hits[0].exact_time
    );
    assert!(hits[0].orb <= 1e-3, "orb too loose: {}", hits[0].orb);
}

#[test]
fn test_orb_containment_across_aspects_and_harmonics() {
    let provider = mars_venus();
    let window = TimeWindow::new(t0(), t0() + Duration::from_days(250.0)).unwrap();

    let hits = scan_time_range(
        &[Body::Mars, Body::Venus],
        &window,
        &provider,
        &[
            Aspect::Conjunction,
            Aspect::Sextile,
            Aspect::Square,
            Aspect::Trine,
            Aspect::Opposition,
        ],
        &[5],
        &OrbPolicy::default(),
        None,
        &ScanConfig::from_minutes(720, 120).unwrap(),
    )
    .unwrap();

    assert!(!hits.is_empty());
    for hit in &hits {
        assert!(
            hit.orb <= hit.orb_limit + EPS,
            "orb {} exceeds limit {} for angle {}",
            hit.orb,
            hit.orb_limit,
            hit.aspect_angle
        );
    }
}

#[test]
fn test_no_two_hits_of_one_target_closer_than_dedup() {
    let provider = mars_venus();
    let window = TimeWindow::new(t0(), t0() + Duration::from_days(250.0)).unwrap();
    let dedup_minutes = 2880u32;

    let hits = scan_time_range(
        &[Body::Mars, Body::Venus],
        &window,
        &provider,
        &[
            Aspect::Conjunction,
            Aspect::Sextile,
            Aspect::Square,
            Aspect::Trine,
            Aspect::Opposition,
        ],
        &[],
        &OrbPolicy::default(),
        None,
        &ScanConfig::from_minutes(720, dedup_minutes).unwrap(),
    )
    .unwrap();

    let dedup_seconds = dedup_minutes as f64 * 60.0;
    for (i, first) in hits.iter().enumerate() {
        for second in &hits[i + 1..] {
            if first.aspect_angle == second.aspect_angle {
                let gap = (second.exact_time - first.exact_time).to_seconds().abs();
                assert!(
                    gap >= dedup_seconds,
                    "hits for target {} only {gap:.0}s apart",
                    first.aspect_angle
                );
            }
        }
    }
}

#[test]
fn test_merged_hits_are_time_sorted() {
    let provider = linear_ephemeris(vec![
        (Body::Sun, 0.0, 1.0),
        (Body::Venus, 5.0, 1.2),
        (Body::Mars, 40.0, 0.5),
    ]);
    let window = TimeWindow::new(t0(), t0() + Duration::from_days(180.0)).unwrap();

    let hits = scan_time_range(
        &[Body::Sun, Body::Venus, Body::Mars],
        &window,
        &provider,
        &[Aspect::Conjunction, Aspect::Sextile, Aspect::Square],
        &[],
        &OrbPolicy::default(),
        None,
        &ScanConfig::from_minutes(360, 120).unwrap(),
    )
    .unwrap();

    assert!(!hits.is_empty());
    for pair in hits.windows(2) {
        assert!(pair[0].exact_time <= pair[1].exact_time);
    }
}

#[test]
fn test_window_shorter_than_step_samples_both_ends() {
    // 30 minutes of slow relative motion far from any target: two boundary
    // samples, no hits
    let provider = mars_venus();
    let window = TimeWindow::new(t0(), t0() + Duration::from_seconds(1800.0)).unwrap();

    let hits = scan_pair(
        Body::Mars,
        Body::Venus,
        &window,
        &provider,
        &[Aspect::Sextile.angle()],
        &OrbPolicy::default(),
        &ScanConfig::from_minutes(720, 120).unwrap(),
    )
    .unwrap();

    assert!(hits.is_empty());
}
