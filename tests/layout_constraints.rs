use solar_tilt_ga::optimization::{FnObjective, GaParameters, LayoutOptimizer, decode_genes};
use solar_tilt_ga::{Foundation, RectangularBound, SitePoint};

fn params() -> GaParameters {
    GaParameters::default()
        .with_population_size(30)
        .with_maximum_generations(5)
        .with_seed(7)
}

#[test]
fn violations_match_points_strictly_inside_bounds() {
    let foundation = Foundation::new(0.0, 0.0, 20.0, 10.0);
    let mut points = vec![SitePoint::new(1.0, 1.0), SitePoint::new(-6.0, 2.0)];
    let bounds = [
        RectangularBound::new(-10.0, -5.0, 10.0, 5.0),
        RectangularBound::centered(5.0, 2.5, 4.0, 4.0),
    ];
    let objective = FnObjective::new(|_: &[f64]| Ok(0.0));

    let mut optimizer = LayoutOptimizer::layout(foundation, &mut points, objective, params()).unwrap();
    for bound in bounds {
        optimizer.add_constraint(bound);
    }

    let any = optimizer.detect_violations();

    let mut expected_any = false;
    for (individual, &flagged) in optimizer
        .population()
        .individuals()
        .iter()
        .zip(optimizer.population().violations())
    {
        let values = decode_genes(optimizer.genes(), individual.genes());
        let inside = values
            .chunks_exact(2)
            .any(|p| bounds.iter().any(|b| b.contains(p[0], p[1])));
        assert_eq!(flagged, inside, "point set {values:?}");
        expected_any |= inside;
    }
    assert_eq!(any, expected_any);
}

#[test]
fn points_on_a_bound_edge_are_allowed() {
    let foundation = Foundation::new(0.0, 0.0, 10.0, 10.0);
    let mut points = vec![SitePoint::new(0.0, 0.0)];
    let objective = FnObjective::new(|_: &[f64]| Ok(0.0));

    let mut optimizer = LayoutOptimizer::layout(
        foundation,
        &mut points,
        objective,
        params().with_population_size(1),
    )
    .unwrap();
    // The seed sits exactly on the left edge.
    optimizer.add_constraint(RectangularBound::new(0.0, -1.0, 2.0, 2.0));
    assert!(!optimizer.detect_violations());

    optimizer.add_constraint(RectangularBound::new(-1.0, -1.0, 2.0, 2.0));
    assert!(optimizer.detect_violations());
}

#[test]
fn tilt_style_scalar_genes_ignore_constraints() {
    use solar_tilt_ga::SolarPanel;
    use solar_tilt_ga::optimization::SolarPanelTiltAngleOptimizer;

    let mut panels = vec![SolarPanel::new(0.0), SolarPanel::new(0.0)];
    let objective = FnObjective::new(|_: &[f64]| Ok(0.0));
    let mut optimizer =
        SolarPanelTiltAngleOptimizer::tilt_angles(&mut panels, objective, params()).unwrap();
    // Would swallow every (tilt, tilt) pair if genes were read as coordinates.
    optimizer.add_constraint(RectangularBound::new(-100.0, -100.0, 200.0, 200.0));

    assert!(!optimizer.detect_violations());
    assert!(optimizer.population().violations().iter().all(|v| !v));
}

#[test]
fn layout_result_stays_on_the_foundation() {
    let foundation = Foundation::new(2.0, -1.0, 6.0, 4.0);
    let mut points = vec![SitePoint::new(2.0, -1.0), SitePoint::new(3.0, 0.0)];
    // Spread the two points apart.
    let objective = FnObjective::new(|p: &[f64]| Ok((p[0] - p[2]).hypot(p[1] - p[3])));

    let mut optimizer = LayoutOptimizer::layout(foundation, &mut points, objective, params()).unwrap();
    let result = optimizer.evolve().unwrap();
    drop(optimizer);

    let seed_spread = 2.0f64.sqrt();
    assert!(result.final_fitness.unwrap() >= seed_spread - 1e-12);
    for point in &points {
        assert!((-1.0..=5.0).contains(&point.x), "x out of foundation: {}", point.x);
        assert!((-3.0..=1.0).contains(&point.y), "y out of foundation: {}", point.y);
    }
}
