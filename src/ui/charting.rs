/// Compute X (question number) and Y (seconds) upper bounds for the response chart
pub fn compute_chart_params(points: &[(f64, f64)]) -> (f64, f64) {
    let mut slowest = 0.0_f64;
    let mut last_question = 1.0_f64;
    for &(question, secs) in points {
        slowest = slowest.max(secs);
        last_question = last_question.max(question);
    }

    // keep both axes non-degenerate so a single point still renders
    (last_question.max(2.0), slowest.ceil().max(1.0))
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.1}")
    }
}
