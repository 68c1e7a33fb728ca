use dragnet_common::{DownstreamModule, MassiveSnapshot, ValidationReport, ValidationThresholds};

/// Judge whether a snapshot can feed the downstream modules. Never fails;
/// a degenerate snapshot just produces a report full of problems.
pub fn validate(snapshot: &MassiveSnapshot, thresholds: &ValidationThresholds) -> ValidationReport {
    let mut report = ValidationReport::default();

    let total_chars = snapshot.total_chars();
    report.sufficient_volume = total_chars >= thresholds.min_total_chars;
    if !report.sufficient_volume {
        report.problems.push(format!(
            "Insufficient volume: {total_chars} < {} characters",
            thresholds.min_total_chars
        ));
        report
            .recommendations
            .push("Broaden the source configuration: enable more search providers or social platforms".to_string());
    }

    let quality = snapshot.stats.average_quality();
    report.quality_approved = quality >= thresholds.min_average_quality;
    if !report.quality_approved {
        report.problems.push(format!(
            "Quality too low: {quality:.1} < {}",
            thresholds.min_average_quality
        ));
        report
            .recommendations
            .push("Prefer higher-trust providers for extraction".to_string());
    }

    report.feasible_modules = DownstreamModule::ALL
        .iter()
        .copied()
        .filter(|m| snapshot.is_ready(*m))
        .collect();
    if report.feasible_modules.len() < thresholds.min_feasible_modules {
        report.recommendations.push(format!(
            "Insufficient source diversity: only {} of {} modules feasible",
            report.feasible_modules.len(),
            DownstreamModule::ALL.len()
        ));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consolidate::{Consolidator, PhaseOutputs};
    use crate::extraction::ExtractionOutcome;
    use crate::search::WebSearchOutcome;
    use crate::social::SocialOutcome;
    use crate::testing::test_query;
    use dragnet_common::{CollectionStats, DeepNavigation, ReadinessPolicy};

    fn snapshot_with(chars: u64, quality: f64, policy: ReadinessPolicy) -> MassiveSnapshot {
        let mut stats = CollectionStats::new();
        if chars > 0 {
            stats.record_document(chars as usize, quality);
        }
        Consolidator::new(policy).consolidate(
            "run",
            &test_query(),
            &stats,
            PhaseOutputs {
                web: WebSearchOutcome::default(),
                social: SocialOutcome::default(),
                deep: DeepNavigation::default(),
                extraction: ExtractionOutcome::default(),
            },
        )
    }

    #[test]
    fn thresholds_are_inclusive_and_monotone() {
        let thresholds = ValidationThresholds::default();

        let below = validate(&snapshot_with(49_999, 59.9, ReadinessPolicy::Static), &thresholds);
        assert!(!below.sufficient_volume);
        assert!(!below.quality_approved);

        let at = validate(&snapshot_with(50_000, 60.0, ReadinessPolicy::Static), &thresholds);
        assert!(at.sufficient_volume);
        assert!(at.quality_approved);
        assert!(at.problems.is_empty());

        let above = validate(&snapshot_with(120_000, 91.0, ReadinessPolicy::Static), &thresholds);
        assert!(above.sufficient_volume && above.quality_approved);
    }

    #[test]
    fn problem_messages_carry_actual_and_required() {
        let report = validate(
            &snapshot_with(12_345, 42.3, ReadinessPolicy::Static),
            &ValidationThresholds::default(),
        );
        assert_eq!(
            report.problems,
            vec![
                "Insufficient volume: 12345 < 50000 characters".to_string(),
                "Quality too low: 42.3 < 60".to_string(),
            ]
        );
        assert_eq!(report.recommendations.len(), 2);
    }

    #[test]
    fn degenerate_snapshot_reports_without_panicking() {
        let report = validate(
            &snapshot_with(0, 0.0, ReadinessPolicy::Measured),
            &ValidationThresholds::default(),
        );
        assert!(!report.sufficient_volume);
        assert!(!report.problems.is_empty());
        assert!(report.feasible_modules.is_empty());
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.starts_with("Insufficient source diversity")));
    }

    #[test]
    fn static_readiness_makes_every_module_feasible() {
        let report = validate(
            &snapshot_with(0, 0.0, ReadinessPolicy::Static),
            &ValidationThresholds::default(),
        );
        assert_eq!(report.feasible_modules, DownstreamModule::ALL.to_vec());
    }
}
