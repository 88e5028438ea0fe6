//! Plain-text reporting over a finished classification run
//!
//! The layout is fixed and carries no timestamps, so the same result always
//! renders to the same bytes. Anomalies print worst-first; classifications
//! print most-certain-first.

use serde::{Deserialize, Serialize};

use crate::core::{Anomaly, Classification, ClassificationResult, DomainKind};

const RULE_WIDTH: usize = 80;

/// Counts over one classification run.
///
/// `classified` excludes the UNCLASSIFIED residual; `reliable` and
/// `needing_review` split the classified set by certainty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationStats {
    pub total: usize,
    pub classified: usize,
    pub reliable: usize,
    pub needing_review: usize,
    pub unclassified: usize,
}

impl ClassificationStats {
    pub fn classified_percent(&self) -> f64 {
        percentage(self.classified, self.total)
    }

    pub fn reliable_percent(&self) -> f64 {
        percentage(self.reliable, self.total)
    }

    pub fn needing_review_percent(&self) -> f64 {
        percentage(self.needing_review, self.total)
    }

    pub fn unclassified_percent(&self) -> f64 {
        percentage(self.unclassified, self.total)
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

impl ClassificationResult {
    pub fn statistics(&self) -> ClassificationStats {
        let total = self.classifications.len();
        let classified = self
            .classifications
            .values()
            .filter(|c| c.kind != DomainKind::Unclassified)
            .count();
        let reliable = self
            .classifications
            .values()
            .filter(|c| c.certainty.is_reliable())
            .count();
        let needing_review = self
            .classifications
            .values()
            .filter(|c| c.certainty.needs_review())
            .count();
        ClassificationStats {
            total,
            classified,
            reliable,
            needing_review,
            unclassified: total - classified,
        }
    }

    /// Renders the fixed-layout text report.
    pub fn report(&self) -> String {
        let stats = self.statistics();
        let passed = !self.has_blocking_anomalies();
        let mut out = String::new();

        out.push_str(&"=".repeat(RULE_WIDTH));
        out.push('\n');
        out.push_str("ARCHMAP CLASSIFICATION REPORT\n");
        out.push_str(&"=".repeat(RULE_WIDTH));
        out.push_str("\n\n");

        out.push_str("CLASSIFICATION SUMMARY\n");
        out.push_str(&"-".repeat(RULE_WIDTH));
        out.push('\n');
        out.push_str(&summary_row(
            "CLASSIFIED:",
            stats.classified,
            stats.classified_percent(),
        ));
        out.push_str(&summary_row(
            "RELIABLE:",
            stats.reliable,
            stats.reliable_percent(),
        ));
        out.push_str(&summary_row(
            "NEEDING REVIEW:",
            stats.needing_review,
            stats.needing_review_percent(),
        ));
        out.push_str(&summary_row(
            "UNCLASSIFIED:",
            stats.unclassified,
            stats.unclassified_percent(),
        ));
        out.push_str(&format!("{:<20} {:>5}\n", "TOTAL:", stats.total));
        out.push('\n');
        out.push_str(&format!(
            "Status: {}\n",
            if passed { "PASSED" } else { "FAILED" }
        ));
        out.push('\n');

        if !self.anomalies.is_empty() {
            out.push_str(&format!("ANOMALIES ({} findings)\n", self.anomalies.len()));
            out.push_str(&"-".repeat(RULE_WIDTH));
            out.push('\n');
            for anomaly in ordered_anomalies(&self.anomalies) {
                out.push_str(&format!(
                    "[{}] {}: {}\n",
                    anomaly.severity, anomaly.kind, anomaly.message
                ));
            }
            out.push('\n');
        }

        if !self.classifications.is_empty() {
            out.push_str(&format!(
                "CLASSIFICATIONS ({} types)\n",
                self.classifications.len()
            ));
            out.push_str(&"-".repeat(RULE_WIDTH));
            out.push('\n');
            for classification in ordered_classifications(&self.classifications) {
                out.push_str(&format!(
                    "  {:<40} {:<20} {}\n",
                    classification.simple_name(),
                    classification.kind.to_string(),
                    classification.reasoning
                ));
            }
            out.push('\n');
        }

        out.push_str(&"=".repeat(RULE_WIDTH));
        out.push('\n');
        if !passed {
            out.push_str(&format!(
                "{} blocking anomalies must be resolved before generation.\n",
                self.error_anomalies().len()
            ));
        }
        out
    }
}

fn summary_row(label: &str, count: usize, percent: f64) -> String {
    format!("{label:<20} {count:>5} ({percent:>5.1}%)\n")
}

/// Severity descending, then affected type ascending.
fn ordered_anomalies(anomalies: &[Anomaly]) -> Vec<&Anomaly> {
    let mut ordered: Vec<&Anomaly> = anomalies.iter().collect();
    ordered.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.affected_type.cmp(&b.affected_type))
    });
    ordered
}

/// Certainty descending, then type name ascending.
fn ordered_classifications(
    classifications: &std::collections::BTreeMap<String, Classification>,
) -> Vec<&Classification> {
    let mut ordered: Vec<&Classification> = classifications.values().collect();
    ordered.sort_by(|a, b| {
        b.certainty
            .cmp(&a.certainty)
            .then_with(|| a.type_name.cmp(&b.type_name))
    });
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AnomalyKind, CertaintyLevel, ClassificationStrategy};
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn entry(
        name: &str,
        kind: DomainKind,
        certainty: CertaintyLevel,
        reasoning: &str,
    ) -> (String, Classification) {
        (
            name.to_string(),
            Classification::new(
                name,
                kind,
                certainty,
                ClassificationStrategy::Record,
                reasoning,
                vec![],
            ),
        )
    }

    fn result_of(entries: Vec<(String, Classification)>, anomalies: Vec<Anomaly>) -> ClassificationResult {
        ClassificationResult::new(entries.into_iter().collect::<BTreeMap<_, _>>(), anomalies)
    }

    #[test]
    fn statistics_split_by_kind_and_certainty() {
        let result = result_of(
            vec![
                entry(
                    "shop.Order",
                    DomainKind::AggregateRoot,
                    CertaintyLevel::Explicit,
                    "explicit",
                ),
                entry(
                    "shop.Money",
                    DomainKind::ValueObject,
                    CertaintyLevel::CertainByStructure,
                    "record",
                ),
                entry(
                    "shop.LineItem",
                    DomainKind::Entity,
                    CertaintyLevel::Inferred,
                    "composed",
                ),
                entry(
                    "shop.Helper",
                    DomainKind::Unclassified,
                    CertaintyLevel::None,
                    "residual",
                ),
            ],
            vec![],
        );
        let stats = result.statistics();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.classified, 3);
        assert_eq!(stats.reliable, 2);
        assert_eq!(stats.needing_review, 1);
        assert_eq!(stats.unclassified, 1);
        assert_eq!(stats.classified_percent(), 75.0);
        assert_eq!(stats.unclassified_percent(), 25.0);
    }

    #[test]
    fn empty_result_has_zero_percentages() {
        let result = result_of(vec![], vec![]);
        let stats = result.statistics();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.classified_percent(), 0.0);
        assert!(result.report().contains("Status: PASSED"));
    }

    #[test]
    fn report_layout_is_stable() {
        let result = result_of(
            vec![
                entry(
                    "shop.Order",
                    DomainKind::AggregateRoot,
                    CertaintyLevel::Explicit,
                    "Has @AggregateRoot",
                ),
                entry(
                    "shop.Money",
                    DomainKind::ValueObject,
                    CertaintyLevel::CertainByStructure,
                    "Record 'Money' without identity is classified as VALUE_OBJECT",
                ),
                entry(
                    "shop.Helper",
                    DomainKind::Unclassified,
                    CertaintyLevel::None,
                    "Type 'Helper' could not be classified by any deterministic rule",
                ),
            ],
            vec![Anomaly::warning(
                AnomalyKind::AggregateWithoutRepository,
                "shop.Order",
                "Aggregate root 'Order' has no corresponding repository. \
                 Consider creating a repository or reviewing the classification.",
                vec![],
            )],
        );

        let rule_eq = "=".repeat(80);
        let rule_dash = "-".repeat(80);
        let expected = indoc! {"
            {EQ}
            ARCHMAP CLASSIFICATION REPORT
            {EQ}

            CLASSIFICATION SUMMARY
            {DASH}
            CLASSIFIED:              2 ( 66.7%)
            RELIABLE:                2 ( 66.7%)
            NEEDING REVIEW:          0 (  0.0%)
            UNCLASSIFIED:            1 ( 33.3%)
            TOTAL:                   3

            Status: PASSED

            ANOMALIES (1 findings)
            {DASH}
            [MAJOR] AGGREGATE_WITHOUT_REPOSITORY: Aggregate root 'Order' has no corresponding repository. Consider creating a repository or reviewing the classification.

            CLASSIFICATIONS (3 types)
            {DASH}
              Order                                    AGGREGATE_ROOT       Has @AggregateRoot
              Money                                    VALUE_OBJECT         Record 'Money' without identity is classified as VALUE_OBJECT
              Helper                                   UNCLASSIFIED         Type 'Helper' could not be classified by any deterministic rule

            {EQ}
        "}
        .replace("{EQ}", &rule_eq)
        .replace("{DASH}", &rule_dash);

        assert_eq!(result.report(), expected);
    }

    #[test]
    fn anomalies_print_worst_first_then_by_type() {
        let result = result_of(
            vec![],
            vec![
                Anomaly::warning(
                    AnomalyKind::AggregateWithoutRepository,
                    "shop.Zebra",
                    "zebra warning",
                    vec![],
                ),
                Anomaly::error(
                    AnomalyKind::CompositionCycle,
                    "shop.Order",
                    "cycle",
                    vec![],
                ),
                Anomaly::warning(
                    AnomalyKind::ValueObjectWithIdentity,
                    "shop.Alpha",
                    "alpha warning",
                    vec![],
                ),
            ],
        );
        let report = result.report();
        let cycle = report.find("COMPOSITION_CYCLE").unwrap();
        let alpha = report.find("alpha warning").unwrap();
        let zebra = report.find("zebra warning").unwrap();
        assert!(cycle < alpha);
        assert!(alpha < zebra);
        assert!(report.contains("Status: FAILED"));
        assert!(report.contains("1 blocking anomalies must be resolved before generation."));
    }

    #[test]
    fn classifications_print_most_certain_first() {
        let result = result_of(
            vec![
                entry(
                    "shop.Aaa",
                    DomainKind::ValueObject,
                    CertaintyLevel::Inferred,
                    "inferred",
                ),
                entry(
                    "shop.Bbb",
                    DomainKind::AggregateRoot,
                    CertaintyLevel::Explicit,
                    "explicit",
                ),
                entry(
                    "shop.Ccc",
                    DomainKind::Entity,
                    CertaintyLevel::Explicit,
                    "also explicit",
                ),
            ],
            vec![],
        );
        let report = result.report();
        let bbb = report.find("Bbb").unwrap();
        let ccc = report.find("Ccc").unwrap();
        let aaa = report.find("Aaa").unwrap();
        assert!(bbb < ccc);
        assert!(ccc < aaa);
    }
}
