//! Report rendering over a complete analysis run

use archmap::{
    analyze, AnalysisConfig, AnalysisReport, SemanticModelBuilder, TypeNodeBuilder, TypeRef,
};
use indoc::indoc;
use pretty_assertions::assert_eq;

fn shop() -> AnalysisReport {
    let model = SemanticModelBuilder::new()
        .with(
            TypeNodeBuilder::class("demo.Order")
                .field("id", TypeRef::named("demo.OrderId"))
                .collection_field("lines", TypeRef::named("demo.LineItem"))
                .build(),
        )
        .with(
            TypeNodeBuilder::record("demo.OrderId")
                .field("value", TypeRef::named("java.util.UUID"))
                .build(),
        )
        .with(
            TypeNodeBuilder::class("demo.LineItem")
                .field("id", TypeRef::named("java.util.UUID"))
                .build(),
        )
        .with(
            TypeNodeBuilder::interface("demo.OrderRepository")
                .method("save", vec![TypeRef::named("demo.Order")], None)
                .method(
                    "findById",
                    vec![TypeRef::named("demo.OrderId")],
                    Some(TypeRef::optional(TypeRef::named("demo.Order"))),
                )
                .build(),
        )
        .build()
        .unwrap();
    analyze(&model, &AnalysisConfig::default()).unwrap()
}

#[test]
fn full_report_renders_byte_for_byte() {
    let report = shop();

    let expected = indoc! {"
        {EQ}
        ARCHMAP CLASSIFICATION REPORT
        {EQ}

        CLASSIFICATION SUMMARY
        {DASH}
        CLASSIFIED:              3 ( 75.0%)
        RELIABLE:                2 ( 50.0%)
        NEEDING REVIEW:          1 ( 25.0%)
        UNCLASSIFIED:            1 ( 25.0%)
        TOTAL:                   4

        Status: PASSED

        CLASSIFICATIONS (4 types)
        {DASH}
          Order                                    AGGREGATE_ROOT       Type 'Order' is managed by repository 'OrderRepository' - classified as AGGREGATE_ROOT
          OrderId                                  IDENTIFIER           Type 'OrderId' is an ID wrapper (single field with Id naming)
          LineItem                                 ENTITY               Type 'LineItem' has identity and is composed by other types, classified as ENTITY
          OrderRepository                          UNCLASSIFIED         Type 'OrderRepository' could not be classified by any deterministic rule

        {EQ}
    "}
    .replace("{EQ}", &"=".repeat(80))
    .replace("{DASH}", &"-".repeat(80));

    assert_eq!(report.result.report(), expected);
}

#[test]
fn failed_report_lists_findings_and_blocking_count() {
    let model = SemanticModelBuilder::new()
        .with(
            TypeNodeBuilder::class("m.A")
                .field("id", TypeRef::named("java.util.UUID"))
                .field("b", TypeRef::named("m.B"))
                .build(),
        )
        .with(
            TypeNodeBuilder::class("m.B")
                .field("id", TypeRef::named("java.util.UUID"))
                .field("a", TypeRef::named("m.A"))
                .build(),
        )
        .build()
        .unwrap();
    let report = analyze(&model, &AnalysisConfig::default()).unwrap();

    let rendered = report.result.report();
    assert!(rendered.contains("Status: FAILED"));
    assert!(rendered.contains("ANOMALIES (1 findings)"));
    assert!(rendered.contains(
        "[CRITICAL] COMPOSITION_CYCLE: Composition cycle detected: A.b -> B.a."
    ));
    assert!(rendered.ends_with("1 blocking anomalies must be resolved before generation.\n"));
}

#[test]
fn analysis_report_round_trips_through_json() {
    let report = shop();
    let json = serde_json::to_string_pretty(&report).unwrap();
    let restored: AnalysisReport = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, report);
}
