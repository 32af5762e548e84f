mod common;

use common::*;
use sheetflow::{
    BlockId, DocumentSpace, LayoutMaster, Marker, MarkerIndicatorRegion, MarkerPosition, Row, RowGroup,
    VerticalAlignment, VerticalSpacing,
};

#[test]
fn test_groups_of_three_and_four_rows_on_five_row_pages() -> TestResult {
    init_logger();
    let document = paginate(config(5.0), &[sequence(vec![group("a", 3), group("b", 4)])])?;

    assert_eq!(
        page_chars(&document),
        vec![vec!["a0", "a1", "a2"], vec!["b0", "b1", "b2", "b3"]]
    );
    assert_eq!(document.references.page_number(&BlockId::new("a")), Some(1));
    assert_eq!(document.references.page_number(&BlockId::new("b")), Some(2));
    assert_eq!(document.restarts, 0);
    assert_eq!(document.iterations, 1);
    Ok(())
}

#[test]
fn test_no_page_exceeds_its_flow_height() -> TestResult {
    init_logger();
    let mut groups = Vec::new();
    for i in 0..120usize {
        let spacing = [1.0, 1.0, 2.0, 1.5][i % 4];
        let mut builder = RowGroup::builder()
            .identifier(format!("g{i}"))
            .rows((0..1 + (i * 7) % 5).map(|r| Row::new(format!("g{i}.{r}")).with_spacing(spacing)))
            .breakable(i % 6 != 0);
        if i % 11 == 0 {
            builder = builder.keep_with_next_sheets(1);
        }
        groups.push(builder.build());
        if i % 13 == 0 {
            groups.push(RowGroup::builder().row(Row::empty()).collapsible(true).skippable(true).build());
        }
    }

    let document = paginate(config(9.0), &[sequence(groups)])?;
    let pages = all_pages(&document);
    assert!(pages.len() > 10);
    for page in pages {
        assert!(
            page.space_used() <= page.flow_height() + 0.01,
            "page {} uses {} of {}",
            page.page_number(),
            page.space_used(),
            page.flow_height()
        );
    }
    Ok(())
}

#[test]
fn test_duplex_sheets_hold_two_pages() -> TestResult {
    let document = paginate(config(1.0), &[sequence(single_rows(7))])?;
    let sizes: Vec<_> = document.volumes[0].sheets().iter().map(|s| s.pages().len()).collect();
    assert_eq!(sizes, vec![2, 2, 2, 1]);
    assert_eq!(document.page_count(), 7);
    Ok(())
}

#[test]
fn test_simplex_master_has_one_page_per_sheet() -> TestResult {
    let config = config(1.0).with_master("default", LayoutMaster::new(1.0, 28).simplex());
    let document = paginate(config, &[sequence(single_rows(3))])?;
    assert_eq!(document.sheet_count(), 3);
    Ok(())
}

#[test]
fn test_ordinals_and_page_numbers_are_contiguous_across_sequences() -> TestResult {
    let sequences = [
        sequence(single_rows(3)),
        sequence(single_rows(2)),
        sequence(single_rows(1)),
    ];
    let document = paginate(config(1.0), &sequences)?;

    let sheets = document.volumes[0].sheets();
    let ordinals: Vec<_> = sheets.iter().map(|s| s.identity().ordinal).collect();
    assert_eq!(ordinals, vec![0, 1, 2, 3]);

    let pages = all_pages(&document);
    let numbers: Vec<_> = pages.iter().map(|p| p.page_number()).collect();
    let page_ordinals: Vec<_> = pages.iter().map(|p| p.ordinal()).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(page_ordinals, vec![0, 1, 2, 3, 4, 5]);

    let scope = document.references.sequence_scope(DocumentSpace::Body, 1).ok_or("missing scope")?;
    assert_eq!((scope.from, scope.to), (4, 5));
    Ok(())
}

#[test]
fn test_leading_skippable_group_is_dropped_but_registered() -> TestResult {
    let blank = RowGroup::builder()
        .identifier("gap")
        .row(Row::empty())
        .skippable(true)
        .marker(Marker::new("volume-title", "II"))
        .build();
    let document = paginate(config(3.0), &[sequence(vec![group("a", 3), blank, group("b", 1)])])?;

    assert_eq!(page_chars(&document)[1], vec!["b0"]);
    assert_eq!(document.references.page_number(&BlockId::new("gap")), Some(2));
    let marker = document
        .references
        .find_marker(DocumentSpace::Body, 1, "volume-title", MarkerPosition::First);
    assert_eq!(marker.map(|m| m.value.as_str()), Some("II"));
    Ok(())
}

#[test]
fn test_skippable_groups_before_first_content_are_registered() -> TestResult {
    let blank = |id: &str| RowGroup::builder().identifier(id).row(Row::empty()).skippable(true).build();
    let document = paginate(
        config(5.0),
        &[sequence(vec![blank("s1"), blank("s2"), group("c", 2)])],
    )?;

    assert_eq!(page_chars(&document), vec![vec!["c0", "c1"]]);
    assert_eq!(document.references.page_number(&BlockId::new("s1")), Some(1));
    assert_eq!(document.references.page_number(&BlockId::new("s2")), Some(1));
    assert_eq!(document.references.page_number(&BlockId::new("c")), Some(1));
    Ok(())
}

#[test]
fn test_trailing_margins_never_overfill_a_page() -> TestResult {
    let margin = || {
        RowGroup::builder()
            .rows((0..2).map(|_| Row::empty()))
            .collapsible(true)
            .build()
    };
    let chapter = RowGroup::builder().row(Row::new("chapter").forcing_new_page()).build();
    let sequences = [
        sequence(vec![group("a", 4), margin()]),
        sequence(vec![group("b", 4), margin(), chapter]),
        sequence(vec![group("c", 4), margin(), group("d", 3)]),
    ];
    let document = paginate(config(5.0), &sequences)?;

    for page in all_pages(&document) {
        assert!(page.space_used() <= page.flow_height() + 0.01, "page {} overflows", page.page_number());
    }
    assert_eq!(
        page_chars(&document),
        vec![
            vec!["a0", "a1", "a2", "a3"],
            vec!["b0", "b1", "b2", "b3"],
            vec!["chapter"],
            vec!["c0", "c1", "c2", "c3"],
            vec!["d0", "d1", "d2"],
        ]
    );
    Ok(())
}

#[test]
fn test_keep_with_next_sheet_is_not_breakable() -> TestResult {
    init_logger();
    let mut groups = single_rows(6);
    groups[1] = RowGroup::builder()
        .identifier("heading")
        .row(Row::new("heading"))
        .keep_with_next_sheets(1)
        .build();
    let document = paginate(config(1.0), &[sequence(groups)])?;

    let sheets = document.volumes[0].sheets();
    assert!(!sheets[0].breakable());
    assert_eq!(sheets[0].avoid_volume_break_after(), Some(1));
    assert!(!document.references.get_breakable(sheets[0].identity()));
    assert!(document.references.get_breakable(sheets[1].identity()));
    Ok(())
}

#[test]
fn test_keep_with_previous_takes_a_second_pass() -> TestResult {
    init_logger();
    let mut groups = single_rows(8);
    groups[4] = RowGroup::builder()
        .row(Row::new("continued"))
        .keep_with_previous_sheets(1)
        .build();
    let document = paginate(config(1.0), &[sequence(groups)])?;

    assert_eq!(document.iterations, 2);
    assert!(!document.references.is_dirty());
    let sheets = document.volumes[0].sheets();
    assert!(!sheets[1].breakable());
    Ok(())
}

#[test]
fn test_spacer_and_forced_page_break() -> TestResult {
    let spacer = RowGroup::spacer(VerticalSpacing::new(4.0, VerticalAlignment::After));
    let chapter = RowGroup::builder().row(Row::new("chapter").forcing_new_page()).build();
    let document = paginate(config(8.0), &[sequence(vec![group("a", 1), spacer, group("b", 1), chapter])])?;

    assert_eq!(
        page_chars(&document),
        vec![vec!["a0", "", "", "", "b0"], vec!["chapter"]]
    );
    Ok(())
}

#[test]
fn test_margin_regions_are_resolved() -> TestResult {
    let region = MarkerIndicatorRegion::new(2).with_indicator("changed", "|");
    let master = LayoutMaster::new(4.0, 28).with_right_region(region);
    let changed = RowGroup::builder()
        .row(Row::new("edited").with_marker(Marker::new("changed", "")).adjusted_for_margin_region())
        .row(Row::new("plain").adjusted_for_margin_region())
        .build();
    let document = paginate(config(4.0).with_master("default", master), &[sequence(vec![changed])])?;

    let pages = all_pages(&document);
    let margins: Vec<_> = pages[0].rows().iter().map(|r| r.right_margin.text.as_str()).collect();
    assert_eq!(margins, vec!["| ", "  "]);
    Ok(())
}

#[test]
fn test_empty_document_has_one_empty_page() -> TestResult {
    let document = paginate(config(5.0), &[sequence(vec![])])?;
    assert_eq!(document.page_count(), 1);
    assert!(all_pages(&document)[0].is_empty());
    Ok(())
}

#[test]
fn test_oversized_group_fails_with_location() {
    let result = paginate(config(3.0), &[sequence(vec![group("big", 4)])]);
    match result {
        Err(sheetflow::PipelineError::Layout(sheetflow::LayoutError::UnitTooLarge { identifier, page, .. })) => {
            assert_eq!(identifier, "big");
            assert_eq!(page, 1);
        }
        other => panic!("expected UnitTooLarge, got {other:?}"),
    }
}
