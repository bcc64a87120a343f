use super::*;

fn p(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

#[test]
fn add_increments_count_and_assigns_distinct_ids() {
    let mut model = OverlayModel::new();
    let mut ids = Vec::new();
    for i in 0..16 {
        let before = model.len();
        let id = model.add_overlay(format!("t{i}"), p(i as f64, 0.0)).unwrap();
        assert_eq!(model.len(), before + 1);
        assert!(!ids.contains(&id));
        ids.push(id);
    }
}

#[test]
fn add_defaults_scale_and_color() {
    let mut model = OverlayModel::new();
    let id = model.add_overlay("HI", p(100.0, 100.0)).unwrap();
    let o = model.get(id).unwrap();
    assert_eq!(o.text(), "HI");
    assert_eq!(o.position(), p(100.0, 100.0));
    assert_eq!(o.scale(), 1.0);
    assert_eq!(o.pending_scale(), None);
    assert_eq!(o.color(), Rgba8::black());
}

#[test]
fn add_rejects_empty_text_and_non_finite_position() {
    let mut model = OverlayModel::new();
    assert!(matches!(
        model.add_overlay("", p(0.0, 0.0)),
        Err(CollageError::InvalidArgument(_))
    ));
    assert!(matches!(
        model.add_overlay("x", p(f64::NAN, 0.0)),
        Err(CollageError::InvalidArgument(_))
    ));
    assert!(model.is_empty());
}

#[test]
fn ids_are_not_reused_after_removal() {
    let mut model = OverlayModel::new();
    let a = model.add_overlay("a", p(0.0, 0.0)).unwrap();
    let removed = model.remove_overlay(a).unwrap();
    assert_eq!(removed.id(), a);
    let b = model.add_overlay("b", p(0.0, 0.0)).unwrap();
    assert_ne!(a, b);
    assert!(!model.contains(a));
}

#[test]
fn positions_outside_the_image_are_accepted() {
    let mut model = OverlayModel::new();
    let id = model.add_overlay("far", p(-5000.0, 1e7)).unwrap();
    model.update_position(id, p(1e9, -1e9)).unwrap();
    assert_eq!(model.get(id).unwrap().position(), p(1e9, -1e9));
}

#[test]
fn update_scale_rejects_non_positive_and_keeps_previous_value() {
    let mut model = OverlayModel::new();
    let id = model.add_overlay("x", p(0.0, 0.0)).unwrap();
    model.update_scale(id, 2.5).unwrap();
    for bad in [0.0, -0.0, -1.0, f64::NAN, f64::INFINITY] {
        assert!(
            matches!(
                model.update_scale(id, bad),
                Err(CollageError::InvalidArgument(_))
            ),
            "{bad}"
        );
        assert_eq!(model.get(id).unwrap().scale(), 2.5);
    }
}

#[test]
fn unknown_ids_report_not_found() {
    let mut model = OverlayModel::new();
    let ghost = OverlayId::from_u64(99);
    assert!(matches!(
        model.update_text(ghost, "x"),
        Err(CollageError::NotFound(id)) if id == ghost
    ));
    assert!(matches!(
        model.update_position(ghost, p(0.0, 0.0)),
        Err(CollageError::NotFound(_))
    ));
    assert!(matches!(
        model.update_scale(ghost, 1.0),
        Err(CollageError::NotFound(_))
    ));
    assert!(matches!(
        model.remove_overlay(ghost),
        Err(CollageError::NotFound(_))
    ));
    assert!(matches!(model.get(ghost), Err(CollageError::NotFound(_))));
}

#[test]
fn update_text_keeps_identity_and_rejects_empty() {
    let mut model = OverlayModel::new();
    let id = model.add_overlay("before", p(1.0, 2.0)).unwrap();
    model.update_text(id, "after").unwrap();
    assert_eq!(model.get(id).unwrap().text(), "after");
    assert!(matches!(
        model.update_text(id, ""),
        Err(CollageError::InvalidArgument(_))
    ));
    assert_eq!(model.get(id).unwrap().text(), "after");
}

#[test]
fn position_and_scale_are_independent_last_write_wins() {
    let mut model = OverlayModel::new();
    let id = model.add_overlay("x", p(0.0, 0.0)).unwrap();
    model.update_position(id, p(10.0, 10.0)).unwrap();
    model.update_scale(id, 3.0).unwrap();
    model.update_position(id, p(20.0, 30.0)).unwrap();
    let o = model.get(id).unwrap();
    assert_eq!(o.position(), p(20.0, 30.0));
    assert_eq!(o.scale(), 3.0);
}

#[test]
fn pinch_lifecycle_commits_and_cancels() {
    let mut model = OverlayModel::new();
    let id = model.add_overlay("x", p(0.0, 0.0)).unwrap();

    model.update_pending_scale(id, 1.5).unwrap();
    assert_eq!(model.get(id).unwrap().scale(), 1.0);
    assert_eq!(model.get(id).unwrap().effective_scale(), 1.5);

    model.update_pending_scale(id, 1.8).unwrap();
    assert_eq!(model.commit_pending_scale(id).unwrap(), 1.8);
    assert_eq!(model.get(id).unwrap().scale(), 1.8);
    assert_eq!(model.get(id).unwrap().pending_scale(), None);

    model.update_pending_scale(id, 4.0).unwrap();
    model.cancel_pending_scale(id).unwrap();
    assert_eq!(model.get(id).unwrap().effective_scale(), 1.8);

    // Nothing pending: commit is a no-op.
    assert_eq!(model.commit_pending_scale(id).unwrap(), 1.8);
}

#[test]
fn pending_scale_is_validated() {
    let mut model = OverlayModel::new();
    let id = model.add_overlay("x", p(0.0, 0.0)).unwrap();
    assert!(model.update_pending_scale(id, 0.0).is_err());
    assert_eq!(model.get(id).unwrap().pending_scale(), None);
}

#[test]
fn pinches_on_two_overlays_do_not_interfere() {
    let mut model = OverlayModel::new();
    let a = model.add_overlay("a", p(0.0, 0.0)).unwrap();
    let b = model.add_overlay("b", p(0.0, 0.0)).unwrap();
    model.update_pending_scale(a, 2.0).unwrap();
    model.update_pending_scale(b, 3.0).unwrap();
    model.commit_pending_scale(b).unwrap();
    assert_eq!(model.get(a).unwrap().effective_scale(), 2.0);
    assert_eq!(model.get(a).unwrap().scale(), 1.0);
    assert_eq!(model.get(b).unwrap().scale(), 3.0);
}

#[test]
fn snapshot_is_isolated_and_drops_pending_scale() {
    let mut model = OverlayModel::new();
    let a = model.add_overlay("a", p(1.0, 1.0)).unwrap();
    model.update_pending_scale(a, 5.0).unwrap();

    let snap = model.snapshot();
    model.update_text(a, "changed").unwrap();
    model.add_overlay("b", p(2.0, 2.0)).unwrap();

    assert_eq!(snap.len(), 1);
    assert_eq!(snap.overlays()[0].text(), "a");
    assert_eq!(snap.overlays()[0].scale(), 1.0);
    assert_eq!(snap.overlays()[0].pending_scale(), None);
}

#[test]
fn iteration_follows_insertion_order() {
    let mut model = OverlayModel::new();
    let ids: Vec<_> = ["a", "b", "c"]
        .into_iter()
        .map(|t| model.add_overlay(t, p(0.0, 0.0)).unwrap())
        .collect();
    model.remove_overlay(ids[1]).unwrap();
    let texts: Vec<_> = model.iter().map(|o| o.text().to_string()).collect();
    assert_eq!(texts, ["a", "c"]);
}
