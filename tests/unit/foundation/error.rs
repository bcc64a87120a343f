use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        CollageError::invalid_argument("x")
            .to_string()
            .contains("invalid argument:")
    );
    assert!(
        CollageError::invalid_state("x")
            .to_string()
            .contains("invalid state:")
    );
    assert!(
        CollageError::export_failed("disk full")
            .to_string()
            .contains("export failed: disk full")
    );
    assert!(
        CollageError::NotFound(OverlayId::from_u64(7))
            .to_string()
            .contains("overlay not found:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CollageError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn programming_errors_are_classified() {
    assert!(CollageError::invalid_argument("x").is_programming_error());
    assert!(CollageError::NotFound(OverlayId::from_u64(1)).is_programming_error());
    assert!(CollageError::invalid_state("x").is_programming_error());
    assert!(!CollageError::export_failed("x").is_programming_error());
    assert!(!CollageError::Cancelled.is_programming_error());
}
