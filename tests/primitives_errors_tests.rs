#![cfg(feature = "dev")]

use airfuse::internals::primitives::errors::FusionError;

#[test]
fn test_fusion_error_display() {
    // EmptyInput
    let err = FusionError::EmptyInput;
    assert_eq!(format!("{}", err), "Input arrays are empty");

    // MismatchedInputs
    let err = FusionError::MismatchedInputs {
        what: "model",
        got: 3,
        expected: 4,
    };
    assert_eq!(
        format!("{}", err),
        "Length mismatch: model has 3 values, expected 4"
    );

    // InvalidNumericValue
    let err = FusionError::InvalidNumericValue("NaN detected".to_string());
    assert_eq!(format!("{}", err), "Invalid numeric value: NaN detected");

    // InsufficientData
    let err = FusionError::InsufficientData { got: 0, needed: 1 };
    assert_eq!(
        format!("{}", err),
        "Insufficient data: got 0 usable reference points, need at least 1"
    );

    // Geometry
    let err = FusionError::Geometry("all points collinear".to_string());
    assert_eq!(format!("{}", err), "Degenerate geometry: all points collinear");

    // InvalidPower
    let err = FusionError::InvalidPower(2.0);
    assert_eq!(format!("{}", err), "Invalid power: 2 (must be finite and negative)");

    // InvalidNeighborCount
    let err = FusionError::InvalidNeighborCount(0);
    assert_eq!(format!("{}", err), "Invalid neighbor count: 0 (must be at least 1)");

    // InvalidFloorDistance
    let err = FusionError::InvalidFloorDistance(-1.5);
    assert_eq!(
        format!("{}", err),
        "Invalid floor distance: -1.5 (must be finite and >= 0)"
    );

    // InvalidFallbackWeight
    let err = FusionError::InvalidFallbackWeight(1.5);
    assert_eq!(format!("{}", err), "Invalid fallback weight: 1.5 (must be in [0, 1])");

    // UnknownVariant
    let err = FusionError::UnknownVariant("kriging".to_string());
    assert_eq!(format!("{}", err), "Unknown fusion variant: kriging");

    // DuplicateVariant
    let err = FusionError::DuplicateVariant("aVNA".to_string());
    assert_eq!(format!("{}", err), "Fusion variant registered twice: aVNA");

    // DuplicateParameter
    let err = FusionError::DuplicateParameter { parameter: "tags" };
    assert_eq!(
        format!("{}", err),
        "Parameter [tags] was set multiple times. Each parameter should only be configured once."
    );

    // Configuration
    let err = FusionError::Configuration("tags must differ".to_string());
    assert_eq!(format!("{}", err), "Invalid configuration: tags must differ");

    // Toml
    let err = FusionError::Toml("expected `=`".to_string());
    assert_eq!(format!("{}", err), "Configuration file error: expected `=`");
}

#[test]
fn test_local_errors() {
    assert!(FusionError::InsufficientData { got: 0, needed: 1 }.is_local());
    assert!(FusionError::Geometry("collinear".into()).is_local());

    assert!(!FusionError::EmptyInput.is_local());
    assert!(!FusionError::InvalidPower(1.0).is_local());
    assert!(!FusionError::InvalidNumericValue("x".into()).is_local());
}

#[test]
fn test_error_is_std_error() {
    fn assert_error<E: std::error::Error + Send + Sync + 'static>(_: &E) {}
    assert_error(&FusionError::EmptyInput);
}
