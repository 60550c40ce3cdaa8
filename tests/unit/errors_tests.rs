/*!
 * Tests for error types
 */

use segment_mapper::alignment::{DomainIndex, MarkerStatus, MarkerToken};
use segment_mapper::errors::{AlignmentError, AppError, RedistributionError};

/// Test that terminal states refuse further transitions
#[test]
fn test_transition_fromTerminalState_shouldFail() {
    let index = DomainIndex::new('c', 1);
    let err = MarkerStatus::Matched.transition(MarkerStatus::Merged, index).unwrap_err();
    assert_eq!(
        err,
        AlignmentError::InvalidTransition {
            domain_index: index,
            from: MarkerStatus::Matched,
            to: MarkerStatus::Merged,
        }
    );
    assert!(err.to_string().contains("c-1"));
    assert!(MarkerStatus::Gap.transition(MarkerStatus::Gap, index).is_err());
    assert_eq!(MarkerStatus::Gap.transition(MarkerStatus::Orphan, index), Ok(MarkerStatus::Orphan));
}

/// Test parsing failures for identifiers
#[test]
fn test_parse_withMalformedIdentifiers_shouldFail() {
    assert!(matches!("a0".parse::<DomainIndex>(), Err(AlignmentError::InvalidDomainIndex(_))));
    assert!(matches!("(A)".parse::<MarkerToken>(), Err(AlignmentError::InvalidMarkerToken(_))));
    assert_eq!("(q)".parse::<MarkerToken>(), Ok(MarkerToken('q')));
}

/// Test conversions into the application error
#[test]
fn test_appError_conversions_shouldWrapSources() {
    let alignment: AppError = AlignmentError::UnknownPosition(9).into();
    assert_eq!(alignment.to_string(), "Alignment error: No marker instance at position 9");

    let redistribution: AppError = RedistributionError::AllocationMismatch {
        target: DomainIndex::new('a', 0),
        allocated: 3,
        total: 4,
    }
    .into();
    assert!(redistribution.to_string().contains("allocated 3 of 4"));

    let json: AppError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
    assert!(matches!(json, AppError::Serialization(_)));

    let io: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(io, AppError::File(_)));
}
