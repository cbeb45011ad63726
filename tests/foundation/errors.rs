//! Integration tests for Error types
//!
//! Tests error construction, display, context, and semantic limits.

use cascade_foundation::{Error, ErrorContext, ErrorKind, LinePrefixHint, Message, SemanticLimit};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn limit_errors_are_recognized() {
    let err = Error::limit_exceeded(SemanticLimit::CommandCost { limit: 100 });
    assert!(err.is_limit());
    assert_eq!(err.to_string(), "command limit (100) reached");

    let err = Error::limit_exceeded(SemanticLimit::QueueOverflow { limit: 7 });
    assert!(err.is_limit());
    assert_eq!(err.to_string(), "command queue limit (7) reached");
}

#[test]
fn semantic_limit_reports_its_ceiling() {
    assert_eq!(SemanticLimit::CommandCost { limit: 3 }.limit(), 3);
    assert_eq!(SemanticLimit::QueueOverflow { limit: 9 }.limit(), 9);
}

#[test]
fn instantiation_errors_render_their_message() {
    let err = Error::instantiation(Message::literal("bad macro"));
    assert!(matches!(err.kind, ErrorKind::Instantiation(_)));
    assert!(!err.is_limit());
    assert_eq!(err.to_string(), "bad macro");
}

#[test]
fn internal_errors() {
    let err = Error::internal("oops");
    assert!(matches!(err.kind, ErrorKind::Internal(_)));
    assert_eq!(err.to_string(), "internal error: oops");
}

// =============================================================================
// Compilation Errors
// =============================================================================

#[test]
fn line_prefix_hints() {
    let err = Error::new(ErrorKind::InvalidLinePrefix {
        command: "//".into(),
        line: 3,
        hint: LinePrefixHint::Comment,
    });
    let msg = err.to_string();
    assert!(msg.contains("line 3"));
    assert!(msg.contains("use '#' not '//'"));

    let hint = LinePrefixHint::LeadingSlash("say".into());
    assert!(hint.to_string().contains("did you mean 'say'?"));
}

#[test]
fn continuation_at_end_names_the_line() {
    let err = Error::new(ErrorKind::LineContinuationAtEnd { line: 12 });
    assert_eq!(err.to_string(), "line continuation at end of file (line 12)");
}

// =============================================================================
// Error Context
// =============================================================================

#[test]
fn context_is_attached_and_displayed() {
    let context = ErrorContext::new()
        .with_source("demo:broken")
        .with_line(4)
        .with_frame("demo:outer");
    let err = Error::internal("x").with_context(context);

    let context = err.context.as_ref().unwrap();
    assert_eq!(context.source.as_deref(), Some("demo:broken"));
    assert_eq!(context.line, Some(4));
    assert_eq!(context.stack, ["demo:outer"]);

    let rendered = context.to_string();
    assert!(rendered.starts_with("in demo:broken:4"));
    assert!(rendered.contains("from demo:outer"));
}

#[test]
fn empty_context_displays_nothing() {
    assert_eq!(ErrorContext::new().to_string(), "");
}
