mod common;

use common::{Echo, LedgerError, Orphan, Transfer, TransferHandler};
use emissary::{
    CancellationToken, Mediator, MediatorError, RegistryBuilder,
    behaviors::LoggingBehavior,
    testing::{
        CallLog, FailingHandler, NullBehavior, NullHandler, RecordingBehavior, StaticHandler,
        TestFailure, WrappingBehavior,
    },
};

#[tokio::test]
async fn test_unregistered_request_runs_no_behavior() {
    let log = CallLog::new();
    let registry = RegistryBuilder::new()
        .register_open_behavior(RecordingBehavior::new("outer", log.clone()))
        .register_handler::<Echo>(StaticHandler::new("x".to_string()))
        .build();

    let err = Mediator::new(registry)
        .send(Orphan, CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_handler_not_found());
    assert!(err.to_string().contains("Orphan"));
    assert!(log.is_empty());
}

#[tokio::test]
async fn test_handler_without_response_is_null_result() {
    let registry = RegistryBuilder::new()
        .register_handler::<Echo>(NullHandler)
        .build();

    let err = Mediator::new(registry)
        .send(Echo::new("x"), CancellationToken::new())
        .await
        .unwrap_err();
    assert!(err.is_null_result());
}

#[tokio::test]
async fn test_behavior_without_response_is_null_result_at_any_position() {
    for position in 0..3 {
        let mut builder = RegistryBuilder::new();
        for slot in 0..3 {
            if slot == position {
                builder.register_behavior_mut::<Echo>(NullBehavior);
            } else {
                builder.register_behavior_mut::<Echo>(WrappingBehavior::new("w"));
            }
        }
        builder.register_handler_mut::<Echo>(StaticHandler::new("x".to_string()));

        let err = Mediator::new(builder.build())
            .send(Echo::new("x"), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_null_result(), "position {position}: {err:?}");
    }
}

#[tokio::test]
async fn test_domain_error_survives_behaviors_unchanged() {
    let log = CallLog::new();
    let registry = RegistryBuilder::new()
        .register_open_behavior(LoggingBehavior::new())
        .register_open_behavior(RecordingBehavior::new("audit", log.clone()))
        .register_handler::<Transfer>(TransferHandler)
        .build();

    let err = Mediator::new(registry)
        .send(
            Transfer {
                amount: 50,
                balance: 20,
            },
            CancellationToken::new(),
        )
        .await
        .unwrap_err();

    let expected = LedgerError::InsufficientFunds {
        wanted: 50,
        available: 20,
    };
    assert_eq!(err.downcast_ref::<LedgerError>(), Some(&expected));
    assert_eq!(err.to_string(), expected.to_string());
    assert_eq!(log.entries(), ["enter audit", "exit audit"]);
}

#[tokio::test]
async fn test_handler_failure_can_be_taken_out() {
    let registry = RegistryBuilder::new()
        .register_handler::<Echo>(FailingHandler::new("disk full"))
        .build();

    let err = Mediator::new(registry)
        .send(Echo::new("x"), CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, MediatorError::Handler(_)));

    let failure = err.into_handler_failure().unwrap();
    let failure = failure.downcast::<TestFailure>().unwrap();
    assert_eq!(*failure, TestFailure("disk full".to_string()));
}

#[tokio::test]
async fn test_successful_transfer_is_not_an_error() {
    let registry = RegistryBuilder::new()
        .register_handler::<Transfer>(TransferHandler)
        .build();

    let remaining = Mediator::new(registry)
        .send(
            Transfer {
                amount: 5,
                balance: 20,
            },
            CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(remaining, 15);
}
