// Logging tests
// The subscriber is process-global, so these only check initialization

use tsubame::logging::init_subscriber;

#[test]
fn test_can_initialize_tracing_subscriber() {
    let result = init_subscriber();
    assert!(
        result.is_ok(),
        "Tracing subscriber initialization should succeed, got error: {:?}",
        result.err()
    );

    // Second call is a no-op rather than an error
    let result2 = init_subscriber();
    assert!(result2.is_ok());

    tracing::info!(request_id = "test-request", status = 200, "logging after init");
}
