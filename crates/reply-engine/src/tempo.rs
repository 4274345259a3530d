use std::time::Duration;

/// Sleep unless the pause is zero, so immediate policies never yield.
pub(crate) async fn settle(pause: Duration) {
    if !pause.is_zero() {
        tokio::time::sleep(pause).await;
    }
}
