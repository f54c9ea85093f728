use augur_core::error::UpstreamError;
use augur_core::{AugurError, Retrier, RetryPolicy, classify};
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Show the retry layer's own log lines
    tracing_subscriber::fmt().with_env_filter("augur_core=info").init();

    println!("=== Retry Policy Examples ===\n");

    // Example 1: the default policy
    let policy = RetryPolicy::default();
    println!("1. Default policy:");
    println!("   Max attempts: {}", policy.max_attempts);
    println!("   Initial delay: {:?}", policy.initial_delay());
    println!("   Hint buffer: {:?}\n", policy.hint_buffer());

    // Example 2: how errors are classified
    let rate_limited = AugurError::Upstream(
        UpstreamError::new("RESOURCE_EXHAUSTED", "Quota exceeded").with_detail(json!({
            "@type": "type.googleapis.com/google.rpc.RetryInfo",
            "retryDelay": "28s"
        })),
    );
    let classification = classify(&rate_limited);
    println!("2. Classification:");
    println!("   {:?}", classification);
    println!(
        "   Delay before retry: {:?}\n",
        policy.delay_for(1, &classification)
    );

    // Example 3: a flaky operation that recovers on the third attempt
    let retrier = Retrier::new(RetryPolicy::new(4, Duration::from_millis(100)));
    let attempts = AtomicU32::new(0);
    let value = retrier
        .run(|| async {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt < 3 {
                Err(AugurError::upstream("UNAVAILABLE", "The model is overloaded"))
            } else {
                Ok(attempt)
            }
        })
        .await?;

    println!("3. Flaky operation:");
    println!("   Succeeded on attempt {value}\n");

    println!("=== How retries are decided ===");
    println!("RESOURCE_EXHAUSTED -> wait the server's RetryInfo delay plus a buffer,");
    println!("                      or back off exponentially when there is none");
    println!("UNAVAILABLE        -> back off exponentially");
    println!("unreachable proxy  -> stop, report the model as overloaded");
    println!("anything else      -> stop, return the error unchanged");

    Ok(())
}
