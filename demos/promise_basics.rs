//! Promise Basics Example for settle
//!
//! Walks through the life of a promise on a virtual-time event loop:
//!
//! 1. An executor that settles twice (only the first call counts)
//! 2. Rejections flowing to `subscribe`, `catch` and `finally`
//! 3. `finally` forwarding the original value to the next step
//! 4. A chain that recovers from failure
//!
//! Time is virtual, so the "one second" and "two second" timers below finish
//! instantly and always in the same order.
//!
//! # Running This Example
//!
//! ```bash
//! cargo run --example promise_basics
//! ```

use settle::{EventLoop, Promise, Result, Step};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let lp = EventLoop::from_env()?;
    let h = lp.handle();

    // The timer's resolve(2) is ignored: the promise already holds 1.
    let timers = h.clone();
    let promise = Promise::<i32, String>::new(&h, move |r| {
        r.resolve(1);
        timers.set_timeout(1000, move || {
            r.resolve(2);
        });
        Ok(())
    });
    let _ = promise.map(|v| println!("[{v}] only the fulfilled case"));
    let _ = promise.subscribe(
        |v| {
            println!("[{v}] result");
            Step::Value(())
        },
        |e| {
            println!("never printed: {e}");
            Step::Value(())
        },
    );

    let failing = Promise::<(), String>::rejected_after(&h, 1000, "error occurred!".into());
    let _ = failing.subscribe(
        |()| Step::Value(()),
        |e| {
            println!("subscribe saw: {e}");
            Step::Value(())
        },
    );
    let _ = failing.catch(|e| {
        println!("catch saw: {e}");
        Step::Value(())
    });
    let _ = failing
        .finally(|| println!("the promise is ready (rejected)"))
        .catch(|e| {
            println!("after finally: {e}");
            Step::Value(())
        });

    let _ = Promise::<&str, String>::delay(&h, 2000, "result")
        .finally(|| println!("the promise is ready"))
        .map(|v| println!("finally forwarded: {v}"));

    // Flip the coin both ways so each branch shows up in the output.
    for (flip, coin) in [true, false].into_iter().enumerate() {
        let _ = Promise::<&str, &str>::new(&h, move |r| {
            if coin {
                r.resolve("hit!");
            } else {
                r.reject("miss!");
            }
            Ok(())
        })
        .map(|v| println!("{v}"))
        .catch(|e| {
            println!("{e}");
            Step::Value(())
        })
        .finally(move || println!("done with flip {flip}"));
    }

    let report = lp.run()?;
    println!(
        "loop idle at t={}ms after {} steps ({} unhandled rejections)",
        report.final_tick,
        report.stats.steps,
        report.unhandled_rejections.len()
    );
    Ok(())
}
