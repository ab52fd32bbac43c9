//! Combinators Example for settle
//!
//! Runs `all`, `all_settled`, `race`, `any` and `timeout` over timer-backed
//! promises and prints what each one settles with.
//!
//! # Running This Example
//!
//! ```bash
//! cargo run --example combinators
//! ```

use settle::combinator::{all, all_settled, any, race, timeout};
use settle::{EventLoop, Handle, Promise, Result, Step};

fn members(h: &Handle) -> Vec<Promise<u32, String>> {
    vec![
        Promise::delay(h, 1000, 1),
        Promise::delay(h, 2000, 2),
        Promise::rejected_after(h, 3000, "error".into()),
    ]
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let lp = EventLoop::from_env()?;
    let h = lp.handle();

    let _ = all(&h, members(&h)).subscribe(
        |values| {
            println!("all result: {values:?}");
            Step::Value(())
        },
        |e| {
            println!("all error: {e}");
            Step::Value(())
        },
    );

    let settled = all_settled(&h, members(&h)).map(|records| {
        let json = serde_json::to_string(&records).unwrap_or_default();
        println!("all_settled: {json}");
    });

    let _ = race(&h, members(&h)).map(|winner| println!("race winner: {winner}"));

    let _ = any(
        &h,
        [
            Promise::<u32, String>::rejected_after(&h, 10, "down".into()),
            Promise::delay(&h, 20, 7),
        ],
    )
    .map(|v| println!("any: {v}"));

    let slow = Promise::<u32, String>::delay(&h, 5000, 0);
    let _ = timeout(&h, &slow, 500, "gave up after 500ms".into()).catch(|e| {
        println!("timeout: {e}");
        Step::Value(0)
    });

    lp.block_on(&settled)?;
    println!("all_settled done at t={}ms", lp.now());

    let report = lp.run()?;
    println!("idle at t={}ms", report.final_tick);
    Ok(())
}
