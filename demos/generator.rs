//! Generator Example for settle
//!
//! Lazy sequences yield values one at a time. A `for` loop sees only yielded
//! values; the terminal return value shows up through `next()` alone.
//!
//! # Running This Example
//!
//! ```bash
//! cargo run --example generator
//! ```

use settle::sequence::{self, NextResult, Resume};

fn main() {
    let seq = sequence::scripted([1, 2], 3);
    println!("{seq:?}");

    // The return value 3 is not printed.
    for value in sequence::scripted([1, 2], 3) {
        println!("{value}");
    }

    // Yield it instead to see every value.
    for value in sequence::scripted([1, 2, 3], ()) {
        println!("{value}");
    }

    let mut manual = sequence::scripted([1, 2], 3);
    loop {
        let step = manual.next();
        let (value, done) = step.into_parts();
        println!("{{ value: {value:?}, done: {done} }}");
        if step == NextResult::Exhausted {
            break;
        }
    }

    let countdown = sequence::from_fn(3u32, |n: &mut u32| {
        if *n == 0 {
            return Resume::Complete("liftoff");
        }
        *n -= 1;
        Resume::Yield(*n + 1)
    });
    let counted: Vec<_> = countdown.collect();
    println!("countdown: {counted:?}");
}
