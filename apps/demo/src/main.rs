//! Walks two stacks of different element types through one 4096-byte arena.
//!
//! Set `RUST_LOG=fixmem_arena=trace,fixmem_stack=debug` to watch every
//! block leave and return to the free list.

use std::fmt;

use anyhow::Context;
use fixmem_arena::FixedArena;
use fixmem_stack::Stack;
use tracing_subscriber::{EnvFilter, fmt as log_fmt, layer::SubscriberExt, util::SubscriberInitExt};

const ARENA_BYTES: usize = 4096;

#[derive(Debug, Clone, PartialEq)]
struct Point {
    x: i32,
    y: i32,
    z: f64,
    name: String,
}

impl Point {
    fn new(x: i32, y: i32, z: f64, name: &str) -> Self {
        Self {
            x,
            y,
            z,
            name: name.to_owned(),
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point({}, {}, {}, {:?})", self.x, self.y, self.z, self.name)
    }
}

fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .context("invalid log filter")?;

    tracing_subscriber::registry()
        .with(filter)
        .with(log_fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("failed to install tracing subscriber")?;
    Ok(())
}

fn int_demo(arena: &FixedArena) -> anyhow::Result<()> {
    println!("=== int stack ===");
    let mut stack = Stack::new(arena)?;

    for i in 1..=5 {
        stack.push(i * 10)?;
    }

    println!("Size: {}", stack.len());
    println!("Top: {}", stack.top()?);

    let items: Vec<String> = stack.iter().map(ToString::to_string).collect();
    println!("Elements: {}", items.join(" "));

    stack.pop()?;
    stack.pop()?;
    println!("Top after two pops: {}", stack.top()?);
    Ok(())
}

fn point_demo(arena: &FixedArena) -> anyhow::Result<()> {
    println!("\n=== Point stack ===");
    let mut stack = Stack::new(arena)?;

    stack.push(Point::new(1, 2, 3.5, "A"))?;
    stack.push(Point::new(4, 5, 6.0, "B"))?;
    stack.push(Point::new(7, 8, 9.1, "C"))?;

    println!("Size: {}", stack.len());
    println!("Top: {}", stack.top()?);

    println!("All elements:");
    for point in &stack {
        println!("  {point}");
    }

    stack.pop()?;
    stack.push(Point::new(0, 0, 0.0, "REUSED"))?;
    println!("After replacing the top:");
    for point in &stack {
        println!("  {point}");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_logging()?;

    let arena = FixedArena::new(ARENA_BYTES).context("failed to reserve arena buffer")?;
    tracing::info!(capacity = arena.capacity(), "arena ready");

    int_demo(&arena).context("int stack demo failed")?;
    point_demo(&arena).context("Point stack demo failed")?;

    println!(
        "\n=== Storage returned: {} of {} bytes free ===",
        arena.free_bytes(),
        arena.capacity()
    );
    Ok(())
}
