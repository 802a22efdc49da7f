use std::hint::black_box;

/// One step of synthetic work. An `Err` or a panic marks only this unit as failed.
pub trait WorkUnit: Send + Sync {
    fn run(&self, call_number: u64, unit: u32) -> Result<(), String>;
}

/// Burns a fixed number of arithmetic iterations.
#[derive(Debug, Clone, Copy)]
pub struct SpinWork {
    iterations: u64,
}

impl SpinWork {
    pub fn new(iterations: u64) -> Self {
        Self { iterations }
    }
}

impl Default for SpinWork {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl WorkUnit for SpinWork {
    fn run(&self, call_number: u64, unit: u32) -> Result<(), String> {
        let mut acc = call_number ^ u64::from(unit);
        for i in 0..self.iterations {
            acc = black_box(acc.wrapping_mul(6364136223846793005).wrapping_add(i));
        }
        black_box(acc);
        Ok(())
    }
}
