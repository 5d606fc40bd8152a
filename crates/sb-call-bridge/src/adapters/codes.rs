//! Correlation code generation.

use crate::domain::CorrelationCode;
use crate::ports::CodeGenerator;

/// Fixed-length random decimal codes from the thread-local RNG.
#[derive(Debug, Clone, Copy)]
pub struct RandomCodeGenerator {
    length: usize,
}

impl RandomCodeGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> CorrelationCode {
        CorrelationCode::random_numeric(&mut rand::thread_rng(), self.length)
    }
}
