use crate::prelude::StageError;

/// Scoped buffer pool that bounds how many buffers are in flight at once.
pub struct BufferPool<T> {
    buffers: Vec<Vec<T>>,
    outstanding: usize,
    max_capacity: usize,
}

impl<T: Clone + Default> BufferPool<T> {
    pub fn with_capacity(max_capacity: usize) -> Self {
        Self {
            buffers: Vec::with_capacity(max_capacity),
            outstanding: 0,
            max_capacity,
        }
    }

    /// Hands out a buffer of `length` default values, reusing a released one
    /// when available.
    pub fn checkout(&mut self, length: usize) -> Result<Vec<T>, StageError> {
        if self.outstanding >= self.max_capacity {
            return Err(StageError::BufferExhaustion(format!(
                "all {} beam buffers are checked out",
                self.max_capacity
            )));
        }
        let mut buffer = self.buffers.pop().unwrap_or_default();
        buffer.clear();
        buffer.resize(length, T::default());
        self.outstanding += 1;
        Ok(buffer)
    }

    /// Returns a buffer back to the pool for reuse.
    pub fn release(&mut self, mut buffer: Vec<T>) {
        buffer.clear();
        self.outstanding = self.outstanding.saturating_sub(1);
        if self.buffers.len() < self.max_capacity {
            self.buffers.push(buffer);
        }
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    pub fn reset(&mut self) {
        self.buffers.clear();
        self.outstanding = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_pool_refuses_checkout() {
        let mut pool: BufferPool<f64> = BufferPool::with_capacity(2);
        let first = pool.checkout(4).unwrap();
        let _second = pool.checkout(4).unwrap();
        assert!(matches!(
            pool.checkout(4),
            Err(StageError::BufferExhaustion(_))
        ));

        pool.release(first);
        let reused = pool.checkout(3).unwrap();
        assert_eq!(reused, vec![0.0; 3]);
        assert_eq!(pool.outstanding(), 2);

        pool.reset();
        assert_eq!(pool.outstanding(), 0);
    }
}
