use std::thread;
use std::time::Duration;

use tracing::warn;

use super::block_source::{BlockRef, BlockSource};
use crate::common::oracle_error::OracleError;

/// Retries `LedgerUnavailable` failures of the wrapped source
#[derive(Debug)]
pub struct RetryingSource<S> {
    inner: S,
    retries: usize,
    backoff: Duration,
}

impl<S: BlockSource> RetryingSource<S> {
    pub fn new(inner: S, retries: usize) -> Self {
        Self {
            inner,
            retries,
            backoff: Duration::ZERO,
        }
    }

    /// Delay before the n-th retry is `n * backoff`
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn with_retries<T>(
        &self,
        what: &str,
        mut op: impl FnMut() -> Result<T, OracleError>,
    ) -> Result<T, OracleError> {
        let mut attempt = 0;
        loop {
            match op() {
                Err(e) if e.is_ledger_err() && attempt < self.retries => {
                    attempt += 1;
                    warn!(
                        "{} from {} failed ({}), retry {}/{}",
                        what,
                        self.inner.name(),
                        e,
                        attempt,
                        self.retries
                    );
                    if !self.backoff.is_zero() {
                        thread::sleep(self.backoff * attempt as u32);
                    }
                }
                result => return result,
            }
        }
    }
}

impl<S: BlockSource> BlockSource for RetryingSource<S> {
    fn block_bytes(&self, block: &BlockRef) -> Result<Vec<u8>, OracleError> {
        self.with_retries(&format!("block {}", block.height), || {
            self.inner.block_bytes(block)
        })
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn prepare(&self, blocks: &[BlockRef]) -> Result<(), OracleError> {
        self.with_retries("prepare", || self.inner.prepare(blocks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::enums::Stage;
    use crate::common::oracle_error::ErrCode;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Flaky {
        failures: usize,
        calls: AtomicUsize,
        code: ErrCode,
    }

    impl BlockSource for Flaky {
        fn block_bytes(&self, _block: &BlockRef) -> Result<Vec<u8>, OracleError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(OracleError::new(Stage::Source, self.code, "flaky"))
            } else {
                Ok(vec![call as u8])
            }
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    fn flaky(failures: usize, code: ErrCode) -> Flaky {
        Flaky {
            failures,
            calls: AtomicUsize::new(0),
            code,
        }
    }

    #[test]
    fn test_recovers_within_budget() {
        let source = RetryingSource::new(flaky(2, ErrCode::LedgerUnavailable), 2);
        assert_eq!(source.block_bytes(&BlockRef::new(1, "aa", 0)).unwrap(), vec![2]);
        assert_eq!(source.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_gives_up_after_budget() {
        let source = RetryingSource::new(flaky(5, ErrCode::LedgerUnavailable), 2);
        let err = source.block_bytes(&BlockRef::new(1, "aa", 0)).unwrap_err();
        assert_eq!(err.errcode, ErrCode::LedgerUnavailable);
        assert_eq!(source.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_other_errors_not_retried() {
        let source = RetryingSource::new(flaky(1, ErrCode::DecodeError), 3);
        assert!(source.block_bytes(&BlockRef::new(1, "aa", 0)).is_err());
        assert_eq!(source.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backoff_grows_with_attempts() {
        let source = RetryingSource::new(flaky(2, ErrCode::LedgerUnavailable), 2)
            .with_backoff(Duration::from_millis(20));
        let started = std::time::Instant::now();
        assert!(source.block_bytes(&BlockRef::new(1, "aa", 0)).is_ok());
        assert!(started.elapsed() >= Duration::from_millis(60));
    }
}
