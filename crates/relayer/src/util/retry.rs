use core::time::Duration;

use tracing::debug;

pub use retry::delay::Fibonacci;
pub use retry::OperationResult as RetryResult;

use crate::util::shutdown::ShutdownSignal;

#[derive(Copy, Clone, Debug)]
pub struct Clamped<S> {
    pub strategy: S,
    pub max_delay: Duration,
    pub max_retries: usize,
}

impl<S> Clamped<S> {
    pub const fn new(strategy: S, max_delay: Duration, max_retries: usize) -> Self {
        Self {
            strategy,
            max_delay,
            max_retries,
        }
    }

    pub fn iter(self) -> impl Iterator<Item = Duration>
    where
        S: Iterator<Item = Duration>,
    {
        let Self {
            strategy,
            max_retries,
            max_delay,
        } = self;

        strategy
            .take(max_retries)
            .map(move |delay| delay.min(max_delay))
    }
}

/// Why [`retry_with_shutdown`] gave up.
#[derive(Debug)]
pub enum RetryError<E> {
    /// Every attempt failed with a retryable error, the last one is kept.
    Exhausted { tries: u64, error: E },
    /// An attempt failed with an error that is not worth retrying.
    Aborted { tries: u64, error: E },
    /// Shutdown was requested before the operation succeeded.
    Cancelled { tries: u64 },
}

/// Run `operation` until it succeeds, waiting between attempts according to
/// `delays`.
///
/// The operation runs once more than there are delays. Shutdown is checked
/// before every attempt, and interrupts the waits.
pub fn retry_with_shutdown<I, O, T, E>(
    delays: I,
    shutdown: &ShutdownSignal,
    mut operation: O,
) -> Result<T, RetryError<E>>
where
    I: IntoIterator<Item = Duration>,
    O: FnMut(u64) -> RetryResult<T, E>,
{
    let mut delays = delays.into_iter();
    let mut tries = 0;

    loop {
        if shutdown.is_shutdown() {
            return Err(RetryError::Cancelled { tries });
        }

        tries += 1;

        match operation(tries) {
            RetryResult::Ok(value) => return Ok(value),
            RetryResult::Err(error) => return Err(RetryError::Aborted { tries, error }),
            RetryResult::Retry(error) => match delays.next() {
                None => return Err(RetryError::Exhausted { tries, error }),
                Some(delay) => {
                    debug!("attempt {tries} failed, retrying in {}ms", delay.as_millis());

                    if shutdown.sleep(delay).is_err() {
                        return Err(RetryError::Cancelled { tries });
                    }
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    use crate::util::shutdown::ShutdownHandle;

    #[test]
    fn clamped_fibonacci() {
        let strategy = Clamped::new(
            Fibonacci::from(Duration::from_millis(100)),
            Duration::from_millis(400),
            6,
        );

        let delays = strategy.iter().collect::<Vec<_>>();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(300),
                Duration::from_millis(400),
                Duration::from_millis(400),
            ]
        );
    }

    #[test]
    fn succeeds_within_bound() {
        let delays = vec![Duration::ZERO; 3];

        let result: Result<u64, RetryError<&str>> =
            retry_with_shutdown(delays, &ShutdownSignal::never(), |attempt| {
                if attempt < 4 {
                    RetryResult::Retry("not yet")
                } else {
                    RetryResult::Ok(attempt)
                }
            });

        assert_eq!(result.unwrap(), 4);
    }

    #[test]
    fn exhausts_after_every_delay() {
        let delays = vec![Duration::ZERO; 2];
        let mut calls = 0;

        let result: Result<(), RetryError<&str>> =
            retry_with_shutdown(delays, &ShutdownSignal::never(), |_| {
                calls += 1;
                RetryResult::Retry("not yet")
            });

        assert!(matches!(
            result,
            Err(RetryError::Exhausted {
                tries: 3,
                error: "not yet"
            })
        ));
        assert_eq!(calls, 3);
    }

    #[test]
    fn aborts_on_fatal_error() {
        let result: Result<(), RetryError<&str>> =
            retry_with_shutdown(vec![Duration::ZERO; 5], &ShutdownSignal::never(), |_| {
                RetryResult::Err("fatal")
            });

        assert!(matches!(
            result,
            Err(RetryError::Aborted {
                tries: 1,
                error: "fatal"
            })
        ));
    }

    #[test]
    fn does_not_run_once_shut_down() {
        let (handle, signal) = ShutdownHandle::pair();
        handle.shutdown();

        let result: Result<(), RetryError<&str>> =
            retry_with_shutdown(vec![Duration::ZERO], &signal, |_| {
                panic!("operation must not run after shutdown")
            });

        assert!(matches!(result, Err(RetryError::Cancelled { tries: 0 })));
    }
}
