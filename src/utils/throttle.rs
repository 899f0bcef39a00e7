use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{ready, Context, Poll};
use std::time::Duration;

use tokio::io::{AsyncRead, ReadBuf};
use tokio::time::{Instant, Sleep};

use crate::config::Bandwidth;
use crate::constants::{THROTTLE_MAX_BURST, THROTTLE_MIN_BURST};

// Float slack so a refill that lands a hair short of the target does not
// schedule a second, sub-millisecond sleep.
const TOKEN_EPSILON: f64 = 1e-6;

/// Token bucket metering bytes against a fixed rate.
///
/// The bucket starts empty, so the first byte is only granted once budget has
/// accrued. Burst capacity is a tenth of a second of rate, clamped to
/// `[THROTTLE_MIN_BURST, THROTTLE_MAX_BURST]`.
#[derive(Debug)]
pub struct TokenBucket {
    rate: f64,
    capacity: f64,
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    pub fn new(bandwidth: Bandwidth) -> Self {
        let rate = bandwidth.bytes_per_sec();
        let capacity = (rate / 10).clamp(THROTTLE_MIN_BURST, THROTTLE_MAX_BURST);
        TokenBucket {
            rate: rate as f64,
            capacity: capacity as f64,
            tokens: 0.0,
            last_refill: Instant::now(),
        }
    }

    /// Largest grant a single `try_take` can return.
    pub fn capacity(&self) -> usize {
        self.capacity as usize
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate).min(self.capacity);
        self.last_refill = now;
    }

    /// Take budget for up to `want` bytes, or return how long to wait for it.
    pub fn try_take(&mut self, want: usize, now: Instant) -> Result<usize, Duration> {
        let needed = (want as f64).min(self.capacity).max(1.0);
        self.refill(now);

        if self.tokens + TOKEN_EPSILON >= needed {
            self.tokens = (self.tokens - needed).max(0.0);
            Ok(needed as usize)
        } else {
            let deficit = needed - self.tokens;
            Err(Duration::from_secs_f64(deficit / self.rate))
        }
    }
}

/// An `AsyncRead` adapter that caps the rate bytes are pulled from `inner`.
///
/// Throttling happens on the byte stream itself, so whatever transport reads
/// from this adapter is paced smoothly. The number of bytes handed out is
/// published through a shared counter, which lets callers tell a transfer that
/// never started from one that failed part way.
pub struct ThrottledReader<R> {
    inner: R,
    bucket: TokenBucket,
    granted: usize,
    sleep: Option<Pin<Box<Sleep>>>,
    scratch: Vec<u8>,
    bytes_read: Arc<AtomicU64>,
}

impl<R> ThrottledReader<R> {
    pub fn new(inner: R, bandwidth: Bandwidth) -> Self {
        let bucket = TokenBucket::new(bandwidth);
        let scratch = vec![0u8; bucket.capacity()];
        ThrottledReader {
            inner,
            bucket,
            granted: 0,
            sleep: None,
            scratch,
            bytes_read: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Shared counter of bytes read through this adapter so far.
    pub fn counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.bytes_read)
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read.load(Ordering::SeqCst)
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for ThrottledReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if buf.remaining() == 0 {
            return Poll::Ready(Ok(()));
        }

        // Wait until the bucket grants some budget
        loop {
            if let Some(sleep) = this.sleep.as_mut() {
                ready!(sleep.as_mut().poll(cx));
                this.sleep = None;
            }
            if this.granted > 0 {
                break;
            }
            match this.bucket.try_take(buf.remaining(), Instant::now()) {
                Ok(granted) => this.granted = granted,
                Err(wait) => this.sleep = Some(Box::pin(tokio::time::sleep(wait))),
            }
        }

        let limit = this.granted.min(buf.remaining());
        let mut chunk = ReadBuf::new(&mut this.scratch[..limit]);
        ready!(Pin::new(&mut this.inner).poll_read(cx, &mut chunk))?;

        let n = chunk.filled().len();
        buf.put_slice(chunk.filled());
        this.granted -= n;
        this.bytes_read.fetch_add(n as u64, Ordering::SeqCst);
        Poll::Ready(Ok(()))
    }
}
