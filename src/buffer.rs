//! Reusable line buffers with manual integer formatting.
//!
//! Every log call renders into a [`LineBuffer`] taken from the process-wide
//! [`Pool`]; the buffer is returned once the completed line has been handed
//! to the sink, so steady-state logging performs no allocation. Integer
//! fields (which dominate a log line: date, time, line numbers) are encoded
//! by hand instead of going through a generic integer Display path.

use std::sync::Mutex;

/// A growable byte buffer for assembling one log line.
///
/// `line` only ever grows by appending; `scratch` is a small side buffer
/// reused on every integer-formatting call to hold digits in
/// least-significant-first order before they are copied out reversed.
#[derive(Default)]
pub struct LineBuffer {
    line: Vec<u8>,
    scratch: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> LineBuffer {
        LineBuffer::default()
    }

    /// Truncates the content to empty, keeping the allocated capacity.
    pub fn reset(&mut self) {
        self.line.clear();
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.line
    }

    pub fn len(&self) -> usize {
        self.line.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }

    pub fn push_str(&mut self, s: &str) {
        self.line.extend_from_slice(s.as_bytes());
    }

    pub fn push_bytes(&mut self, b: &[u8]) {
        self.line.extend_from_slice(b);
    }

    pub fn push_byte(&mut self, c: u8) {
        self.line.push(c);
    }

    /// Fills `scratch` with the decimal digits of `v`, lowest digit first.
    fn digits_reversed(&mut self, v: u64) {
        self.scratch.clear();
        if v == 0 {
            self.scratch.push(b'0');
            return;
        }
        let mut v = v;
        while v > 0 {
            self.scratch.push(b'0' + (v % 10) as u8);
            v /= 10;
        }
    }

    /// Copies `scratch` into `line` in reverse order.
    fn commit_reversed(&mut self) {
        for i in (0..self.scratch.len()).rev() {
            self.line.push(self.scratch[i]);
        }
    }

    /// Appends the canonical base-10 form of `v`. `0` renders as `"0"`,
    /// negative values carry a leading `-`. `i64::MIN` is handled via the
    /// unsigned magnitude, so every value round-trips.
    pub fn write_int(&mut self, v: i64) {
        self.digits_reversed(v.unsigned_abs());
        if v < 0 {
            self.scratch.push(b'-');
        }
        self.commit_reversed();
    }

    /// Appends `v` zero-padded on the left until the digit count (excluding
    /// any sign) reaches `n`. The sign precedes the padding: `-123` with
    /// `n = 5` renders `-00123`. No padding if the digits already fit.
    pub fn write_int_right_align(&mut self, v: i64, n: usize) {
        self.digits_reversed(v.unsigned_abs());
        while self.scratch.len() < n {
            self.scratch.push(b'0');
        }
        if v < 0 {
            self.scratch.push(b'-');
        }
        self.commit_reversed();
    }

    /// Appends `v` followed by zeros on the right until the digit count
    /// (excluding any sign) reaches `n`. Digits are never truncated; only
    /// padding is added.
    pub fn write_int_left_align(&mut self, v: i64, n: usize) {
        self.digits_reversed(v.unsigned_abs());
        let pad = n.saturating_sub(self.scratch.len());
        if v < 0 {
            self.scratch.push(b'-');
        }
        self.commit_reversed();
        for _ in 0..pad {
            self.line.push(b'0');
        }
    }
}

impl std::fmt::Write for LineBuffer {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.push_str(s);
        Ok(())
    }
}

/// A pool of [`LineBuffer`]s shared by all loggers in the process.
///
/// Buffers are exclusively owned between [`Pool::acquire`] and
/// [`Pool::release`]; the pool only synchronizes the free list.
pub struct Pool {
    free: Mutex<Vec<LineBuffer>>,
}

impl Pool {
    pub const fn new() -> Pool {
        Pool {
            free: Mutex::new(Vec::new()),
        }
    }

    fn free_list(&self) -> std::sync::MutexGuard<'_, Vec<LineBuffer>> {
        match self.free.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Takes a buffer from the pool, or creates one if the pool is empty.
    /// The buffer is reset; its previous capacity is retained.
    pub fn acquire(&self) -> LineBuffer {
        let mut buf = self.free_list().pop().unwrap_or_default();
        buf.reset();
        buf
    }

    /// Returns a buffer to the pool for reuse.
    pub fn release(&self, buf: LineBuffer) {
        self.free_list().push(buf);
    }
}

pub(crate) static POOL: Pool = Pool::new();

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn rendered(f: impl FnOnce(&mut LineBuffer)) -> String {
        let mut buf = LineBuffer::new();
        f(&mut buf);
        String::from_utf8(buf.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn write_int() {
        assert_eq!(rendered(|b| b.write_int(0)), "0");
        assert_eq!(rendered(|b| b.write_int(12345)), "12345");
        assert_eq!(rendered(|b| b.write_int(-12345)), "-12345");
        assert_eq!(
            rendered(|b| b.write_int(i64::MIN)),
            i64::MIN.to_string()
        );
        assert_eq!(
            rendered(|b| b.write_int(i64::MAX)),
            i64::MAX.to_string()
        );
    }

    #[test]
    fn write_int_right_align() {
        assert_eq!(rendered(|b| b.write_int_right_align(0, 3)), "000");
        assert_eq!(rendered(|b| b.write_int_right_align(123, 4)), "0123");
        assert_eq!(rendered(|b| b.write_int_right_align(1234, 7)), "0001234");
        assert_eq!(rendered(|b| b.write_int_right_align(-123, 5)), "-00123");
        assert_eq!(rendered(|b| b.write_int_right_align(-1234, 3)), "-1234");
        assert_eq!(rendered(|b| b.write_int_right_align(-1234, 6)), "-001234");
    }

    #[test]
    fn write_int_left_align() {
        assert_eq!(rendered(|b| b.write_int_left_align(0, 5)), "00000");
        assert_eq!(rendered(|b| b.write_int_left_align(123, 6)), "123000");
        assert_eq!(rendered(|b| b.write_int_left_align(1234, 7)), "1234000");
        assert_eq!(rendered(|b| b.write_int_left_align(-123, 5)), "-12300");
        // digits are never truncated when they already exceed the width
        assert_eq!(rendered(|b| b.write_int_left_align(-1234, 2)), "-1234");
    }

    #[test]
    fn int_round_trip() {
        let mut rng = SmallRng::seed_from_u64(0x11e10);
        let mut buf = LineBuffer::new();
        for _ in 0..10_000 {
            let v: i64 = rng.random();
            buf.reset();
            buf.write_int(v);
            let text = std::str::from_utf8(buf.as_bytes()).unwrap();
            assert_eq!(text.parse::<i64>().unwrap(), v);
        }
    }

    #[test]
    fn reset_matches_fresh_buffer() {
        let mut reused = LineBuffer::new();
        reused.push_str("throwaway content to give the buffer history");
        reused.write_int_right_align(-42, 9);
        reused.reset();

        let mut fresh = LineBuffer::new();
        for buf in [&mut reused, &mut fresh] {
            buf.push_str("head ");
            buf.write_int(-77);
            buf.push_byte(b':');
            buf.write_int_left_align(5, 3);
            buf.push_bytes(b" tail");
        }
        assert_eq!(reused.as_bytes(), fresh.as_bytes());
    }

    #[test]
    fn pool_recycles_buffers() {
        let pool = Pool::new();
        let mut a = pool.acquire();
        a.push_str("filled");
        pool.release(a);
        let b = pool.acquire();
        assert!(b.is_empty());
    }
}
