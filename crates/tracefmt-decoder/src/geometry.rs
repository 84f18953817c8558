/// Largest buffer index range processed per file.
pub const MAX_BUFFERS_PER_FILE: u64 = i32::MAX as u64;

/// Buffer placement derived from a header and the real file length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferGeometry {
    pub data_start: u64,
    pub buffer_size: u64,
    pub file_len: u64,
}

/// Outcome of enumerating whole buffers in a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferLayout {
    /// Whole buffers that will be processed.
    pub count: u64,
    /// Trailing bytes did not form a whole buffer, or the header points past the end.
    pub truncated: bool,
    /// `count` was reduced to the per-file maximum.
    pub clamped: bool,
}

impl BufferGeometry {
    pub fn layout(&self) -> BufferLayout {
        self.layout_with_limit(MAX_BUFFERS_PER_FILE)
    }

    pub fn layout_with_limit(&self, limit: u64) -> BufferLayout {
        if self.buffer_size == 0 || self.file_len < self.data_start {
            return BufferLayout {
                count: 0,
                truncated: true,
                clamped: false,
            };
        }

        let payload = self.file_len - self.data_start;
        let whole = payload / self.buffer_size;
        let truncated = payload % self.buffer_size != 0;
        let clamped = whole > limit;

        BufferLayout {
            count: whole.min(limit),
            truncated,
            clamped,
        }
    }

    /// File offset of buffer `index`.
    pub fn offset_of(&self, index: u64) -> u64 {
        self.data_start + index * self.buffer_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(file_len: u64) -> BufferGeometry {
        BufferGeometry {
            data_start: 64,
            buffer_size: 256,
            file_len,
        }
    }

    #[test]
    fn test_exact_fit_is_not_truncated() {
        let layout = geometry(64 + 3 * 256).layout();
        assert_eq!(layout.count, 3);
        assert!(!layout.truncated);
        assert!(!layout.clamped);
    }

    #[test]
    fn test_remainder_marks_truncated_and_drops_partial_buffer() {
        for r in [1, 100, 255] {
            let layout = geometry(64 + 2 * 256 + r).layout();
            assert_eq!(layout.count, 2, "remainder {}", r);
            assert!(layout.truncated, "remainder {}", r);
        }
    }

    #[test]
    fn test_data_start_past_end_yields_nothing() {
        let layout = geometry(40).layout();
        assert_eq!(layout.count, 0);
        assert!(layout.truncated);
    }

    #[test]
    fn test_header_only_file_is_empty_but_intact() {
        let layout = geometry(64).layout();
        assert_eq!(layout.count, 0);
        assert!(!layout.truncated);
    }

    #[test]
    fn test_clamp_is_reported() {
        let layout = geometry(64 + 10 * 256).layout_with_limit(4);
        assert_eq!(layout.count, 4);
        assert!(layout.clamped);
    }

    #[test]
    fn test_offsets() {
        let g = geometry(0);
        assert_eq!(g.offset_of(0), 64);
        assert_eq!(g.offset_of(2), 576);
    }
}
