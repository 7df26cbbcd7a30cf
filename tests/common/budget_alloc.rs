use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Counting allocator for allocation-budget tests.
///
/// Counting is off until [`BudgetAlloc::measure`] arms it, so the test
/// harness's own allocations on other threads only leak in while a
/// measurement runs.
pub struct BudgetAlloc {
    armed: AtomicBool,
    current: AtomicUsize,
    peak: AtomicUsize,
    count: AtomicUsize,
}

/// What one measured closure allocated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocReport {
    pub allocs: usize,
    pub peak_bytes: usize,
}

impl BudgetAlloc {
    pub const fn new() -> Self {
        Self {
            armed: AtomicBool::new(false),
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            count: AtomicUsize::new(0),
        }
    }

    pub fn reset(&self) {
        self.current.store(0, Ordering::SeqCst);
        self.peak.store(0, Ordering::SeqCst);
        self.count.store(0, Ordering::SeqCst);
    }

    /// Run `f` with counting armed and report what it allocated.
    pub fn measure<R>(&self, f: impl FnOnce() -> R) -> (R, AllocReport) {
        self.reset();
        self.armed.store(true, Ordering::SeqCst);
        let out = f();
        self.armed.store(false, Ordering::SeqCst);
        let report = AllocReport {
            allocs: self.alloc_count(),
            peak_bytes: self.peak_bytes(),
        };
        (out, report)
    }

    pub fn peak_bytes(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn alloc_count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    fn record_alloc(&self, bytes: usize) {
        if !self.armed.load(Ordering::SeqCst) {
            return;
        }
        self.count.fetch_add(1, Ordering::SeqCst);
        let new = self.current.fetch_add(bytes, Ordering::SeqCst) + bytes;
        self.peak.fetch_max(new, Ordering::SeqCst);
    }

    fn record_free(&self, bytes: usize) {
        if !self.armed.load(Ordering::SeqCst) {
            return;
        }
        let _ = self
            .current
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some(current.saturating_sub(bytes))
            });
    }
}

unsafe impl GlobalAlloc for BudgetAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            self.record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) };
        self.record_free(layout.size());
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc_zeroed(layout) };
        if !ptr.is_null() {
            self.record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            self.record_free(layout.size());
            self.record_alloc(new_size);
        }
        new_ptr
    }
}
