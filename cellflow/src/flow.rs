use alloc::vec;
use alloc::vec::Vec;
use core::cmp;

use crate::pool::CellPool;
use crate::{
    Align, Cell, CellId, Change, FlowError, FlowOptions, FrameState, IndexRange, ItemKey,
    ItemSource, MovePolicy, PulseReport, ScrollState, ViewportState,
};

#[derive(Clone, Copy, Debug, Default)]
struct BindStats {
    created: usize,
    reused: usize,
    released: usize,
}

/// The virtual cell reconciler.
///
/// Maps the indexes of a scrolling window to a bounded pool of reusable [`Cell`]s:
/// - Cells keep their identity while their index stays in the window, and follow their item when
///   the backing sequence shifts around it.
/// - Content is a snapshot taken at bind time. Plain item mutations are only picked up after
///   [`CellFlow::refresh`]; reactive fields propagate by moving [`ItemSource::revision`].
/// - Scroll, resize, data changes and refreshes are coalesced and applied by [`CellFlow::pulse`].
///
/// The flow never holds the backing sequence. Every call that reads items takes the current
/// [`ItemSource`], whose length must match the flow's tracked `count`.
#[derive(Clone, Debug)]
pub struct CellFlow<K, V> {
    options: FlowOptions,
    count: usize,
    viewport_size: u32,
    scroll_offset: u64,
    pool: CellPool<K, V>,
    layout_pending: bool,
    refresh_pending: bool,
    pulses: u64,
}

impl<K: ItemKey, V> CellFlow<K, V> {
    pub fn new(options: FlowOptions) -> Self {
        cdebug!(
            count = options.count,
            cell_size = options.cell_size,
            overscan = options.overscan,
            "CellFlow::new"
        );
        Self {
            count: options.count,
            viewport_size: options.initial_viewport_size,
            scroll_offset: options.initial_offset.resolve(),
            pool: CellPool::new(),
            layout_pending: true,
            refresh_pending: false,
            pulses: 0,
            options,
        }
    }

    pub fn options(&self) -> &FlowOptions {
        &self.options
    }

    /// Replaces the options.
    ///
    /// A different `count` is treated as an unspecified change of the whole sequence: all cells
    /// are released and re-claimed by key on the next pulse.
    pub fn set_options(&mut self, options: FlowOptions) {
        if options.count != self.count {
            let released = self.pool.release_all();
            ctrace!(
                released,
                prev = self.count,
                count = options.count,
                "set_options: count changed"
            );
            self.count = options.count;
        }
        self.options = options;
        self.layout_pending = true;
    }

    /// Clones the current options, applies `f`, then delegates to `set_options`.
    pub fn update_options(&mut self, f: impl FnOnce(&mut FlowOptions)) {
        let mut next = self.options.clone();
        next.count = self.count;
        f(&mut next);
        self.set_options(next);
    }

    pub fn set_on_pulse(
        &mut self,
        on_pulse: Option<impl Fn(&PulseReport) + Send + Sync + 'static>,
    ) {
        self.options.on_pulse = on_pulse.map(|f| alloc::sync::Arc::new(f) as _);
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn cell_size(&self) -> u32 {
        self.options.cell_size
    }

    pub fn set_cell_size(&mut self, cell_size: u32) {
        if self.options.cell_size == cell_size {
            return;
        }
        self.options.cell_size = cell_size;
        self.layout_pending = true;
    }

    pub fn set_overscan(&mut self, overscan: usize) {
        if self.options.overscan == overscan {
            return;
        }
        self.options.overscan = overscan;
        self.layout_pending = true;
    }

    pub fn move_policy(&self) -> MovePolicy {
        self.options.move_policy
    }

    pub fn set_move_policy(&mut self, move_policy: MovePolicy) {
        self.options.move_policy = move_policy;
    }

    // Viewport

    pub fn viewport_size(&self) -> u32 {
        self.viewport_size
    }

    pub fn set_viewport_size(&mut self, size: u32) {
        if self.viewport_size == size {
            return;
        }
        self.viewport_size = size;
        self.layout_pending = true;
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    pub fn set_scroll_offset(&mut self, offset: u64) {
        if self.scroll_offset == offset {
            return;
        }
        ctrace!(offset, prev = self.scroll_offset, "set_scroll_offset");
        self.scroll_offset = offset;
        self.layout_pending = true;
    }

    pub fn set_scroll_offset_clamped(&mut self, offset: u64) {
        let clamped = self.clamp_scroll_offset(offset);
        self.set_scroll_offset(clamped);
    }

    pub fn set_viewport_and_scroll(&mut self, viewport_size: u32, scroll_offset: u64) {
        self.set_viewport_size(viewport_size);
        self.set_scroll_offset(scroll_offset);
    }

    pub fn total_size(&self) -> u64 {
        (self.count as u64).saturating_mul(self.options.effective_cell_size())
    }

    pub fn max_scroll_offset(&self) -> u64 {
        self.total_size().saturating_sub(self.viewport_size as u64)
    }

    pub fn clamp_scroll_offset(&self, offset: u64) -> u64 {
        offset.min(self.max_scroll_offset())
    }

    /// Scrolls so that `index` is shown with the given alignment.
    ///
    /// Returns the applied (clamped) offset.
    pub fn scroll_to_index(&mut self, index: usize, align: Align) -> u64 {
        let offset = self.scroll_to_index_offset(index, align);
        self.set_scroll_offset(offset);
        offset
    }

    pub fn scroll_to_index_offset(&self, index: usize, align: Align) -> u64 {
        if self.count == 0 {
            return 0;
        }
        let index = index.min(self.count - 1);
        let size = self.options.effective_cell_size();
        let start = (index as u64).saturating_mul(size);
        let end = start.saturating_add(size);
        let view = self.viewport_size as u64;

        let target = match align {
            Align::Start => start,
            Align::End => end.saturating_sub(view),
            Align::Center => start.saturating_add(size / 2).saturating_sub(view / 2),
            Align::Auto => {
                let cur = self.scroll_offset;
                let cur_end = cur.saturating_add(view);
                if start >= cur && end <= cur_end {
                    cur
                } else if start < cur {
                    start
                } else {
                    end.saturating_sub(view)
                }
            }
        };

        self.clamp_scroll_offset(target)
    }

    /// Indexes intersecting the viewport (no overscan).
    pub fn visible_range(&self) -> IndexRange {
        if self.count == 0 || self.viewport_size == 0 {
            return IndexRange::default();
        }

        let size = self.options.effective_cell_size();
        let view = self.viewport_size as u64;
        let offset = self.clamp_scroll_offset(self.scroll_offset);

        let start = (offset / size) as usize;
        let end = offset.saturating_add(view).div_ceil(size) as usize;
        IndexRange::new(start.min(self.count), end.min(self.count))
    }

    /// The visible range extended by `overscan` on both sides; this is what a pulse materializes.
    pub fn window(&self) -> IndexRange {
        let mut range = self.visible_range();
        if range.is_empty() {
            return range;
        }
        range.start_index = range.start_index.saturating_sub(self.options.overscan);
        range.end_index = cmp::min(
            self.count,
            range.end_index.saturating_add(self.options.overscan),
        );
        range
    }

    pub fn viewport_state(&self) -> ViewportState {
        ViewportState {
            size: self.viewport_size,
            cell_size: self.options.cell_size,
        }
    }

    pub fn scroll_state(&self) -> ScrollState {
        ScrollState {
            offset: self.scroll_offset,
        }
    }

    pub fn frame_state(&self) -> FrameState {
        FrameState {
            viewport: self.viewport_state(),
            scroll: self.scroll_state(),
        }
    }

    /// Restores viewport geometry and (clamped) scroll offset from a snapshot.
    pub fn restore_frame_state(&mut self, frame: FrameState) {
        self.set_cell_size(frame.viewport.cell_size);
        self.set_viewport_size(frame.viewport.size);
        self.set_scroll_offset_clamped(frame.scroll.offset);
    }

    // Reconciliation

    /// Binds cells to every index in `range`, immediately.
    ///
    /// Indexes already bound keep their cell (and its content). Missing indexes take a pooled
    /// cell, preferring one last bound to the same item, or allocate a new one. Cells bound
    /// outside `range` go back to the pool.
    ///
    /// Returns the cell ids in index order.
    pub fn materialize<S>(
        &mut self,
        range: IndexRange,
        source: &S,
    ) -> Result<Vec<CellId>, FlowError>
    where
        S: ItemSource<Key = K, Content = V> + ?Sized,
    {
        self.check_count(source)?;
        if range.start_index > range.end_index || range.end_index > self.count {
            cwarn!(
                start_index = range.start_index,
                end_index = range.end_index,
                count = self.count,
                "materialize: range out of bounds"
            );
            return Err(FlowError::RangeOutOfBounds {
                start_index: range.start_index,
                end_index: range.end_index,
                count: self.count,
            });
        }

        let stats = self.bind_range(range, source);
        ctrace!(
            start_index = range.start_index,
            end_index = range.end_index,
            created = stats.created,
            reused = stats.reused,
            released = stats.released,
            "materialize"
        );
        self.pool.assert_consistent(self.count);

        Ok(range.iter().filter_map(|i| self.pool.at(i)).collect())
    }

    /// Marks every bound cell stale. The next pulse rebinds them in place.
    pub fn refresh(&mut self) {
        let mut marked = 0usize;
        self.pool.for_each_bound_mut(|_, cell| {
            cell.mark_stale();
            marked += 1;
        });
        cdebug!(marked, "refresh");
        self.refresh_pending = true;
    }

    /// Marks the cell bound to `index` (if any) stale.
    pub fn invalidate(&mut self, index: usize) -> Result<(), FlowError> {
        if index >= self.count {
            return Err(FlowError::IndexOutOfBounds {
                index,
                count: self.count,
            });
        }
        let Some(id) = self.pool.at(index) else {
            return Ok(());
        };
        if let Some(cell) = self.pool.get_mut(id) {
            cell.mark_stale();
            self.refresh_pending = true;
        }
        Ok(())
    }

    /// Applies a change that already happened to the backing sequence.
    ///
    /// `source` must reflect the sequence *after* the change.
    pub fn on_backing_sequence_changed<S>(
        &mut self,
        change: &Change,
        source: &S,
    ) -> Result<(), FlowError>
    where
        S: ItemSource<Key = K, Content = V> + ?Sized,
    {
        let next_count = self.validate_change(change, source)?;
        if source.len() != next_count {
            return Err(FlowError::CountMismatch {
                expected: next_count,
                actual: source.len(),
            });
        }

        let preserve = self.options.move_policy == MovePolicy::PreserveIdentity;
        let released = match *change {
            Change::Inserted { index, count } => {
                self.pool.remap(|i| Some(if i >= index { i + count } else { i }))
            }
            Change::Removed { index, count } => self.pool.remap(|i| {
                if i < index {
                    Some(i)
                } else if i < index + count {
                    None
                } else {
                    Some(i - count)
                }
            }),
            Change::Moved { from, to } => self.pool.remap(|i| {
                if i == from && !preserve {
                    None
                } else {
                    Some(moved_index(i, from, to))
                }
            }),
            Change::Permuted {
                start,
                ref new_indexes,
            } => self.pool.remap(|i| {
                if i < start || i >= start + new_indexes.len() {
                    return Some(i);
                }
                let next = new_indexes[i - start];
                if next != i && !preserve {
                    None
                } else {
                    Some(next)
                }
            }),
            Change::Updated { index, count } => {
                let mut marked = 0usize;
                self.pool.for_each_bound_mut(|i, cell| {
                    if i >= index && i < index + count {
                        cell.mark_stale();
                        marked += 1;
                    }
                });
                if marked > 0 {
                    self.refresh_pending = true;
                }
                0
            }
            Change::Reset => self.pool.release_all(),
        };

        self.count = next_count;
        self.layout_pending = true;
        self.pool.assert_consistent(self.count);
        cdebug!(?change, released, count = self.count, "on_backing_sequence_changed");
        Ok(())
    }

    /// Runs one rendering pulse.
    ///
    /// 1. If layout is pending (first pulse, scroll, resize, data change), the viewport
    ///    [`window`](Self::window) is materialized.
    /// 2. Every stale cell is rebound in place. A current cell whose source revision moved only
    ///    gets [`ItemSource::update`], so its plain fields keep their bound snapshot.
    ///
    /// Fires `on_pulse` with the report.
    pub fn pulse<S>(&mut self, source: &S) -> Result<PulseReport, FlowError>
    where
        S: ItemSource<Key = K, Content = V> + ?Sized,
    {
        self.check_count(source)?;

        let mut report = PulseReport::default();
        if self.layout_pending {
            let stats = self.bind_range(self.window(), source);
            report.laid_out = true;
            report.created = stats.created;
            report.reused = stats.reused;
            report.released = stats.released;
        }
        (report.rebound, report.updated) = self.rebind_invalid(source);

        self.layout_pending = false;
        self.refresh_pending = false;
        self.pulses = self.pulses.saturating_add(1);
        report.pulse = self.pulses;
        report.window = self.materialized_span();
        self.pool.assert_consistent(self.count);

        ctrace!(
            pulse = report.pulse,
            laid_out = report.laid_out,
            created = report.created,
            reused = report.reused,
            released = report.released,
            rebound = report.rebound,
            updated = report.updated,
            "pulse"
        );
        if let Some(cb) = &self.options.on_pulse {
            cb(&report);
        }
        Ok(report)
    }

    pub fn is_layout_pending(&self) -> bool {
        self.layout_pending
    }

    pub fn is_refresh_pending(&self) -> bool {
        self.refresh_pending
    }

    pub fn pulse_count(&self) -> u64 {
        self.pulses
    }

    // Inspection

    /// Materialized cells in index order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell<K, V>> + '_ {
        self.pool.iter_bound()
    }

    /// Any cell ever allocated by this flow, bound or pooled.
    pub fn cell(&self, id: CellId) -> Option<&Cell<K, V>> {
        self.pool.get(id)
    }

    pub fn cell_at(&self, index: usize) -> Option<&Cell<K, V>> {
        self.pool.at(index).and_then(|id| self.pool.get(id))
    }

    pub fn is_materialized(&self, id: CellId) -> bool {
        self.pool
            .get(id)
            .and_then(Cell::index)
            .is_some_and(|index| self.pool.at(index) == Some(id))
    }

    pub fn materialized_len(&self) -> usize {
        self.pool.bound_len()
    }

    pub fn pooled_len(&self) -> usize {
        self.pool.free_len()
    }

    pub fn allocated_len(&self) -> usize {
        self.pool.allocated_len()
    }

    /// The smallest range covering every bound index (gaps are possible until the next pulse).
    pub fn materialized_span(&self) -> IndexRange {
        self.pool
            .bound_span()
            .map(|(start, end)| IndexRange::new(start, end))
            .unwrap_or_default()
    }

    /// Verifies that every current cell is bound to the item now at its index.
    ///
    /// Stale cells are skipped: they are allowed to show an outdated item until the next pulse.
    pub fn check_bindings<S>(&self, source: &S) -> Result<(), FlowError>
    where
        S: ItemSource<Key = K, Content = V> + ?Sized,
    {
        self.check_count(source)?;
        for cell in self.pool.iter_bound() {
            let Some(index) = cell.index() else {
                continue;
            };
            if cell.is_current() && cell.key() != Some(&source.key(index)) {
                return Err(FlowError::BindingMismatch { index });
            }
        }
        Ok(())
    }

    fn check_count<S>(&self, source: &S) -> Result<(), FlowError>
    where
        S: ItemSource + ?Sized,
    {
        if source.len() != self.count {
            return Err(FlowError::CountMismatch {
                expected: self.count,
                actual: source.len(),
            });
        }
        Ok(())
    }

    fn bind_range<S>(&mut self, range: IndexRange, source: &S) -> BindStats
    where
        S: ItemSource<Key = K, Content = V> + ?Sized,
    {
        let mut stats = BindStats {
            released: self.pool.retain_bound(|i| range.contains(i)),
            ..BindStats::default()
        };

        let missing: Vec<(usize, K)> = range
            .iter()
            .filter(|&i| self.pool.at(i).is_none())
            .map(|i| (i, source.key(i)))
            .collect();
        let claimed = self.pool.claim_by_key(&missing);

        for ((index, key), claim) in missing.into_iter().zip(claimed) {
            let id = match claim.or_else(|| self.pool.take_free()) {
                Some(id) => {
                    stats.reused += 1;
                    id
                }
                None => {
                    stats.created += 1;
                    self.pool.allocate()
                }
            };
            let content = source.render(index);
            let revision = source.revision(index);
            self.pool.bind(id, index, key, content, revision);
        }
        stats
    }

    /// Rebinds stale cells and applies reactive updates to current ones.
    ///
    /// Returns `(rebound, updated)`.
    fn rebind_invalid<S>(&mut self, source: &S) -> (usize, usize)
    where
        S: ItemSource<Key = K, Content = V> + ?Sized,
    {
        let mut rebound = 0usize;
        let mut updated = 0usize;
        self.pool.for_each_bound_mut(|index, cell| {
            let revision = source.revision(index);
            if cell.is_current() {
                if cell.revision() == revision {
                    return;
                }
                if cell.update(revision, |content| source.update(index, content)) {
                    updated += 1;
                    return;
                }
            }
            cell.bind(index, source.key(index), source.render(index), revision);
            rebound += 1;
        });
        (rebound, updated)
    }

    fn validate_change<S>(&self, change: &Change, source: &S) -> Result<usize, FlowError>
    where
        S: ItemSource + ?Sized,
    {
        let count = self.count;
        let invalid = || FlowError::InvalidChange {
            change: change.clone(),
            count,
        };

        match *change {
            Change::Inserted { index, count: n } => {
                if index > count {
                    return Err(invalid());
                }
                count.checked_add(n).ok_or_else(invalid)
            }
            Change::Removed { index, count: n } => match index.checked_add(n) {
                Some(end) if end <= count => Ok(count - n),
                _ => Err(invalid()),
            },
            Change::Moved { from, to } => {
                if from >= count || to >= count {
                    return Err(invalid());
                }
                Ok(count)
            }
            Change::Permuted {
                start,
                ref new_indexes,
            } => {
                let end = start.checked_add(new_indexes.len()).ok_or_else(invalid)?;
                if end > count {
                    return Err(invalid());
                }
                let mut seen = vec![false; new_indexes.len()];
                for &next in new_indexes {
                    if next < start || next >= end || seen[next - start] {
                        return Err(invalid());
                    }
                    seen[next - start] = true;
                }
                Ok(count)
            }
            Change::Updated { index, count: n } => match index.checked_add(n) {
                Some(end) if end <= count => Ok(count),
                _ => Err(invalid()),
            },
            Change::Reset => Ok(source.len()),
        }
    }
}

/// Index of the item previously at `i` after moving the item at `from` to `to`.
fn moved_index(i: usize, from: usize, to: usize) -> usize {
    if i == from {
        to
    } else if from < to && i > from && i <= to {
        i - 1
    } else if to < from && i >= to && i < from {
        i + 1
    } else {
        i
    }
}
