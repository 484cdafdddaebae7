/// Ephemeral pagination state: 1-based current page and the page size.
#[derive(Debug, Clone, Copy)]
pub struct PageState {
    pub page: usize,
    pub page_size: usize,
}

impl PageState {
    pub fn new(page_size: usize) -> Self {
        PageState {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Any filter change restarts at the first page.
    pub fn reset(&mut self) {
        self.page = 1;
    }

    pub fn set_page(&mut self, page: usize, filtered_len: usize) {
        self.page = page;
        self.page = paginate(filtered_len, self).page;
    }

    /// Clamped relative navigation; a no-op at the boundaries.
    pub fn next(&mut self, filtered_len: usize) {
        self.set_page(self.page + 1, filtered_len);
    }

    pub fn prev(&mut self, filtered_len: usize) {
        self.set_page(self.page.saturating_sub(1).max(1), filtered_len);
    }
}

/// One computed page over the filtered subset.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub page: usize,
    pub total_pages: usize,
    /// Half open index range into the filtered subset.
    pub start: usize,
    pub end: usize,
    /// Sliding window of page numbers for the page buttons.
    pub window: Vec<usize>,
    pub display_range: String,
}

pub const PAGE_WINDOW: usize = 5;

/// Slice the filtered subset into the current page. The current page is
/// clamped into [1, total_pages] on every recompute, so removing the last
/// row of the last page falls back one page instead of showing nothing.
pub fn paginate(filtered_len: usize, state: &PageState) -> PageView {
    let total_pages = filtered_len.div_ceil(state.page_size).max(1);
    let page = state.page.clamp(1, total_pages);

    let start = (page - 1) * state.page_size;
    let end = (start + state.page_size).min(filtered_len);

    let display_range = if filtered_len == 0 {
        "no records".to_string()
    } else {
        format!("{}-{} of {}", start + 1, end, filtered_len)
    };

    PageView {
        page,
        total_pages,
        start,
        end,
        window: window(page, total_pages),
        display_range,
    }
}

// At most PAGE_WINDOW page buttons centered on the current page; at the
// dataset boundaries the window shifts instead of centering exactly.
fn window(page: usize, total_pages: usize) -> Vec<usize> {
    let len = PAGE_WINDOW.min(total_pages);
    let half = PAGE_WINDOW / 2;
    let first = if page <= half {
        1
    } else {
        (page - half).min(total_pages + 1 - len)
    };
    (first..first + len).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_cover_the_whole_subset_without_overlap() {
        let state = PageState::new(50);
        let view1 = paginate(120, &state);
        assert_eq!(view1.total_pages, 3);
        assert_eq!((view1.start, view1.end), (0, 50));

        let mut ranges = Vec::new();
        for page in 1..=3 {
            let s = PageState { page, page_size: 50 };
            let v = paginate(120, &s);
            ranges.push((v.start, v.end));
        }
        assert_eq!(ranges, vec![(0, 50), (50, 100), (100, 120)]);
        // Disjoint, ordered, union is the whole subset.
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
        }
    }

    #[test]
    fn out_of_range_page_clamps_to_the_last_page() {
        let state = PageState { page: 4, page_size: 50 };
        let view = paginate(120, &state);
        assert_eq!(view.page, 3);
        assert_eq!((view.start, view.end), (100, 120));
    }

    #[test]
    fn empty_subset_reports_one_page_and_no_records() {
        let state = PageState::new(50);
        let view = paginate(0, &state);
        assert_eq!(view.total_pages, 1);
        assert_eq!((view.start, view.end), (0, 0));
        assert_eq!(view.display_range, "no records");
    }

    #[test]
    fn display_range_is_one_based_inclusive() {
        let state = PageState { page: 2, page_size: 50 };
        let view = paginate(120, &state);
        assert_eq!(view.display_range, "51-100 of 120");
    }

    #[test]
    fn navigation_is_a_noop_at_the_boundaries() {
        let mut state = PageState::new(50);
        state.prev(120);
        assert_eq!(state.page, 1);
        state.set_page(3, 120);
        state.next(120);
        assert_eq!(state.page, 3);
        state.prev(120);
        assert_eq!(state.page, 2);
    }

    #[test]
    fn window_centers_on_the_current_page() {
        assert_eq!(window(5, 9), vec![3, 4, 5, 6, 7]);
    }

    #[test]
    fn window_shifts_at_the_boundaries() {
        assert_eq!(window(1, 9), vec![1, 2, 3, 4, 5]);
        assert_eq!(window(2, 9), vec![1, 2, 3, 4, 5]);
        assert_eq!(window(8, 9), vec![5, 6, 7, 8, 9]);
        assert_eq!(window(9, 9), vec![5, 6, 7, 8, 9]);
    }

    #[test]
    fn window_shrinks_for_small_page_counts() {
        assert_eq!(window(1, 3), vec![1, 2, 3]);
        assert_eq!(window(1, 1), vec![1]);
    }

    #[test]
    fn filter_shrink_moves_the_cursor_back_a_page() {
        // On page 3 of 120 rows; the subset shrinks to 80 rows.
        let mut state = PageState { page: 3, page_size: 50 };
        state.set_page(state.page, 80);
        assert_eq!(state.page, 2);
    }
}
