use serde::{Deserialize, Serialize};

pub(crate) const MAX_PAGE_SIZE: i64 = 1000;

pub(crate) const fn default_limit() -> i64 {
    100
}

/// `skip`/`limit` query parameters of list endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub(crate) struct PageParams {
    #[serde(default)]
    pub(crate) skip: i64,
    #[serde(default = "default_limit")]
    pub(crate) limit: i64,
}

impl PageParams {
    /// Negative offsets read as zero; `limit` is clamped to `1..=MAX_PAGE_SIZE`.
    pub(crate) fn normalized(self) -> Self {
        Self { skip: self.skip.max(0), limit: self.limit.clamp(1, MAX_PAGE_SIZE) }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PaginatedResponse<T> {
    pub(crate) items: Vec<T>,
    pub(crate) total_count: i64,
    pub(crate) skip: i64,
    pub(crate) limit: i64,
}

impl<T> PaginatedResponse<T> {
    pub(crate) fn new(items: Vec<T>, total_count: i64, page: PageParams) -> Self {
        Self { items, total_count, skip: page.skip, limit: page.limit }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_clamps_out_of_range_values() {
        let page = PageParams { skip: -5, limit: 0 }.normalized();
        assert_eq!((page.skip, page.limit), (0, 1));

        let page = PageParams { skip: 20, limit: 50_000 }.normalized();
        assert_eq!((page.skip, page.limit), (20, MAX_PAGE_SIZE));
    }
}
