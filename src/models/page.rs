use serde::Serialize;

/// One page of a paginated listing.
#[derive(Serialize, Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: u32, page_size: u32, total: u64) -> Self {
        let pages = total.div_ceil(u64::from(page_size.max(1)));
        Self {
            items,
            page,
            page_size,
            total,
            pages,
        }
    }

    /// SQL offset of a 1-based page.
    pub fn offset(page: u32, page_size: u32) -> i64 {
        i64::from(page.saturating_sub(1)) * i64::from(page_size)
    }
}
