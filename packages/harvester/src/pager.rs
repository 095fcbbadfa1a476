//! Lazy iteration over resumable list responses.

use std::vec;

use crate::error::Result;
use crate::types::Page;

/// Yields items one page at a time, fetching the next page only once the
/// current one is drained.
///
/// The fetch function receives `None` for the first page and the previous
/// page's resumption token afterwards. A fetch error is yielded once and ends
/// the iteration.
///
/// # Examples
/// ```
/// use crosswalk_harvester::pager::Pages;
/// use crosswalk_harvester::types::Page;
///
/// let pages = Pages::new(|token: Option<&str>| {
///     Ok(match token {
///         None => Page { items: vec![1, 2], resumption_token: Some("b".into()) },
///         Some(_) => Page { items: vec![3], resumption_token: None },
///     })
/// });
/// let items: Vec<i32> = pages.collect::<Result<_, _>>().unwrap();
/// assert_eq!(items, vec![1, 2, 3]);
/// ```
pub struct Pages<T, F> {
    fetch: F,
    buffer: vec::IntoIter<T>,
    token: Option<String>,
    pages: usize,
    done: bool,
}

impl<T, F> Pages<T, F>
where
    F: FnMut(Option<&str>) -> Result<Page<T>>,
{
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            buffer: Vec::new().into_iter(),
            token: None,
            pages: 0,
            done: false,
        }
    }
}

impl<T, F> Iterator for Pages<T, F>
where
    F: FnMut(Option<&str>) -> Result<Page<T>>,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.next() {
                return Some(Ok(item));
            }
            if self.done {
                return None;
            }

            let token = self.token.take();
            match (self.fetch)(token.as_deref()) {
                Ok(page) => {
                    self.pages += 1;
                    tracing::debug!(
                        page = self.pages,
                        items = page.items.len(),
                        has_more = page.resumption_token.is_some(),
                        "Fetched page"
                    );
                    self.done = page.resumption_token.is_none();
                    self.token = page.resumption_token;
                    self.buffer = page.items.into_iter();
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
