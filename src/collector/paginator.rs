use std::future::Future;

use anyhow::{Result, bail};

use crate::schema::Page;

/// Follows a cursor-paged listing to its end.
///
/// `fetch` is called with `None` first, then with each marker the
/// previous page returned. Items are accumulated in page order.
///
/// TERMINATION:
/// - A page without a marker ends the listing
/// - `Ok(None)` from `fetch` ends the listing, keeping what was
///   gathered so far
/// - Any error is returned immediately and accumulated items are
///   dropped
/// - A page handing back the marker it was requested with is an
///   error; following it would loop forever
///
/// The marker is passed through untouched; it is never parsed or
/// constructed here.
pub async fn paginate<T, F, Fut>(mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Option<Page<T>>>>,
{
    let mut items = Vec::new();
    let mut marker: Option<String> = None;

    loop {
        let Some(page) = fetch(marker.clone()).await? else {
            break;
        };

        items.extend(page.items);

        match page.marker {
            Some(next) if marker.as_deref() == Some(next.as_str()) => {
                bail!("paged listing returned marker {next:?} for its own request");
            }
            Some(next) => marker = Some(next),
            None => break,
        }
    }

    Ok(items)
}
