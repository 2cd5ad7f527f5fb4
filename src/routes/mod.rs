use rocket::{
    http::RawStr,
    request::{FlashMessage, FromFormValue},
    response::NamedFile,
};
use shrinkwraprs::Shrinkwrap;
use std::path::{Path, PathBuf};
use validator::ValidationError;

const ITEMS_PER_PAGE: i32 = 10;

/// The `?page=` query parameter of the feed routes.
#[derive(Shrinkwrap, Copy, Clone, PartialEq, Debug)]
pub struct Page(i32);

impl<'v> FromFormValue<'v> for Page {
    type Error = &'v RawStr;
    fn from_form_value(form_value: &'v RawStr) -> Result<Page, &'v RawStr> {
        form_value.parse::<i32>().map(Page)
    }
}

impl Default for Page {
    fn default() -> Self {
        Page(1)
    }
}

impl Page {
    pub fn first() -> Page {
        Page(1)
    }

    /// Computes the total number of pages needed to display n_items. An
    /// empty collection still paginates to one (empty) page.
    pub fn total(n_items: i32) -> i32 {
        if n_items <= 0 {
            1
        } else if n_items % ITEMS_PER_PAGE == 0 {
            n_items / ITEMS_PER_PAGE
        } else {
            (n_items / ITEMS_PER_PAGE) + 1
        }
    }

    /// Resolves an out-of-range page number to the nearest valid page.
    pub fn clamped(self, n_items: i32) -> Page {
        let last = Page::total(n_items);
        if self.0 < 1 {
            Page(1)
        } else if self.0 > last {
            Page(last)
        } else {
            self
        }
    }

    /// The `(offset, max)` slice of items this page covers.
    pub fn limits(self) -> (i32, i32) {
        ((self.0 - 1) * ITEMS_PER_PAGE, self.0 * ITEMS_PER_PAGE)
    }

    pub fn has_previous(self) -> bool {
        self.0 > 1
    }

    pub fn has_next(self, n_items: i32) -> bool {
        self.0 < Page::total(n_items)
    }
}

pub(crate) fn flash_msg(flash: Option<FlashMessage<'_, '_>>) -> Option<(String, String)> {
    flash.map(|f| (f.name().to_string(), f.msg().to_string()))
}

pub(crate) fn not_blank(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        Err(ValidationError::new("not_blank"))
    } else {
        Ok(())
    }
}

pub mod comments;
pub mod errors;
pub mod groups;
pub mod posts;
pub mod session;
pub mod timelines;
pub mod user;

#[get("/static/<file..>", rank = 2)]
pub fn static_files(file: PathBuf) -> Option<NamedFile> {
    NamedFile::open(Path::new("static/").join(file)).ok()
}

#[cfg(test)]
mod tests {
    use super::Page;

    #[test]
    fn total_pages() {
        assert_eq!(1, Page::total(0));
        assert_eq!(1, Page::total(3));
        assert_eq!(1, Page::total(10));
        assert_eq!(2, Page::total(11));
        assert_eq!(2, Page::total(13));
        assert_eq!(2, Page::total(20));
        assert_eq!(1000, Page::total(10_000));
    }

    #[test]
    fn limits_slice_in_tens() {
        assert_eq!((0, 10), Page::first().limits());
        assert_eq!((10, 20), Page(2).limits());
        assert_eq!((120, 130), Page(13).limits());
    }

    #[test]
    fn out_of_range_pages_resolve_to_nearest() {
        assert_eq!(Page(1), Page(0).clamped(13));
        assert_eq!(Page(1), Page(-4).clamped(13));
        assert_eq!(Page(2), Page(2).clamped(13));
        assert_eq!(Page(2), Page(99).clamped(13));
        assert_eq!(Page(1), Page(7).clamped(0));
    }

    #[test]
    fn neighbours() {
        assert!(!Page::first().has_previous());
        assert!(Page(2).has_previous());
        assert!(Page::first().has_next(13));
        assert!(!Page(2).has_next(13));
        assert!(!Page::first().has_next(5));
    }
}
