use super::*;
use proptest::prelude::*;

proptest! {
    /// Every valid page lies within the row range and pages tile it exactly
    #[test]
    fn prop_pages_tile_the_result(count in 0i64..2000, per_page in 1i64..60) {
        let paginator = Paginator::new(count, per_page);
        let mut covered = 0;
        for n in 1..=paginator.num_pages() {
            let page = paginator.page_number(n).unwrap();
            prop_assert!(page.offset() <= count);
            covered += page.end_index() - page.offset();
        }
        prop_assert_eq!(covered, count);
    }

    /// Page numbers outside 1..=num_pages are always rejected
    #[test]
    fn prop_out_of_range_rejected(count in 0i64..500, per_page in 1i64..60, extra in 1i64..100) {
        let paginator = Paginator::new(count, per_page);
        prop_assert!(paginator.page_number(paginator.num_pages() + extra).is_err());
        prop_assert!(paginator.page_number(1 - extra).is_err());
    }

    /// next/previous links stay within range
    #[test]
    fn prop_neighbours_are_valid(count in 0i64..500, per_page in 1i64..60, pick in 0usize..1000) {
        let paginator = Paginator::new(count, per_page);
        let n = (pick as i64 % paginator.num_pages()) + 1;
        let page = paginator.page_number(n).unwrap();
        if let Some(next) = page.next_page_number() {
            prop_assert!(paginator.page_number(next).is_ok());
        }
        if let Some(prev) = page.previous_page_number() {
            prop_assert!(paginator.page_number(prev).is_ok());
        }
    }
}
